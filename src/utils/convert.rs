use crate::ConvertError;

/// Encode a message/instance id as a big-endian key so sled range scans
/// iterate in ascending id order.
pub(crate) fn id_to_key(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

pub(crate) fn key_to_id(bytes: &[u8]) -> std::result::Result<u64, ConvertError> {
    let fixed: [u8; 8] = bytes
        .try_into()
        .map_err(|_| ConvertError::InvalidLength(bytes.len()))?;
    Ok(u64::from_be_bytes(fixed))
}
