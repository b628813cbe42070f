//! Change-Propagation Core Error Hierarchy
//!
//! Defines error types for the release-message channel, watch-key resolution
//! and delivery auditing, categorized by storage and listener concerns.

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Storage-layer failures (persistence, serialization, constraint races)
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failures raised by registered message listeners
    #[error(transparent)]
    Listener(#[from] ListenerError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

impl Error {
    /// True when the error is the expected unique-constraint race from a
    /// concurrent create. Callers convert it into a re-read, never surface it.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Error::Storage(StorageError::ConstraintViolation { .. }))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Storage unavailable or timed out
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Unique-constraint race from a concurrent create
    #[error("Unique constraint violated for key {key}")]
    ConstraintViolation { key: String },

    /// Disk I/O failures
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// Serialization failures for persisted rows
    #[error(transparent)]
    BincodeError(#[from] bincode::Error),

    /// Embedded database errors
    #[error("Embedded database error: {0}")]
    DbError(String),

    /// Error type for key conversion operations
    #[error("Key convert failed")]
    Convert(#[from] ConvertError),
}

/// Error type for key conversion operations
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Invalid input length error
    ///
    /// This occurs when a stored key's byte length doesn't match the required 8 bytes.
    #[error("invalid byte length: expected 8 bytes, received {0} bytes")]
    InvalidLength(usize),
}

/// Any failure raised by a registered message listener. Isolated per listener:
/// logged by the scanner and never propagated past the delivery loop.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("Listener failed handling message {message_id}: {reason}")]
    HandleFailed { message_id: u64, reason: String },
}

// ============== Conversion Implementations ============== //
impl From<ConvertError> for Error {
    fn from(e: ConvertError) -> Self {
        Error::Storage(StorageError::Convert(e))
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Storage(StorageError::BincodeError(e))
    }
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::DbError(err.to_string())
    }
}

impl From<sled::Error> for Error {
    fn from(err: sled::Error) -> Self {
        StorageError::DbError(err.to_string()).into()
    }
}
