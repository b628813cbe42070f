use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch. Row timestamps and the audit debounce
/// window all use this clock.
pub fn now_millis() -> u64 {
    let now = SystemTime::now();
    let since_epoch = now.duration_since(UNIX_EPOCH).expect("Time went backwards");
    since_epoch.as_millis() as u64
}
