use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
///
/// All persisted timestamps (ledger rows, cursor high-water-marks, cache
/// entries) use epoch milliseconds so the storage layer stays portable
/// across the `Any` driver's backends.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
