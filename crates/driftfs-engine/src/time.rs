use chrono::NaiveDateTime;

/// Parses a remote timestamp (`YYYY-MM-DDTHH:MM:SS[.fff]Z`) into
/// `(seconds, nanoseconds)` since the epoch.
///
/// Sub-second precision is truncated to zero on ingestion. Unparsable
/// input falls back to the epoch rather than failing the operation.
pub fn timestamp_of(s: &str) -> (i64, u32) {
    match NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ") {
        Ok(dt) => (dt.and_utc().timestamp(), 0),
        Err(_) => (0, 0),
    }
}
