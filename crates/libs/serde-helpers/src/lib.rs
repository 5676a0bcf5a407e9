use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_SEARCH_START: i64 = 0;
pub const DEFAULT_SEARCH_LIMIT: i64 = 25;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Reads a number of milliseconds into a `Duration`.
pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let ms: u64 = Deserialize::deserialize(deserializer)?;
    Ok(Duration::from_millis(ms))
}

/// Writes a `Duration` back as milliseconds, so that a dumped configuration
/// can be fed again to `deserialize_duration`.
pub fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

pub fn default_timeout() -> Duration {
    Duration::from_millis(DEFAULT_TIMEOUT_MS)
}
