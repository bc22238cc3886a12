use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

// Durations serialize as fractional seconds: scoring floors fractional
// remaining seconds, so sub-second precision has to survive a round trip.

pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(value.as_secs_f64())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Ok(Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO))
}
