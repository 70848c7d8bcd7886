//! `serde(with = "systime")`: `SystemTime` as milliseconds since the Unix
//! epoch, for the same stable-wire-format reason [`crate::DurationMs`]
//! avoids serde's default `{"secs": N, "nanos": N}` representation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub(crate) fn serialize<S: Serializer>(t: &SystemTime, ser: S) -> Result<S::Ok, S::Error> {
    let millis = t.duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64;
    millis.serialize(ser)
}

pub(crate) fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<SystemTime, D::Error> {
    let millis = u64::deserialize(de)?;
    Ok(UNIX_EPOCH + Duration::from_millis(millis))
}
