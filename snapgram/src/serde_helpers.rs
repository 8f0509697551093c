//! Deserialization helpers for documents that have passed through the Redis Lua runtime.
//!
//! Lua's `cjson` cannot tell an empty array from an empty object, so a set field that
//! was emptied by an `array_remove` comes back as `{}`.

use serde::{
    Deserialize, Deserializer,
    de::{DeserializeOwned, Error},
};
use serde_json::Value;

/// Accepts a JSON array, an empty object, or `null` for a `Vec<T>` field.
pub fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) if map.is_empty() => Ok(Vec::new()),
        value @ Value::Array(_) => serde_json::from_value(value).map_err(D::Error::custom),
        other => Err(D::Error::custom(format!("expected a sequence, found {other}"))),
    }
}
