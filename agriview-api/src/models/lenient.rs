//! Field decoders for values pushed by devices.
//!
//! Controllers publish plain JSON numbers, so an angle may arrive as `90.4` and a
//! timestamp as `1718000000.5`. A field that cannot be read becomes `None`
//! instead of failing the whole section it belongs to.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::MAX_VENT_ANGLE;

fn read(value: Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };

    number.filter(|number| number.is_finite())
}

pub fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(read(Value::deserialize(deserializer)?))
}

/// Rounds to the nearest integer, `None` when it does not fit `T`.
pub fn rounded<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    Ok(read(Value::deserialize(deserializer)?).and_then(|number| T::try_from(number.round() as i64).ok()))
}

/// Vent angle in degrees, rounded and clamped to `0..=180`.
pub fn angle<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(read(Value::deserialize(deserializer)?)
        .map(|number| number.round().clamp(0.0, f64::from(MAX_VENT_ANGLE)) as u8))
}

/// Vent step delay, rounded and clamped to the `u32` range.
pub fn speed<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(read(Value::deserialize(deserializer)?).map(|number| number.round().clamp(0.0, f64::from(u32::MAX)) as u32))
}

/// Booleans, with `0`/`1` style numbers accepted as well.
pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => Some(flag),
        Value::Number(number) => number.as_f64().map(|number| number != 0.0),
        _ => None,
    })
}

pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        other => Some(other.to_string()),
    })
}
