//! Decoders for the constraint sentinels of mapping documents.
//!
//! Documents mark an absent bound with `-1` and an absent pattern with the
//! empty string. Both decode to `None` so no caller can mistake a sentinel
//! for a literal zero bound.

use serde::{Deserialize, Deserializer};

use relay_core::Value;

/// `-1` (or any negative count) decodes to `None`.
pub(crate) fn count<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.and_then(|n| usize::try_from(n).ok()))
}

/// A non-positive divisor decodes to `None`.
pub(crate) fn divisor<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.filter(|m| *m > 0.0))
}

/// The empty string decodes to `None`.
pub(crate) fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()))
}

/// A present key decodes to `Some`, even when its value is `null`.
///
/// Combined with `#[serde(default)]` this keeps "no default" (`None`)
/// apart from "default is null" (`Some(Value::Null)`).
pub(crate) fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A missing item type is written as `""` by some producers.
pub(crate) fn item_type<'de, D>(deserializer: D) -> Result<Option<relay_core::ParamType>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
