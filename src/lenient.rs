//! Tolerant decoding for the loosely typed values the inventory backend emits.
//!
//! The backend serialises database rows directly, so flags arrive as `true`,
//! `1` or `"1"` and identifiers as either numbers or strings.

use serde::{Deserialize, Deserializer, de::DeserializeOwned, de::Error as _};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Decodes a truthy value. Missing and `null` values are `false`.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None => false,
        Some(Scalar::Bool(value)) => value,
        Some(Scalar::Int(value)) => value != 0,
        Some(Scalar::Float(value)) => value != 0.0,
        Some(Scalar::Text(value)) => !matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "" | "0" | "false" | "null"
        ),
    })
}

/// Decodes a string that may have been sent as a number.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Scalar::deserialize(deserializer)? {
        Scalar::Text(value) => Ok(value),
        Scalar::Int(value) => Ok(value.to_string()),
        Scalar::Float(value) => Ok(value.to_string()),
        Scalar::Bool(value) => Err(D::Error::custom(format!(
            "expected a string or number, found boolean {value}"
        ))),
    }
}

/// Decodes an optional string. `null` and blank strings are `None`.
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        None | Some(Scalar::Bool(_)) => None,
        Some(Scalar::Text(value)) if value.trim().is_empty() => None,
        Some(Scalar::Text(value)) => Some(value),
        Some(Scalar::Int(value)) => Some(value.to_string()),
        Some(Scalar::Float(value)) => Some(value.to_string()),
    })
}

/// Decodes a non-negative integer that may have been sent as a string.
pub fn number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Scalar::deserialize(deserializer)? {
        Scalar::Int(value) => u64::try_from(value)
            .map_err(|_| D::Error::custom(format!("expected a non-negative id, found {value}"))),
        Scalar::Text(value) => value
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected a numeric id, found '{value}'"))),
        Scalar::Float(value) => Err(D::Error::custom(format!(
            "expected an integer id, found {value}"
        ))),
        Scalar::Bool(value) => Err(D::Error::custom(format!(
            "expected an integer id, found boolean {value}"
        ))),
    }
}

/// Decodes a list row by row, skipping rows that do not decode. A `null`
/// list is empty.
pub fn rows<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| {
            serde_json::from_value(row)
                .inspect_err(|e| tracing::warn!(index, "Skipping unreadable row: {e}"))
                .ok()
        })
        .collect())
}
