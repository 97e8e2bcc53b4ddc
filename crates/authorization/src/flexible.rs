//! Lenient scalar decoding for display-only columns.
//!
//! The relational store returns ages, cycle counts and anthropometrics as numbers or as
//! decimal strings depending on the column type and driver. The generator only prints
//! them, so every scalar is normalised to its textual form.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(text) => text,
            Scalar::Integer(value) => value.to_string(),
            Scalar::Float(value) => value.to_string(),
            Scalar::Bool(value) => value.to_string(),
        }
    }
}

/// Accepts `null`, a string, a number or a boolean.
pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_text))
}

/// Like [`optional_text`], with `null` and absent values read as an empty string.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "optional_text")]
        value: Option<String>,
    }

    fn parse_value(json: &str) -> Option<String> {
        serde_json::from_str::<Holder>(json).expect("fixture parses").value
    }

    #[test]
    fn normalises_scalars_to_text() {
        assert_eq!(parse_value(r#"{"value": "1.80"}"#), Some("1.80".into()));
        assert_eq!(parse_value(r#"{"value": 62}"#), Some("62".into()));
        assert_eq!(parse_value(r#"{"value": 1.8}"#), Some("1.8".into()));
        assert_eq!(parse_value(r#"{"value": null}"#), None);
        assert_eq!(parse_value(r#"{}"#), None);
    }

    #[test]
    fn rejects_nested_values() {
        assert!(serde_json::from_str::<Holder>(r#"{"value": [1, 2]}"#).is_err());
    }
}
