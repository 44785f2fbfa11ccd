//! # Parameter Schemas
//!
//! The declared contract of one action parameter: its type, expectations
//! (`required`, default, `allow_empty`) and validation constraints.
//!
//! Constraints are data. Enforcement lives in [`crate::validate`].

use serde::{Deserialize, Serialize};

use relay_core::{ParamLocation, ParamType, Value};

use crate::de;
use crate::http::ParamHttp;

/// How an array parameter is serialized when it arrives as a single string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayFormat {
    /// Comma separated.
    #[default]
    Csv,
    /// Space separated.
    Ssv,
    /// Tab separated.
    Tsv,
    /// Pipe separated.
    Pipes,
    /// Repeated field; the value is already a list.
    Multi,
}

impl ArrayFormat {
    /// Item separator, or `None` for [`ArrayFormat::Multi`].
    pub fn separator(&self) -> Option<char> {
        match self {
            Self::Csv => Some(','),
            Self::Ssv => Some(' '),
            Self::Tsv => Some('\t'),
            Self::Pipes => Some('|'),
            Self::Multi => None,
        }
    }

    /// The canonical format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Ssv => "ssv",
            Self::Tsv => "tsv",
            Self::Pipes => "pipes",
            Self::Multi => "multi",
        }
    }
}

fn string_type() -> ParamType {
    ParamType::String
}

/// Declared contract of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSchema {
    /// Parameter name. Filled from the enclosing map key on load.
    #[serde(default)]
    pub name: String,
    /// Declared type.
    #[serde(rename = "type", default = "string_type")]
    pub ty: ParamType,
    /// Value format, e.g. `uuid`, `date`, `date-time`. Empty when unset.
    #[serde(default)]
    pub format: String,
    /// Serialization of array values sent as strings.
    #[serde(default)]
    pub array_format: ArrayFormat,
    /// Type of array items.
    #[serde(default, deserialize_with = "de::item_type")]
    pub items: Option<ParamType>,
    /// Default value. `None` means no default; `Some(Value::Null)` is a
    /// default of null.
    #[serde(default, deserialize_with = "de::present")]
    pub default: Option<Value>,
    /// Whether the parameter must be sent when it has no default.
    #[serde(default)]
    pub required: bool,
    /// Whether an empty value is acceptable.
    #[serde(default)]
    pub allow_empty: bool,
    /// HTTP exposure.
    #[serde(default)]
    pub http: ParamHttp,
    /// Regular expression string values must match.
    #[serde(default, deserialize_with = "de::non_empty")]
    pub pattern: Option<String>,
    /// Upper numeric bound.
    #[serde(default)]
    pub max: Option<f64>,
    /// Whether `max` itself is excluded.
    #[serde(default)]
    pub exclusive_max: bool,
    /// Lower numeric bound.
    #[serde(default)]
    pub min: Option<f64>,
    /// Whether `min` itself is excluded.
    #[serde(default)]
    pub exclusive_min: bool,
    /// Maximum string length in characters.
    #[serde(default, deserialize_with = "de::count")]
    pub max_length: Option<usize>,
    /// Minimum string length in characters.
    #[serde(default, deserialize_with = "de::count")]
    pub min_length: Option<usize>,
    /// Maximum number of array items.
    #[serde(default, deserialize_with = "de::count")]
    pub max_items: Option<usize>,
    /// Minimum number of array items.
    #[serde(default, deserialize_with = "de::count")]
    pub min_items: Option<usize>,
    /// Whether array items must be distinct.
    #[serde(default)]
    pub unique_items: bool,
    /// Allowed values. Empty means any value.
    #[serde(default, rename = "enum")]
    pub allowed: Vec<Value>,
    /// Numeric values must be a multiple of this.
    #[serde(default, deserialize_with = "de::divisor")]
    pub multiple_of: Option<f64>,
}

impl ParamSchema {
    /// A parameter of type `ty` with no constraints.
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        let name = name.into();
        Self {
            http: ParamHttp {
                param: name.clone(),
                ..ParamHttp::default()
            },
            name,
            ty,
            format: String::new(),
            array_format: ArrayFormat::default(),
            items: None,
            default: None,
            required: false,
            allow_empty: false,
            pattern: None,
            max: None,
            exclusive_max: false,
            min: None,
            exclusive_min: false,
            max_length: None,
            min_length: None,
            max_items: None,
            min_items: None,
            unique_items: false,
            allowed: Vec::new(),
            multiple_of: None,
        }
    }

    /// Whether a default is declared, including a default of null.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Location the parameter is read from.
    pub fn input(&self) -> ParamLocation {
        self.http.input
    }

    pub(crate) fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        if self.http.param.is_empty() {
            self.http.param = name.to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sentinels_decode_to_unconstrained() {
        let schema: ParamSchema = serde_json::from_value(json!({
            "type": "string",
            "pattern": "",
            "max_length": -1,
            "min_length": -1,
            "max_items": -1,
            "min_items": -1,
            "multiple_of": -1,
            "enum": []
        }))
        .unwrap();
        assert_eq!(schema.pattern, None);
        assert_eq!(schema.max_length, None);
        assert_eq!(schema.min_items, None);
        assert_eq!(schema.multiple_of, None);
        assert!(schema.allowed.is_empty());
    }

    #[test]
    fn zero_bound_is_a_real_bound() {
        let schema: ParamSchema = serde_json::from_value(json!({"max_length": 0})).unwrap();
        assert_eq!(schema.max_length, Some(0));
    }

    #[test]
    fn null_default_differs_from_no_default() {
        let none: ParamSchema = serde_json::from_value(json!({})).unwrap();
        assert!(!none.has_default());

        let null: ParamSchema = serde_json::from_value(json!({"default": null})).unwrap();
        assert!(null.has_default());
        assert_eq!(null.default, Some(Value::Null));
    }

    #[test]
    fn http_param_name_falls_back_to_param_name() {
        let schema: ParamSchema = serde_json::from_value(json!({})).unwrap();
        let schema = schema.named("user_id");
        assert_eq!(schema.http.param, "user_id");

        let schema: ParamSchema =
            serde_json::from_value(json!({"http": {"param": "user_tags"}})).unwrap();
        assert_eq!(schema.named("tags").http.param, "user_tags");
    }

    #[test]
    fn array_separators() {
        assert_eq!(ArrayFormat::Ssv.separator(), Some(' '));
        assert_eq!(ArrayFormat::Pipes.separator(), Some('|'));
        assert_eq!(ArrayFormat::Multi.separator(), None);
        assert_eq!(ArrayFormat::default().as_str(), "csv");
    }

    #[test]
    fn empty_items_means_untyped() {
        let schema: ParamSchema = serde_json::from_value(json!({"items": ""})).unwrap();
        assert_eq!(schema.items, None);
        let schema: ParamSchema = serde_json::from_value(json!({"items": "integer"})).unwrap();
        assert_eq!(schema.items, Some(ParamType::Integer));
    }
}
