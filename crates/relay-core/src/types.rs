//! # Type Catalog
//!
//! The seven parameter types and their default and validation rules. The
//! catalog is shared by request parameters and by the schema validator.
//!
//! An empty container validates as both `array` and `object`. The catalog
//! does not disambiguate; callers that need the distinction must supply
//! non-empty data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, RelayResult};
use crate::value::Value;

/// A declared parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// `null`
    Null,
    /// `boolean`
    Boolean,
    /// `integer`
    Integer,
    /// `float`
    Float,
    /// `string`
    String,
    /// `array`: a true list.
    Array,
    /// `object`: a string-keyed record.
    Object,
}

impl ParamType {
    /// All types in catalog order.
    pub const ALL: [ParamType; 7] = [
        Self::Null,
        Self::Boolean,
        Self::Integer,
        Self::Float,
        Self::String,
        Self::Array,
        Self::Object,
    ];

    /// The canonical type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// The zero value of this type.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Boolean => Value::Bool(false),
            Self::Integer => Value::Int(0),
            Self::Float => Value::Float(0.0),
            Self::String => Value::String(String::new()),
            Self::Array => Value::List(Vec::new()),
            Self::Object => Value::Map(Default::default()),
        }
    }

    /// Checks the runtime shape of `value` against this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Null, Value::Null) => true,
            (Self::Boolean, Value::Bool(_)) => true,
            (Self::Integer, Value::Int(_)) => true,
            (Self::Float, Value::Float(_)) => true,
            (Self::String, Value::String(_)) => true,
            (Self::Array, Value::List(_)) => true,
            (Self::Array, Value::Map(map)) => crate::value::is_sequential(map.keys()),
            (Self::Object, Value::Map(_)) => value.is_keyed(),
            (Self::Object, Value::List(items)) => items.is_empty(),
            _ => false,
        }
    }

    /// Parses a scalar string into this type, as arrives from HTTP inputs.
    ///
    /// Returns `None` when the text cannot represent a value of this type.
    pub fn coerce_str(&self, text: &str) -> Option<Value> {
        match self {
            Self::Null => (text.is_empty() || text == "null").then_some(Value::Null),
            Self::Boolean => match text {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            Self::Integer => text.parse::<i64>().ok().map(Value::Int),
            Self::Float => text.parse::<f64>().ok().map(Value::Float),
            Self::String => Some(Value::String(text.to_string())),
            Self::Array | Self::Object => serde_json::from_str::<serde_json::Value>(text)
                .ok()
                .map(Value::from)
                .filter(|v| self.accepts(v)),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| RelayError::InvalidType(s.to_string()))
    }
}

/// Name-based access to the type rules.
///
/// Type names come from schemas and wire payloads as strings; unknown names
/// fail with [`RelayError::InvalidType`].
pub struct TypeCatalog;

impl TypeCatalog {
    /// The default value for a type name.
    pub fn default_for(type_name: &str) -> RelayResult<Value> {
        Ok(type_name.parse::<ParamType>()?.default_value())
    }

    /// Validates `value` against a type name.
    pub fn validate(type_name: &str, value: &Value) -> RelayResult<bool> {
        Ok(type_name.parse::<ParamType>()?.accepts(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_padded_keys_are_objects_negative_keys_are_neither() {
        let padded = Value::from(json!({"00": "x"}));
        assert!(TypeCatalog::validate("object", &padded).unwrap());
        assert!(!TypeCatalog::validate("array", &padded).unwrap());

        let negative = Value::from(json!({"-1": "x"}));
        assert!(!TypeCatalog::validate("object", &negative).unwrap());
        assert!(!TypeCatalog::validate("array", &negative).unwrap());
    }

    #[test]
    fn defaults_per_type() {
        assert_eq!(TypeCatalog::default_for("null").unwrap(), Value::Null);
        assert_eq!(TypeCatalog::default_for("boolean").unwrap(), Value::Bool(false));
        assert_eq!(TypeCatalog::default_for("integer").unwrap(), Value::Int(0));
        assert_eq!(TypeCatalog::default_for("float").unwrap(), Value::Float(0.0));
        assert_eq!(TypeCatalog::default_for("string").unwrap(), Value::from(""));
        assert_eq!(TypeCatalog::default_for("array").unwrap(), Value::List(vec![]));
        assert_eq!(
            TypeCatalog::default_for("object").unwrap(),
            Value::Map(Default::default())
        );
    }

    #[test]
    fn unknown_type_name_rejected() {
        let err = TypeCatalog::default_for("decimal").unwrap_err();
        assert!(matches!(err, RelayError::InvalidType(ref t) if t == "decimal"));
        assert!(TypeCatalog::validate("int", &Value::Int(1)).is_err());
    }

    #[test]
    fn scalar_shapes_are_strict() {
        assert!(ParamType::Integer.accepts(&Value::Int(3)));
        assert!(!ParamType::Integer.accepts(&Value::Float(3.0)));
        assert!(!ParamType::Float.accepts(&Value::Int(3)));
        assert!(!ParamType::String.accepts(&Value::Int(3)));
        assert!(ParamType::Null.accepts(&Value::Null));
    }

    #[test]
    fn default_values_satisfy_their_type() {
        for ty in ParamType::ALL {
            assert!(ty.accepts(&ty.default_value()), "{ty} default rejected");
        }
    }

    #[test]
    fn sequential_map_is_an_array_not_an_object() {
        let v = Value::from(json!({"0": "a", "1": "b"}));
        assert!(ParamType::Array.accepts(&v));
        assert!(!ParamType::Object.accepts(&v));
    }

    #[test]
    fn coerce_http_scalars() {
        assert_eq!(ParamType::Integer.coerce_str("12"), Some(Value::Int(12)));
        assert_eq!(ParamType::Integer.coerce_str("x"), None);
        assert_eq!(ParamType::Boolean.coerce_str("true"), Some(Value::Bool(true)));
        assert_eq!(
            ParamType::Object.coerce_str(r#"{"a":1}"#),
            Some(Value::from(json!({"a": 1})))
        );
        assert_eq!(ParamType::Object.coerce_str("[1]"), None);
    }

    #[test]
    fn names_roundtrip() {
        for ty in ParamType::ALL {
            assert_eq!(ty.as_str().parse::<ParamType>().unwrap(), ty);
        }
        assert_eq!(serde_json::to_string(&ParamType::Boolean).unwrap(), "\"boolean\"");
    }
}
