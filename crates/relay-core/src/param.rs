//! # Request Parameters
//!
//! A `ParamValue` is one typed request or call argument. Its value always
//! satisfies its declared type; the checked constructor enforces this.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RelayError, RelayResult};
use crate::types::ParamType;
use crate::value::Value;

/// Where a parameter was read from in the originating request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Path template segment.
    Path,
    /// Query string.
    #[default]
    Query,
    /// Form field.
    Form,
    /// HTTP header.
    Header,
    /// Request body.
    Body,
}

impl ParamLocation {
    /// The canonical location name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Form => "form",
            Self::Header => "header",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamLocation {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(Self::Path),
            "query" => Ok(Self::Query),
            "form" => Ok(Self::Form),
            "header" => Ok(Self::Header),
            "body" => Ok(Self::Body),
            other => Err(RelayError::MalformedPayload(format!(
                "unknown parameter location: {other}"
            ))),
        }
    }
}

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParamWire")]
pub struct ParamValue {
    name: String,
    value: Value,
    #[serde(rename = "type")]
    ty: ParamType,
    location: ParamLocation,
    exists: bool,
}

/// Unchecked decode target; converted through [`ParamValue::new`].
#[derive(Deserialize)]
struct ParamWire {
    name: String,
    #[serde(default)]
    value: Value,
    #[serde(rename = "type", default = "string_type")]
    ty: ParamType,
    #[serde(default)]
    location: ParamLocation,
    #[serde(default = "present")]
    exists: bool,
}

fn string_type() -> ParamType {
    ParamType::String
}

fn present() -> bool {
    true
}

impl TryFrom<ParamWire> for ParamValue {
    type Error = RelayError;

    fn try_from(wire: ParamWire) -> Result<Self, Self::Error> {
        let mut param = Self::new(wire.name, wire.value, wire.ty)?.at(wire.location);
        param.exists = wire.exists;
        Ok(param)
    }
}

impl ParamValue {
    /// Create a parameter, checking the value against the declared type.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidValue`] when the value's shape does not
    /// satisfy `ty`.
    pub fn new(name: impl Into<String>, value: impl Into<Value>, ty: ParamType) -> RelayResult<Self> {
        let name = name.into();
        let value = value.into();
        if !ty.accepts(&value) {
            return Err(RelayError::InvalidValue { name, expected: ty });
        }
        Ok(Self {
            name,
            value,
            ty,
            location: ParamLocation::default(),
            exists: true,
        })
    }

    /// Create a string parameter. Cannot fail.
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Value::String(value.into()),
            ty: ParamType::String,
            location: ParamLocation::default(),
            exists: true,
        }
    }

    /// The zero-value parameter handed out for a name that was not sent:
    /// an empty string that reports `exists() == false`.
    pub fn absent(name: impl Into<String>, location: ParamLocation) -> Self {
        Self {
            name: name.into(),
            value: Value::String(String::new()),
            ty: ParamType::String,
            location,
            exists: false,
        }
    }

    /// Same parameter, read from another location.
    pub fn at(mut self, location: ParamLocation) -> Self {
        self.location = location;
        self
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consume the parameter, keeping only its value.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Declared type.
    pub fn ty(&self) -> ParamType {
        self.ty
    }

    /// Source location.
    pub fn location(&self) -> ParamLocation {
        self.location
    }

    /// False for the placeholder returned when a parameter is absent.
    pub fn exists(&self) -> bool {
        self.exists
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_constructor_rejects_shape_mismatch() {
        let err = ParamValue::new("age", "ten", ParamType::Integer).unwrap_err();
        assert!(matches!(
            err,
            RelayError::InvalidValue { ref name, expected: ParamType::Integer } if name == "age"
        ));
        let ok = ParamValue::new("age", 10i64, ParamType::Integer).unwrap();
        assert_eq!(ok.value(), &Value::Int(10));
        assert!(ok.exists());
    }

    #[test]
    fn absent_param_is_empty_string() {
        let p = ParamValue::absent("missing", ParamLocation::Path);
        assert_eq!(p.name(), "missing");
        assert_eq!(p.value(), &Value::from(""));
        assert_eq!(p.ty(), ParamType::String);
        assert_eq!(p.location(), ParamLocation::Path);
        assert!(!p.exists());
    }

    #[test]
    fn default_location_is_query() {
        assert_eq!(ParamValue::string("q", "x").location(), ParamLocation::Query);
        assert_eq!(
            ParamValue::string("q", "x").at(ParamLocation::Header).location(),
            ParamLocation::Header
        );
    }

    #[test]
    fn location_names() {
        assert_eq!("form".parse::<ParamLocation>().unwrap(), ParamLocation::Form);
        assert!("cookie".parse::<ParamLocation>().is_err());
    }

    #[test]
    fn deserializes_wire_shape() {
        let p: ParamValue =
            serde_json::from_str(r#"{"name":"id","value":7,"type":"integer","location":"path"}"#)
                .unwrap();
        assert_eq!(p.value(), &Value::Int(7));
        assert_eq!(p.location(), ParamLocation::Path);
        assert!(p.exists());
    }

    #[test]
    fn absent_placeholder_survives_reencoding() {
        let p = ParamValue::absent("x", ParamLocation::Query);
        let json = serde_json::to_string(&p).unwrap();
        let back: ParamValue = serde_json::from_str(&json).unwrap();
        assert!(!back.exists());
        assert_eq!(back, p);
    }

    #[test]
    fn wire_shape_mismatch_rejected() {
        let res: Result<ParamValue, _> =
            serde_json::from_str(r#"{"name":"id","value":"seven","type":"integer"}"#);
        assert!(res.is_err());
    }
}
