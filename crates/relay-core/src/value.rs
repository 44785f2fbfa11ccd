//! # Value Model
//!
//! `Value` is the dynamic payload type carried by parameters, entities,
//! collections and transaction arguments. Ordered sequences and keyed
//! records are two distinct variants (`List` and `Map`), so the
//! list-vs-record question is answered once at decode time instead of at
//! every use site.
//!
//! ## Numeric keys
//!
//! Some producers encode lists as maps with keys `"0"`, `"1"`, ...; such a
//! map is *sequential*. A map whose keys are all non-numeric is *keyed*.
//! An empty container is both at once, and nothing in this module tries to
//! decide which one it "really" is.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A dynamically typed payload value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed 64-bit integer.
    Int(i64),
    /// A 64-bit float.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// An ordered sequence.
    List(Vec<Value>),
    /// A string-keyed record.
    Map(BTreeMap<String, Value>),
}

/// Returns true if `key` is a canonical decimal integer: `0`, or an
/// optional `-` followed by digits without a leading zero, within `i64`.
///
/// Such keys are integer keys. Zero-padded keys like `"00"` and `"-0"` stay
/// string keys.
pub fn is_numeric_key(key: &str) -> bool {
    let digits = key.strip_prefix('-').unwrap_or(key);
    let canonical = match digits.as_bytes() {
        [] => false,
        [b'0'] => digits.len() == key.len(),
        [b'0', ..] => false,
        bytes => bytes.iter().all(u8::is_ascii_digit),
    };
    canonical && key.parse::<i64>().is_ok()
}

/// Returns true if the keys are exactly `0..n` in some order.
///
/// An empty key set is sequential.
pub fn is_sequential<'a>(keys: impl IntoIterator<Item = &'a String>) -> bool {
    let mut seen = BTreeSet::new();
    let mut count = 0usize;
    for key in keys {
        count += 1;
        if !is_numeric_key(key) {
            return false;
        }
        match key.parse::<usize>() {
            Ok(index) => {
                seen.insert(index);
            }
            Err(_) => return false,
        }
    }
    seen.len() == count && seen.iter().next_back().map_or(true, |max| *max + 1 == count)
}

impl Value {
    /// Returns true for `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for an empty string, list or map.
    pub fn is_empty_container(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Returns true if this is a non-empty list, or a non-empty map whose
    /// keys are dense zero-based indexes.
    pub fn looks_like_list(&self) -> bool {
        match self {
            Self::List(items) => !items.is_empty(),
            Self::Map(map) => !map.is_empty() && is_sequential(map.keys()),
            _ => false,
        }
    }

    /// Returns true if this is a map (possibly empty) with no numeric key.
    pub fn is_keyed(&self) -> bool {
        match self {
            Self::Map(map) => map.keys().all(|k| !is_numeric_key(k)),
            _ => false,
        }
    }

    /// Returns the items of a list, or of a sequential map in index order.
    pub fn sequence(&self) -> Option<Vec<&Value>> {
        match self {
            Self::List(items) => Some(items.iter().collect()),
            Self::Map(map) if is_sequential(map.keys()) => {
                let mut indexed: Vec<(usize, &Value)> = map
                    .iter()
                    .filter_map(|(k, v)| k.parse::<usize>().ok().map(|i| (i, v)))
                    .collect();
                indexed.sort_by_key(|(i, _)| *i);
                Some(indexed.into_iter().map(|(_, v)| v).collect())
            }
            _ => None,
        }
    }

    /// Looks up a key in a map, or an index in a list.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(map) => map.get(key),
            Self::List(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Borrow the string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of integers and floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Borrow the map, if this is a map.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            other => {
                let json = serde_json::Value::from(other.clone());
                write!(f, "{json}")
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(0.0)),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Int(i) => Self::Number(i.into()),
            // Non-finite floats have no JSON form.
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(Self::Number)
                .unwrap_or(Self::Null),
            Value::String(s) => Self::String(s),
            Value::List(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Map(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_arrays_and_objects_split() {
        let v = Value::from(json!({"tags": ["a", "b"], "meta": {}}));
        let map = v.as_map().unwrap();
        assert!(matches!(map["tags"], Value::List(_)));
        assert!(matches!(map["meta"], Value::Map(_)));
    }

    #[test]
    fn json_numbers_keep_integer_precision() {
        assert_eq!(Value::from(json!(42)), Value::Int(42));
        assert_eq!(Value::from(json!(1.5)), Value::Float(1.5));
    }

    #[test]
    fn sequential_keys() {
        let keys: Vec<String> = vec!["1".into(), "0".into(), "2".into()];
        assert!(is_sequential(&keys));
        let gap: Vec<String> = vec!["0".into(), "2".into()];
        assert!(!is_sequential(&gap));
        let padded: Vec<String> = vec!["00".into()];
        assert!(!is_sequential(&padded));
        let empty: Vec<String> = Vec::new();
        assert!(is_sequential(&empty));
    }

    #[test]
    fn integer_keys_are_canonical_decimals() {
        for key in ["0", "7", "42", "-1", "-250"] {
            assert!(is_numeric_key(key), "{key}");
        }
        for key in ["", "-", "00", "01", "-0", "1a", "+1", "99999999999999999999"] {
            assert!(!is_numeric_key(key), "{key}");
        }
        assert!(Value::from(json!({"00": "x"})).is_keyed());
        assert!(!Value::from(json!({"-1": "x"})).is_keyed());
        assert!(!Value::from(json!({"-1": "x"})).looks_like_list());
    }

    #[test]
    fn numeric_map_looks_like_list() {
        let v = Value::from(json!({"0": {"id": 1}, "1": {"id": 2}}));
        assert!(v.looks_like_list());
        assert!(!v.is_keyed());
        let items = v.sequence().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("id"), Some(&Value::Int(1)));
    }

    #[test]
    fn empty_containers_are_ambiguous() {
        let list = Value::List(Vec::new());
        let map = Value::Map(BTreeMap::new());
        assert!(!list.looks_like_list());
        assert!(!map.looks_like_list());
        assert!(map.is_keyed());
        assert_eq!(map.sequence().map(|s| s.len()), Some(0));
    }

    #[test]
    fn untagged_serde_roundtrip() {
        let v = Value::from(json!({"n": null, "b": true, "i": 3, "s": "x", "l": [1]}));
        let text = serde_json::to_string(&v).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v, back);
    }

    #[test]
    fn display_strings_unquoted() {
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(Value::from(vec![1i64, 2]).to_string(), "[1,2]");
    }

    #[test]
    fn non_finite_float_becomes_json_null() {
        let json = serde_json::Value::from(Value::Float(f64::NAN));
        assert!(json.is_null());
    }
}
