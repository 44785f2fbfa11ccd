//! Transport metadata: identity and provenance of the request the envelope
//! belongs to.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use relay_core::{ActionKey, Timestamp};

/// The service and action that received the request from the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Origin {
    /// Service name.
    pub service: String,
    /// Action name.
    pub action: String,
}

impl Origin {
    /// Create an origin.
    pub fn new(service: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            action: action.into(),
        }
    }
}

fn first_level() -> u32 {
    1
}

/// Request-wide metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportMeta {
    /// Platform version that created the envelope.
    #[serde(default)]
    pub version: String,
    /// Request id.
    pub id: String,
    /// Time the gateway received the request.
    pub datetime: Timestamp,
    /// Address of the originating gateway.
    #[serde(default)]
    pub gateway: String,
    /// Service and action that received the request first.
    #[serde(default)]
    pub origin: Origin,
    #[serde(default = "first_level")]
    level: u32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    fallbacks: Vec<ActionKey>,
}

impl TransportMeta {
    /// Metadata for a request, at call depth 1.
    pub fn new(id: impl Into<String>, datetime: Timestamp, origin: Origin) -> Self {
        Self {
            version: String::new(),
            id: id.into(),
            datetime,
            gateway: String::new(),
            origin,
            level: 1,
            properties: BTreeMap::new(),
            fallbacks: Vec::new(),
        }
    }

    /// Same metadata at call depth `level`. Depths below 1 are raised to 1.
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.max(1);
        self
    }

    /// Call depth: 1 for the action the gateway called, plus one per hop.
    pub fn level(&self) -> u32 {
        self.level.max(1)
    }

    /// A userland property, or `default` when unset.
    pub fn property<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.properties.get(name).map_or(default, String::as_str)
    }

    /// Set a userland property. Properties travel with the envelope to
    /// every later hop.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(name.into(), value.into());
    }

    /// Whether any property is set.
    pub fn has_properties(&self) -> bool {
        !self.properties.is_empty()
    }

    /// All userland properties.
    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Actions whose fallback response was used.
    pub fn fallbacks(&self) -> &[ActionKey] {
        &self.fallbacks
    }

    /// Record an action whose fallback response was used.
    pub fn add_fallback(&mut self, key: ActionKey) {
        self.fallbacks.push(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> TransportMeta {
        TransportMeta::new(
            "f1b27da9-240b-40e3-99dd-a567e4498ed7",
            Timestamp::parse("2016-04-12T02:49:05.761Z").unwrap(),
            Origin::new("users", "read"),
        )
    }

    #[test]
    fn level_never_below_one() {
        assert_eq!(meta().level(), 1);
        assert_eq!(meta().with_level(0).level(), 1);
        assert_eq!(meta().with_level(3).level(), 3);
    }

    #[test]
    fn property_default() {
        let mut m = meta();
        assert_eq!(m.property("locale", "en"), "en");
        m.set_property("locale", "es");
        assert_eq!(m.property("locale", "en"), "es");
        assert!(m.has_properties());
    }

    #[test]
    fn level_defaults_to_one_on_decode() {
        let json = r#"{"id":"1","datetime":"2016-04-12T02:49:05.761Z"}"#;
        let m: TransportMeta = serde_json::from_str(json).unwrap();
        assert_eq!(m.level(), 1);
        assert_eq!(m.origin, Origin::default());
    }
}
