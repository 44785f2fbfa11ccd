//! Hyperlinks published by services for downstream consumers.

use serde::{Deserialize, Serialize};

/// A named URI in a service namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Namespace, the name of the service that published the link.
    pub namespace: String,
    /// Link name, e.g. `self`.
    pub name: String,
    /// Target URI.
    pub uri: String,
}

/// Append-only list of links. When a name is published twice in one
/// namespace the later entry is the effective one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportLinks {
    links: Vec<Link>,
}

impl TransportLinks {
    /// Publish a link.
    pub fn set(&mut self, namespace: impl Into<String>, name: impl Into<String>, uri: impl Into<String>) {
        self.links.push(Link {
            namespace: namespace.into(),
            name: name.into(),
            uri: uri.into(),
        });
    }

    /// The effective URI of `name` in `namespace`.
    pub fn get(&self, namespace: &str, name: &str) -> Option<&str> {
        self.links
            .iter()
            .rev()
            .find(|l| l.namespace == namespace && l.name == name)
            .map(|l| l.uri.as_str())
    }

    /// Links, optionally only those of one namespace.
    pub fn filter(&self, namespace: Option<&str>) -> Vec<&Link> {
        self.links
            .iter()
            .filter(|l| namespace.map_or(true, |n| l.namespace == n))
            .collect()
    }

    /// Whether no link is recorded.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
