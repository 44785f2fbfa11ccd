//! # Service Identities
//!
//! Typed identities for the participants of a call graph. A service is
//! addressed by name and version; an action additionally by action name.
//! Keeping these as distinct types prevents swapping a version for a
//! service name at call sites that take several strings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The `(service, version)` that declared a call or transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceOrigin {
    name: String,
    version: String,
}

impl ServiceOrigin {
    /// Create an origin from a service name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Service version.
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for ServiceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.version)
    }
}

/// A fully qualified action: `(service, version, action)`.
///
/// This is the key every per-action ledger of the transport is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionKey {
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Action name.
    pub action: String,
}

impl ActionKey {
    /// Create a key from its three parts.
    pub fn new(
        service: impl Into<String>,
        version: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            action: action.into(),
        }
    }

    /// The `(service, version)` half of the key.
    pub fn origin(&self) -> ServiceOrigin {
        ServiceOrigin::new(self.service.clone(), self.version.clone())
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) -> {}", self.service, self.version, self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_display() {
        assert_eq!(ServiceOrigin::new("users", "1.0.0").to_string(), "users (1.0.0)");
    }

    #[test]
    fn key_origin_half() {
        let key = ActionKey::new("users", "1.0.0", "read");
        assert_eq!(key.origin(), ServiceOrigin::new("users", "1.0.0"));
        assert_eq!(key.to_string(), "users (1.0.0) -> read");
    }
}
