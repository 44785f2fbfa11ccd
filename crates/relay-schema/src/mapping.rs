//! # Schema Mapping
//!
//! The process-wide registry of service schemas. A `Mapping` is built once
//! (usually by [`crate::MappingLoader`]) and never mutated afterwards, so it
//! can be shared across request workers behind an `Arc` without locking.

use relay_core::{NotFound, RelayResult, ServiceOrigin};

use crate::service::ServiceSchema;

/// Immutable set of service schemas, unique by `(name, version)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    services: Vec<ServiceSchema>,
}

impl Mapping {
    /// Build a mapping. A later schema with the same `(name, version)`
    /// replaces the earlier one.
    pub fn new(services: impl IntoIterator<Item = ServiceSchema>) -> Self {
        let mut unique: Vec<ServiceSchema> = Vec::new();
        for schema in services {
            match unique
                .iter_mut()
                .find(|s| s.name == schema.name && s.version == schema.version)
            {
                Some(existing) => *existing = schema,
                None => unique.push(schema),
            }
        }
        Self { services: unique }
    }

    /// Find the schema of a service version.
    ///
    /// # Errors
    ///
    /// [`NotFound::Service`] naming both the service and the version. A
    /// missing service and a missing version are not distinguished.
    pub fn find(&self, service: &str, version: &str) -> RelayResult<&ServiceSchema> {
        self.services
            .iter()
            .find(|s| s.name == service && s.version == version)
            .ok_or_else(|| {
                NotFound::Service {
                    service: service.to_string(),
                    version: version.to_string(),
                }
                .into()
            })
    }

    /// Whether a schema for this service version is loaded.
    pub fn contains(&self, service: &str, version: &str) -> bool {
        self.services
            .iter()
            .any(|s| s.name == service && s.version == version)
    }

    /// The `(name, version)` of every loaded schema, in load order.
    pub fn services(&self) -> Vec<ServiceOrigin> {
        self.services.iter().map(ServiceSchema::origin).collect()
    }

    /// Number of loaded service versions.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether no schema is loaded.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> Mapping {
        Mapping::new([
            ServiceSchema::new("posts", "1.0.0"),
            ServiceSchema::new("posts", "0.2.3"),
            ServiceSchema::new("admin", "1.0.0"),
        ])
    }

    #[test]
    fn find_exact_match() {
        let m = mapping();
        let s = m.find("posts", "1.0.0").unwrap();
        assert_eq!(s.name, "posts");
        assert_eq!(s.version, "1.0.0");
    }

    #[test]
    fn version_mismatch_is_not_found() {
        let err = mapping().find("posts", "0.1.0").unwrap_err();
        assert_eq!(err.to_string(), "cannot resolve schema for service: posts (0.1.0)");
    }

    #[test]
    fn name_mismatch_is_not_found() {
        let err = mapping().find("comments", "1.0.0").unwrap_err();
        assert_eq!(err.to_string(), "cannot resolve schema for service: comments (1.0.0)");
    }

    #[test]
    fn duplicates_collapse() {
        let m = Mapping::new([
            ServiceSchema::new("posts", "1.0.0"),
            ServiceSchema::new("posts", "1.0.0"),
        ]);
        assert_eq!(m.len(), 1);
        assert!(m.contains("posts", "1.0.0"));
        assert_eq!(m.services(), vec![ServiceOrigin::new("posts", "1.0.0")]);
    }
}
