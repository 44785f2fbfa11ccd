//! # Mapping Loader
//!
//! Turns a mapping document into a [`Mapping`]. A document is a nested
//! object `service name -> version -> service schema`, supplied as a
//! `serde_json::Value`, a JSON file or a YAML file.
//!
//! ## Trust Boundary
//!
//! Mapping documents come from the platform, not from this process. Every
//! document is checked against the embedded `service-mapping.schema.json`
//! (Draft 2020-12) before it is decoded, and every declared `pattern` must
//! compile. Invalid documents are rejected with structured violations.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use jsonschema::Validator;
use serde_json::Value as JsonValue;

use crate::error::{SchemaLoadError, ValidationViolations, Violation};
use crate::mapping::Mapping;
use crate::service::ServiceSchema;

/// The JSON Schema every mapping document must satisfy.
pub const MAPPING_SCHEMA: &str = include_str!("../schemas/service-mapping.schema.json");

/// Loads and checks mapping documents.
///
/// The compiled validator is built once; a loader can be reused for any
/// number of documents and shared across threads.
pub struct MappingLoader {
    validator: Validator,
}

impl fmt::Debug for MappingLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingLoader").finish_non_exhaustive()
    }
}

impl MappingLoader {
    /// Compile the embedded mapping schema.
    ///
    /// # Errors
    ///
    /// [`SchemaLoadError::Build`] if the embedded schema does not compile.
    pub fn new() -> Result<Self, SchemaLoadError> {
        let schema: JsonValue = serde_json::from_str(MAPPING_SCHEMA)
            .map_err(|e| SchemaLoadError::Build(format!("invalid JSON: {e}")))?;

        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);
        let validator = opts
            .build(&schema)
            .map_err(|e| SchemaLoadError::Build(e.to_string()))?;

        Ok(Self { validator })
    }

    /// Check a document against the mapping schema without decoding it.
    pub fn check(&self, document: &JsonValue) -> Result<(), SchemaLoadError> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(document)
            .map(|e| {
                Violation::new(
                    e.instance_path.to_string(),
                    e.schema_path.to_string(),
                    e.to_string(),
                )
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaLoadError::Invalid {
                violations: violations.into(),
            })
        }
    }

    /// Check, decode and build a mapping from a parsed document.
    ///
    /// # Errors
    ///
    /// - [`SchemaLoadError::Invalid`] when the document does not conform to
    ///   the mapping schema, a `pattern` does not compile, or a `default`
    ///   does not satisfy its parameter type.
    /// - [`SchemaLoadError::Decode`] when a conforming document still fails
    ///   to decode.
    pub fn load(&self, document: &JsonValue) -> Result<Mapping, SchemaLoadError> {
        self.check(document)?;

        let tree: BTreeMap<String, BTreeMap<String, ServiceSchema>> =
            serde_json::from_value(document.clone())
                .map_err(|e| SchemaLoadError::Decode(e.to_string()))?;

        let services: Vec<ServiceSchema> = tree
            .into_iter()
            .flat_map(|(name, versions)| {
                versions
                    .into_iter()
                    .map(move |(version, schema)| schema.named(&name, &version))
            })
            .collect();

        let violations = enforceability(&services);
        if !violations.is_empty() {
            return Err(SchemaLoadError::Invalid { violations });
        }

        let mapping = Mapping::new(services);
        tracing::info!(services = mapping.len(), "loaded service mapping");
        Ok(mapping)
    }

    /// Read a mapping document from disk and load it.
    ///
    /// `.yaml` and `.yml` files are parsed as YAML, anything else as JSON.
    pub fn load_file(&self, path: &Path) -> Result<Mapping, SchemaLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| SchemaLoadError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let parse_error = |reason: String| SchemaLoadError::Parse {
            path: path.display().to_string(),
            reason,
        };

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let document = match ext {
            "yaml" | "yml" => {
                let yaml: serde_yaml::Value = serde_yaml::from_str(&content)
                    .map_err(|e| parse_error(format!("invalid YAML: {e}")))?;
                yaml_to_json_value(&yaml)
                    .map_err(|e| parse_error(format!("YAML-to-JSON conversion failed: {e}")))?
            }
            _ => serde_json::from_str(&content)
                .map_err(|e| parse_error(format!("invalid JSON: {e}")))?,
        };

        tracing::debug!(path = %path.display(), "read mapping document");
        self.load(&document)
    }
}

/// Constraints the JSON Schema cannot express: regex syntax and default
/// types.
fn enforceability(services: &[ServiceSchema]) -> ValidationViolations {
    let mut found = ValidationViolations::default();
    for service in services {
        for action in service.actions() {
            for param in action.params() {
                let at = format!(
                    "/{}/{}/actions/{}/params/{}",
                    pointer_escape(&service.name),
                    pointer_escape(&service.version),
                    pointer_escape(&action.name),
                    pointer_escape(&param.name),
                );
                if let Some(pattern) = &param.pattern {
                    if let Err(e) = regex::Regex::new(pattern) {
                        found.push(Violation::new(
                            format!("{at}/pattern"),
                            "/$defs/param/properties/pattern",
                            format!("pattern does not compile: {e}"),
                        ));
                    }
                }
                if let Some(default) = &param.default {
                    if !default.is_null() && !param.ty.accepts(default) {
                        found.push(Violation::new(
                            format!("{at}/default"),
                            "/$defs/param/properties/default",
                            format!("default {default} is not a valid {}", param.ty),
                        ));
                    }
                }
            }
        }
    }
    found
}

/// Escape a map key for use as a JSON Pointer token.
fn pointer_escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Mapping documents use only the JSON-compatible subset of YAML. Tags are
/// dropped and scalar map keys are stringified.
pub(crate) fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<JsonValue, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(JsonValue::Null),
        serde_yaml::Value::Bool(b) => Ok(JsonValue::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(JsonValue::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(JsonValue::from(u))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(JsonValue::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(JsonValue::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(JsonValue::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    // Versions like `1.0` parse as floats.
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key: {other:?}")),
                };
                object.insert(key, yaml_to_json_value(v)?);
            }
            Ok(JsonValue::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
