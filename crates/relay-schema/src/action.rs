//! # Action Schemas
//!
//! The contract of one action: parameters, file parameters, the shape of
//! the entity it returns and its HTTP exposure.
//!
//! ## Entity Resolution
//!
//! An action may declare where its entity lives inside a response payload
//! with an `entity_path` such as `"entity:data"` and a `path_delimiter`
//! such as `":"`. [`ActionSchema::resolve_entity`] walks that path. An
//! action with no entity path returns the payload unchanged; a declared
//! path that does not resolve is an [`RelayError::EntityResolution`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use relay_core::{NotFound, RelayError, RelayResult, Value};

use crate::file::FileSchema;
use crate::http::ActionHttp;
use crate::param::ParamSchema;

/// Default action timeout in milliseconds.
pub const DEFAULT_ACTION_TIMEOUT: u64 = 30_000;

fn default_timeout() -> u64 {
    DEFAULT_ACTION_TIMEOUT
}

fn slash() -> String {
    "/".to_string()
}

fn id() -> String {
    "id".to_string()
}

/// Declared contract of one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSchema {
    /// Action name. Filled from the enclosing map key on load.
    #[serde(default)]
    pub name: String,
    /// Whether the action is scheduled for removal.
    #[serde(default)]
    pub deprecated: bool,
    /// Maximum execution time in milliseconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Path of the entity inside a response payload. Empty when the
    /// payload is the entity.
    #[serde(default)]
    pub entity_path: String,
    /// Separator of `entity_path` segments.
    #[serde(default = "slash")]
    pub path_delimiter: String,
    /// Field holding the entity's primary key.
    #[serde(default = "id")]
    pub primary_key: String,
    /// Whether the action returns a collection rather than one entity.
    #[serde(default)]
    pub collection: bool,
    /// Declared entity definition.
    #[serde(default)]
    pub entity: Option<Value>,
    /// HTTP exposure.
    #[serde(default)]
    pub http: ActionHttp,
    #[serde(default)]
    params: BTreeMap<String, ParamSchema>,
    #[serde(default)]
    files: BTreeMap<String, FileSchema>,
}

impl ActionSchema {
    /// An action with no parameters, files or entity declaration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deprecated: false,
            timeout: DEFAULT_ACTION_TIMEOUT,
            entity_path: String::new(),
            path_delimiter: slash(),
            primary_key: id(),
            collection: false,
            entity: None,
            http: ActionHttp::default(),
            params: BTreeMap::new(),
            files: BTreeMap::new(),
        }
    }

    /// Add a parameter schema, replacing any of the same name.
    pub fn with_param(mut self, param: ParamSchema) -> Self {
        self.params.insert(param.name.clone(), param);
        self
    }

    /// Add a file schema, replacing any of the same name.
    pub fn with_file(mut self, file: FileSchema) -> Self {
        self.files.insert(file.name.clone(), file);
        self
    }

    /// Declare the entity path and its delimiter.
    pub fn with_entity_path(mut self, path: impl Into<String>, delimiter: impl Into<String>) -> Self {
        self.entity_path = path.into();
        self.path_delimiter = delimiter.into();
        self
    }

    /// Parameter schemas, ordered by name.
    pub fn params(&self) -> impl Iterator<Item = &ParamSchema> {
        self.params.values()
    }

    /// Parameter names, ordered.
    pub fn param_names(&self) -> Vec<&str> {
        self.params.keys().map(String::as_str).collect()
    }

    /// Whether a parameter with this name is declared.
    pub fn has_param(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    /// Look up a parameter schema.
    ///
    /// # Errors
    ///
    /// [`NotFound::Param`] naming the parameter.
    pub fn param_schema(&self, name: &str) -> RelayResult<&ParamSchema> {
        self.params
            .get(name)
            .ok_or_else(|| NotFound::Param(name.to_string()).into())
    }

    /// File parameter schemas, ordered by name.
    pub fn files(&self) -> impl Iterator<Item = &FileSchema> {
        self.files.values()
    }

    /// Whether a file parameter with this name is declared.
    pub fn has_file(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Look up a file parameter schema.
    ///
    /// # Errors
    ///
    /// [`NotFound::File`] naming the file parameter.
    pub fn file_schema(&self, name: &str) -> RelayResult<&FileSchema> {
        self.files
            .get(name)
            .ok_or_else(|| NotFound::File(name.to_string()).into())
    }

    /// Whether a non-empty entity definition is declared.
    pub fn has_entity(&self) -> bool {
        self.entity
            .as_ref()
            .is_some_and(|e| !e.is_null() && !e.is_empty_container())
    }

    /// The entity definition, or an empty map when none is declared.
    pub fn entity(&self) -> Value {
        self.entity
            .clone()
            .unwrap_or_else(|| Value::Map(BTreeMap::new()))
    }

    /// Whether an entity path is declared.
    pub fn has_entity_path(&self) -> bool {
        !self.entity_path.is_empty()
    }

    /// Extract the entity from a response payload by walking
    /// `entity_path`.
    ///
    /// # Errors
    ///
    /// [`RelayError::EntityResolution`] when a declared path segment is
    /// missing from the payload.
    pub fn resolve_entity<'a>(&self, payload: &'a Value) -> RelayResult<&'a Value> {
        if !self.has_entity_path() {
            return Ok(payload);
        }

        let segments: Vec<&str> = if self.path_delimiter.is_empty() {
            vec![self.entity_path.as_str()]
        } else {
            self.entity_path.split(self.path_delimiter.as_str()).collect()
        };

        segments.into_iter().try_fold(payload, |node, segment| {
            node.get(segment).ok_or_else(|| RelayError::EntityResolution {
                action: self.name.clone(),
            })
        })
    }

    pub(crate) fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self.params = std::mem::take(&mut self.params)
            .into_iter()
            .map(|(key, param)| {
                let param = param.named(&key);
                (key, param)
            })
            .collect();
        self.files = std::mem::take(&mut self.files)
            .into_iter()
            .map(|(key, file)| {
                let file = file.named(&key);
                (key, file)
            })
            .collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::ParamType;
    use serde_json::json;

    fn payload() -> Value {
        Value::from(json!({"entity": {"data": {"id": 7}}}))
    }

    #[test]
    fn no_entity_path_is_identity() {
        let action = ActionSchema::new("read");
        let p = payload();
        assert_eq!(action.resolve_entity(&p).unwrap(), &p);
    }

    #[test]
    fn entity_path_descends() {
        let action = ActionSchema::new("read").with_entity_path("entity:data", ":");
        let p = payload();
        assert_eq!(
            action.resolve_entity(&p).unwrap(),
            &Value::from(json!({"id": 7}))
        );
    }

    #[test]
    fn missing_segment_names_action() {
        let action = ActionSchema::new("list").with_entity_path("entity:data", ":");
        let p = Value::from(json!({"entity": {}}));
        let err = action.resolve_entity(&p).unwrap_err();
        assert_eq!(err.to_string(), "cannot resolve entity for action: list");
    }

    #[test]
    fn default_delimiter_is_slash() {
        let action: ActionSchema =
            serde_json::from_value(json!({"entity_path": "entity/data"})).unwrap();
        let p = payload();
        assert!(action.resolve_entity(&p).is_ok());
    }

    #[test]
    fn lookups_fail_with_named_resource() {
        let action = ActionSchema::new("list").with_param(ParamSchema::new("q", ParamType::String));
        assert!(action.has_param("q"));
        assert!(action.param_schema("q").is_ok());
        assert_eq!(
            action.param_schema("foo").unwrap_err().to_string(),
            "cannot resolve schema for parameter: foo"
        );
        assert_eq!(
            action.file_schema("foo").unwrap_err().to_string(),
            "cannot resolve schema for file parameter: foo"
        );
    }

    #[test]
    fn entity_definition() {
        let action = ActionSchema::new("list");
        assert!(!action.has_entity());
        assert_eq!(action.entity(), Value::Map(BTreeMap::new()));

        let action: ActionSchema =
            serde_json::from_value(json!({"entity": {"field": [{"name": "id", "type": "integer"}]}}))
                .unwrap();
        assert!(action.has_entity());
    }
}
