//! Service schemas: one per `(name, version)`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use relay_core::{NotFound, RelayResult, ServiceOrigin};

use crate::action::ActionSchema;
use crate::http::ServiceHttp;

/// Declared contract of one service version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSchema {
    /// Service name. Filled from the document key on load.
    #[serde(default)]
    pub name: String,
    /// Service version. Filled from the document key on load.
    #[serde(default)]
    pub version: String,
    /// Network address of the service, when published.
    #[serde(default)]
    pub address: String,
    /// HTTP exposure.
    #[serde(default)]
    pub http: ServiceHttp,
    #[serde(default)]
    actions: BTreeMap<String, ActionSchema>,
}

impl ServiceSchema {
    /// A service with no actions.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            address: String::new(),
            http: ServiceHttp::default(),
            actions: BTreeMap::new(),
        }
    }

    /// Add an action schema, replacing any of the same name.
    pub fn with_action(mut self, action: ActionSchema) -> Self {
        self.actions.insert(action.name.clone(), action);
        self
    }

    /// `(name, version)` of this service.
    pub fn origin(&self) -> ServiceOrigin {
        ServiceOrigin::new(self.name.clone(), self.version.clone())
    }

    /// Action schemas, ordered by name.
    pub fn actions(&self) -> impl Iterator<Item = &ActionSchema> {
        self.actions.values()
    }

    /// Action names, ordered.
    pub fn action_names(&self) -> Vec<&str> {
        self.actions.keys().map(String::as_str).collect()
    }

    /// Whether an action with this name is declared.
    pub fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Look up an action schema.
    ///
    /// # Errors
    ///
    /// [`NotFound::Action`] naming the action.
    pub fn action_schema(&self, name: &str) -> RelayResult<&ActionSchema> {
        self.actions
            .get(name)
            .ok_or_else(|| NotFound::Action(name.to_string()).into())
    }

    pub(crate) fn named(mut self, name: &str, version: &str) -> Self {
        self.name = name.to_string();
        self.version = version.to_string();
        self.actions = std::mem::take(&mut self.actions)
            .into_iter()
            .map(|(key, action)| {
                let action = action.named(&key);
                (key, action)
            })
            .collect();
        self
    }
}
