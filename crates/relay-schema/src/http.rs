//! HTTP exposure descriptors attached to services, actions, parameters and
//! file parameters. They describe how the gateway maps an HTTP request onto
//! the action; nothing in this crate acts on them.

use serde::{Deserialize, Serialize};

use relay_core::ParamLocation;

fn yes() -> bool {
    true
}

fn get() -> String {
    "get".to_string()
}

fn text_plain() -> String {
    "text/plain".to_string()
}

/// Service-level HTTP descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHttp {
    /// Whether the service is reachable through the HTTP gateway.
    #[serde(default = "yes")]
    pub accessible: bool,
    /// Path prefix for every action of the service.
    #[serde(default)]
    pub base_path: String,
}

impl Default for ServiceHttp {
    fn default() -> Self {
        Self {
            accessible: true,
            base_path: String::new(),
        }
    }
}

/// Action-level HTTP descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionHttp {
    /// Whether the action is reachable through the HTTP gateway.
    #[serde(default = "yes")]
    pub accessible: bool,
    /// Path template, e.g. `/posts/{user_id}`.
    #[serde(default)]
    pub path: String,
    /// Lowercase HTTP method.
    #[serde(default = "get")]
    pub method: String,
    /// Default location parameters are read from.
    #[serde(default)]
    pub input: ParamLocation,
    /// Content type of the request body.
    #[serde(default = "text_plain")]
    pub body: String,
}

impl Default for ActionHttp {
    fn default() -> Self {
        Self {
            accessible: true,
            path: String::new(),
            method: get(),
            input: ParamLocation::default(),
            body: text_plain(),
        }
    }
}

/// Parameter-level HTTP descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamHttp {
    /// Whether the parameter may be supplied over HTTP.
    #[serde(default = "yes")]
    pub accessible: bool,
    /// Location the parameter is read from.
    #[serde(default)]
    pub input: ParamLocation,
    /// Name of the HTTP field. Empty in a document means the parameter name.
    #[serde(default)]
    pub param: String,
}

impl Default for ParamHttp {
    fn default() -> Self {
        Self {
            accessible: true,
            input: ParamLocation::default(),
            param: String::new(),
        }
    }
}

/// File-parameter HTTP descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileHttp {
    /// Whether the file may be uploaded over HTTP.
    #[serde(default = "yes")]
    pub accessible: bool,
    /// Name of the multipart field. Empty in a document means the file name.
    #[serde(default)]
    pub param: String,
}

impl Default for FileHttp {
    fn default() -> Self {
        Self {
            accessible: true,
            param: String::new(),
        }
    }
}
