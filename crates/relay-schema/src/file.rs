//! File parameter schemas.

use serde::{Deserialize, Serialize};

use crate::http::FileHttp;

fn text_plain() -> String {
    "text/plain".to_string()
}

/// Declared contract of one file parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSchema {
    /// File parameter name. Filled from the enclosing map key on load.
    #[serde(default)]
    pub name: String,
    /// Comma separated MIME allow-list.
    #[serde(default = "text_plain")]
    pub mime: String,
    /// Whether the file must be sent.
    #[serde(default)]
    pub required: bool,
    /// Maximum size in bytes.
    #[serde(default)]
    pub max: Option<u64>,
    /// Whether `max` itself is excluded.
    #[serde(default)]
    pub exclusive_max: bool,
    /// Minimum size in bytes.
    #[serde(default)]
    pub min: Option<u64>,
    /// Whether `min` itself is excluded.
    #[serde(default)]
    pub exclusive_min: bool,
    /// HTTP exposure.
    #[serde(default)]
    pub http: FileHttp,
}

impl FileSchema {
    /// The MIME types of the allow-list, trimmed.
    pub fn mime_types(&self) -> impl Iterator<Item = &str> {
        self.mime.split(',').map(str::trim).filter(|m| !m.is_empty())
    }

    /// Whether `mime` is on the allow-list. `*` and `*/*` accept anything;
    /// `type/*` entries match by prefix.
    pub fn accepts_mime(&self, mime: &str) -> bool {
        self.mime_types().any(|allowed| {
            if allowed == "*" || allowed == "*/*" {
                return true;
            }
            match allowed.strip_suffix('*') {
                Some(prefix) => mime
                    .get(..prefix.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(prefix)),
                None => allowed.eq_ignore_ascii_case(mime),
            }
        })
    }

    pub(crate) fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        if self.http.param.is_empty() {
            self.http.param = name.to_string();
        }
        self
    }
}
