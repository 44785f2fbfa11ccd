//! Business-level errors reported by handlers.
//!
//! These are data, not Rust errors: reporting one does not stop the handler
//! and the request may still return a value.

use serde::{Deserialize, Serialize};

/// Default status of a reported error.
pub const DEFAULT_ERROR_STATUS: &str = "500 Internal Server Error";

/// One reported error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Reporting service.
    pub service: String,
    /// Reporting service version.
    pub version: String,
    /// Message.
    pub message: String,
    /// Application error code.
    #[serde(default)]
    pub code: i64,
    /// HTTP status line.
    #[serde(default)]
    pub status: String,
}

/// Ordered list of reported errors.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportErrors {
    errors: Vec<ErrorRecord>,
}

impl TransportErrors {
    /// Append an error.
    pub fn push(&mut self, error: ErrorRecord) {
        self.errors.push(error);
    }

    /// Errors, optionally only those reported by `service`.
    pub fn filter(&self, service: Option<&str>) -> Vec<&ErrorRecord> {
        self.errors
            .iter()
            .filter(|e| service.map_or(true, |s| e.service == s))
            .collect()
    }

    /// Whether any error was reported.
    pub fn has(&self) -> bool {
        !self.errors.is_empty()
    }
}
