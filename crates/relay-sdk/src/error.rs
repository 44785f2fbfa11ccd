//! Dispatch errors.

use thiserror::Error;

use relay_core::RelayError;
use relay_schema::ParamValidationError;

/// Why a request could not be answered by its handler.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A lookup or payload shape failure.
    #[error(transparent)]
    Relay(#[from] RelayError),

    /// Inbound parameters or files violated the action's contract.
    #[error(transparent)]
    Validation(#[from] ParamValidationError),

    /// The handler returned an error.
    #[error("action {action} failed: {source}")]
    Handler {
        /// Action whose handler failed.
        action: String,
        /// The handler's error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl DispatchError {
    /// Short classification used as a metrics label.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Relay(RelayError::NotFound(_)) => "not_found",
            Self::Relay(RelayError::EntityResolution { .. }) => "entity_resolution",
            Self::Relay(_) => "malformed",
            Self::Validation(_) => "validation",
            Self::Handler { .. } => "handler",
        }
    }
}
