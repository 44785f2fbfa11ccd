//! # Error Types
//!
//! The error kinds shared by every Relay crate. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations and are raised
//! synchronously to the caller of the offending operation. None of them is
//! retried internally.
//!
//! ## Design
//!
//! - Shape violations of business payloads are `MalformedPayload`.
//! - Every failed lookup (schemas, resources, handlers) is a `NotFound`
//!   naming the missing resource. Lookups never fall back to a default.
//! - Business-level failures reported by handlers are *not* errors; they
//!   are recorded as data in the transport envelope.

use thiserror::Error;

use crate::types::ParamType;

/// Top-level error type for the Relay SDK core.
#[derive(Error, Debug)]
pub enum RelayError {
    /// An entity or collection did not have the expected shape.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A named resource could not be resolved.
    #[error(transparent)]
    NotFound(#[from] NotFound),

    /// An action declared an entity path that is absent from its payload.
    #[error("cannot resolve entity for action: {action}")]
    EntityResolution {
        /// Name of the action whose entity path failed to resolve.
        action: String,
    },

    /// A type name outside the type catalog.
    #[error("invalid value type: {0}")]
    InvalidType(String),

    /// A parameter value whose runtime shape does not satisfy its type.
    #[error("value of parameter '{name}' is not a valid {expected}")]
    InvalidValue {
        /// Parameter name.
        name: String,
        /// The declared type the value failed to satisfy.
        expected: ParamType,
    },

    /// A resource producer returned nothing.
    #[error("set resource {0} failed")]
    ResourceInit(String),

    /// A resource exists but was stored as a different Rust type.
    #[error("resource {0} has a different type than requested")]
    ResourceType(String),
}

/// A lookup that failed because the named resource does not exist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    /// No service schema is loaded for this name and version.
    #[error("cannot resolve schema for service: {service} ({version})")]
    Service {
        /// Service name that was looked up.
        service: String,
        /// Service version that was looked up.
        version: String,
    },

    /// The service schema has no action with this name.
    #[error("cannot resolve schema for action: {0}")]
    Action(String),

    /// The action schema has no parameter with this name.
    #[error("cannot resolve schema for parameter: {0}")]
    Param(String),

    /// The action schema has no file parameter with this name.
    #[error("cannot resolve schema for file parameter: {0}")]
    File(String),

    /// No resource is registered under this name.
    #[error("resource {0} not found")]
    Resource(String),

    /// No handler is registered for this action.
    #[error("no handler registered for action: {0}")]
    Handler(String),
}

/// Convenience alias used throughout the core crates.
pub type RelayResult<T> = Result<T, RelayError>;
