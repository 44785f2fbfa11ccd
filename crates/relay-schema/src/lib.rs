//! # relay-schema — Service Schema Registry & Validation
//!
//! Holds the contracts that every validated action is checked against,
//! keyed service name -> version -> action -> parameter.
//!
//! ## Registry (`mapping`, `service`, `action`, `param`, `file`, `http`)
//!
//! A [`Mapping`] is loaded once and is immutable afterwards. Every lookup is
//! exact and total: a missing service version, action, parameter or file
//! parameter fails with a [`relay_core::NotFound`] naming what was asked
//! for. Constraint sentinels of mapping documents (`-1` bounds, empty
//! patterns) are decoded to `None`.
//!
//! ## Loading (`loader`)
//!
//! [`MappingLoader`] checks documents against the embedded
//! `service-mapping.schema.json` with the `jsonschema` crate before
//! decoding them. JSON and YAML files are both accepted.
//!
//! ## Validation (`validate`)
//!
//! [`validate_params`] and [`validate_files`] apply an action's contract to
//! inbound request input, collecting every violation.
//!
//! ## Crate Policy
//!
//! - Depends only on `relay-core` internally.
//! - The registry performs lookups; it never enforces constraints on its
//!   own. Enforcement is the caller's decision.

mod de;

pub mod action;
pub mod error;
pub mod file;
pub mod http;
pub mod loader;
pub mod mapping;
pub mod param;
pub mod service;
pub mod validate;

pub use action::{ActionSchema, DEFAULT_ACTION_TIMEOUT};
pub use error::{ParamValidationError, SchemaLoadError, ValidationViolations, Violation};
pub use file::FileSchema;
pub use http::{ActionHttp, FileHttp, ParamHttp, ServiceHttp};
pub use loader::MappingLoader;
pub use mapping::Mapping;
pub use param::{ArrayFormat, ParamSchema};
pub use service::ServiceSchema;
pub use validate::{validate_files, validate_params, FileInput};
