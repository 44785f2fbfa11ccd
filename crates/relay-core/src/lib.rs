//! # relay-core — Foundational Types for the Relay SDK
//!
//! Leaf crate of the workspace. It defines the value model that request
//! parameters and business payloads are expressed in, the type catalog that
//! both parameters and schemas validate against, and the error kinds every
//! other crate raises.
//!
//! ## Key Design Principles
//!
//! 1. **Lists and records are different types.** [`Value`] has separate
//!    `List` and `Map` variants. Producers that encode lists as maps with
//!    `"0"`, `"1"`, ... keys are recognised by [`Value::looks_like_list`].
//!
//! 2. **Parameters are always well-typed.** [`ParamValue::new`] and the
//!    serde decode path both check the value against its [`ParamType`].
//!
//! 3. **Absence is data, lookups are strict.** A missing request parameter
//!    is an empty placeholder, but a missing schema, resource or handler is
//!    always a [`NotFound`] error.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `relay-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod param;
pub mod temporal;
pub mod types;
pub mod value;

pub use error::{NotFound, RelayError, RelayResult};
pub use identity::{ActionKey, ServiceOrigin};
pub use param::{ParamLocation, ParamValue};
pub use temporal::Timestamp;
pub use types::{ParamType, TypeCatalog};
pub use value::Value;
