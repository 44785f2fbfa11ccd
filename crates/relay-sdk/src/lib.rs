//! # relay-sdk — Handler Runtime
//!
//! The layer user code is written against. A [`Component`] registers one
//! [`ActionHandler`] per action name and answers [`ActionRequest`] values
//! handed in by an external mapper. Each handler receives an
//! [`ActionContext`] over the request's transport envelope and leaves its
//! results there.
//!
//! ```
//! use relay_sdk::{ActionRequest, Component, ComponentConfig};
//! use relay_transport::Transport;
//!
//! let mut component = Component::new(ComponentConfig::new("users", "1.0.0"));
//! component.action("read", |ctx| {
//!     ctx.set_entity(serde_json::json!({"id": 1, "name": "Ada"}))?;
//!     Ok(())
//! });
//!
//! let reply = component
//!     .dispatch(ActionRequest::new("read", Transport::new_empty()))
//!     .unwrap();
//! assert!(!reply.transport.data_ledger().is_empty());
//! ```
//!
//! ## Ambient concerns
//!
//! - Configuration: [`ComponentConfig`], from code or `RELAY_*` variables.
//! - Logging: `tracing` throughout, [`logging::init`] for processes that
//!   do not install their own subscriber.
//! - Metrics: `metrics` counters per dispatched and failed action. No
//!   exporter is installed here.
//!
//! ## Crate Policy
//!
//! - One request is handled at a time; the envelope is owned by the
//!   context for the duration of the handler.
//! - Business failures are data ([`ActionContext::error`]); only faults
//!   become [`DispatchError`].

pub mod component;
pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod logging;
pub mod request;
pub mod resources;

pub use component::Component;
pub use config::{ComponentConfig, ConfigError, MappingStyle};
pub use context::ActionContext;
pub use error::DispatchError;
pub use handler::{ActionHandler, HandlerResult};
pub use request::{ActionReply, ActionRequest, RequestSource};
pub use resources::Resources;
