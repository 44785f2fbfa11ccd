//! # Declared Calls
//!
//! A [`Call`] is a declaration that an action wants another action to run.
//! Nothing in this crate executes it: the platform reads the `calls` ledger
//! after the handler returns and dispatches each entry.
//!
//! ## Call Kinds
//!
//! | Kind       | Routed by            | Timeout |
//! |------------|----------------------|---------|
//! | `Runtime`  | the mesh             | yes     |
//! | `Deferred` | the mesh, not awaited| no      |
//! | `Remote`   | an explicit address  | yes     |
//!
//! Calls are immutable once built.

use serde::{Deserialize, Serialize};

use relay_core::{ParamValue, ServiceOrigin};

use crate::files::File;

/// Default timeout of runtime calls in milliseconds.
pub const DEFAULT_CALL_TIMEOUT: u64 = 1000;

/// How the platform should carry out a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CallKind {
    /// Routed by the mesh and awaited up to `timeout` milliseconds.
    Runtime {
        /// Upper bound in milliseconds.
        timeout: u64,
    },
    /// Routed by the mesh and queued without waiting for the result.
    Deferred,
    /// Sent to an explicit address outside the mesh's routing.
    Remote {
        /// Network address of the remote component.
        address: String,
        /// Upper bound in milliseconds.
        timeout: u64,
    },
}

/// The destination and arguments of a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallTarget {
    /// Target service.
    pub service: String,
    /// Target service version.
    pub version: String,
    /// Target action.
    pub action: String,
    /// Arguments.
    #[serde(default)]
    pub params: Vec<ParamValue>,
    /// Attached files.
    #[serde(default)]
    pub files: Vec<File>,
}

impl CallTarget {
    /// A target with no arguments.
    pub fn new(service: impl Into<String>, version: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            action: action.into(),
            params: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn param(mut self, param: ParamValue) -> Self {
        self.params.push(param);
        self
    }

    /// Replace the arguments.
    pub fn params(mut self, params: Vec<ParamValue>) -> Self {
        self.params = params;
        self
    }

    /// Attach a file.
    pub fn file(mut self, file: File) -> Self {
        self.files.push(file);
        self
    }
}

/// A declared call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    origin: ServiceOrigin,
    caller: String,
    #[serde(flatten)]
    target: CallTarget,
    #[serde(flatten)]
    kind: CallKind,
}

impl Call {
    /// A mesh-routed call awaited up to `timeout` milliseconds.
    pub fn runtime(origin: ServiceOrigin, caller: impl Into<String>, target: CallTarget, timeout: u64) -> Self {
        Self::build(origin, caller, target, CallKind::Runtime { timeout })
    }

    /// A mesh-routed call queued without waiting.
    pub fn deferred(origin: ServiceOrigin, caller: impl Into<String>, target: CallTarget) -> Self {
        Self::build(origin, caller, target, CallKind::Deferred)
    }

    /// A call to an explicit address.
    pub fn remote(
        origin: ServiceOrigin,
        caller: impl Into<String>,
        address: impl Into<String>,
        target: CallTarget,
        timeout: u64,
    ) -> Self {
        Self::build(
            origin,
            caller,
            target,
            CallKind::Remote {
                address: address.into(),
                timeout,
            },
        )
    }

    fn build(origin: ServiceOrigin, caller: impl Into<String>, target: CallTarget, kind: CallKind) -> Self {
        Self {
            origin,
            caller: caller.into(),
            target,
            kind,
        }
    }

    /// Service that declared the call.
    pub fn origin(&self) -> &ServiceOrigin {
        &self.origin
    }

    /// Action that declared the call.
    pub fn caller(&self) -> &str {
        &self.caller
    }

    /// Target service.
    pub fn service(&self) -> &str {
        &self.target.service
    }

    /// Target service version.
    pub fn version(&self) -> &str {
        &self.target.version
    }

    /// Target action.
    pub fn action(&self) -> &str {
        &self.target.action
    }

    /// Arguments.
    pub fn params(&self) -> &[ParamValue] {
        &self.target.params
    }

    /// Attached files.
    pub fn files(&self) -> &[File] {
        &self.target.files
    }

    /// Call kind.
    pub fn kind(&self) -> &CallKind {
        &self.kind
    }

    /// Timeout in milliseconds; `None` for deferred calls.
    pub fn timeout(&self) -> Option<u64> {
        match self.kind {
            CallKind::Runtime { timeout } | CallKind::Remote { timeout, .. } => Some(timeout),
            CallKind::Deferred => None,
        }
    }

    /// Address of a remote call.
    pub fn address(&self) -> Option<&str> {
        match &self.kind {
            CallKind::Remote { address, .. } => Some(address),
            _ => None,
        }
    }
}

/// Ordered list of declared calls.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportCalls {
    calls: Vec<Call>,
}

impl TransportCalls {
    /// Append a call.
    pub fn push(&mut self, call: Call) {
        self.calls.push(call);
    }

    /// Calls, optionally only those declared by `service`.
    pub fn filter(&self, service: Option<&str>) -> Vec<&Call> {
        self.calls
            .iter()
            .filter(|c| service.map_or(true, |s| c.origin.name() == s))
            .collect()
    }

    /// Whether any call is declared.
    pub fn has(&self) -> bool {
        !self.calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> ServiceOrigin {
        ServiceOrigin::new("users", "1.0.0")
    }

    #[test]
    fn kinds_expose_their_fields() {
        let target = CallTarget::new("posts", "1.2.0", "list").param(ParamValue::string("q", "x"));

        let runtime = Call::runtime(origin(), "read", target.clone(), DEFAULT_CALL_TIMEOUT);
        assert_eq!(runtime.timeout(), Some(1000));
        assert_eq!(runtime.address(), None);
        assert_eq!(runtime.caller(), "read");
        assert_eq!(runtime.params().len(), 1);

        let deferred = Call::deferred(origin(), "read", target.clone());
        assert_eq!(deferred.timeout(), None);

        let remote = Call::remote(origin(), "read", "ktp://87.65.43.21:4321", target, 500);
        assert_eq!(remote.address(), Some("ktp://87.65.43.21:4321"));
        assert_eq!(remote.timeout(), Some(500));
        assert_eq!(remote.service(), "posts");
    }

    #[test]
    fn filter_by_declaring_service() {
        let mut calls = TransportCalls::default();
        assert!(!calls.has());
        calls.push(Call::deferred(origin(), "read", CallTarget::new("posts", "1", "a")));
        calls.push(Call::deferred(
            ServiceOrigin::new("posts", "1"),
            "a",
            CallTarget::new("users", "1.0.0", "read"),
        ));
        assert!(calls.has());
        assert_eq!(calls.filter(Some("users")).len(), 1);
        assert_eq!(calls.filter(None).len(), 2);
    }

    #[test]
    fn serialized_kind_is_tagged() {
        let call = Call::remote(origin(), "read", "ktp://h:1", CallTarget::new("p", "1", "a"), 10);
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["kind"], "remote");
        assert_eq!(json["address"], "ktp://h:1");
        assert_eq!(json["service"], "p");
        let back: Call = serde_json::from_value(json).unwrap();
        assert_eq!(back, call);
    }
}
