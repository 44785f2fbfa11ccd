//! The inbound and outbound boundaries of a component.
//!
//! An external mapper decodes wire messages into [`ActionRequest`] values
//! and encodes [`ActionReply`] values back. Neither side knows about bytes.

use serde::{Deserialize, Serialize};

use relay_core::{ParamValue, Value};
use relay_transport::{File, Transport};

use crate::error::DispatchError;

/// A decoded request for one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Action to run.
    pub action: String,
    /// Envelope of the request.
    pub transport: Transport,
    /// Inbound parameters.
    #[serde(default)]
    pub params: Vec<ParamValue>,
}

impl ActionRequest {
    /// A request for `action` with no parameters.
    pub fn new(action: impl Into<String>, transport: Transport) -> Self {
        Self {
            action: action.into(),
            transport,
            params: Vec::new(),
        }
    }

    /// Attach the inbound parameters, in arrival order.
    pub fn with_params(mut self, params: Vec<ParamValue>) -> Self {
        self.params = params;
        self
    }
}

/// The outcome of a handled action.
///
/// When a handler sets both a return value and a download body, both are
/// kept; the mapper decides which one reaches the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionReply {
    /// The mutated envelope.
    pub transport: Transport,
    /// Direct return value of the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_value: Option<Value>,
}

impl ActionReply {
    /// The download body designated by the handler.
    pub fn download(&self) -> Option<&File> {
        self.transport.download()
    }

    /// Whether the handler set a return value.
    pub fn has_return(&self) -> bool {
        self.return_value.is_some()
    }
}

/// Supplier of requests for [`Component::run`](crate::Component::run) and
/// sink of their outcomes.
pub trait RequestSource {
    /// The next request, or `None` when the source is exhausted.
    fn next_request(&mut self) -> Option<ActionRequest>;

    /// Deliver the outcome of the request last returned.
    fn reply(&mut self, outcome: Result<ActionReply, DispatchError>);
}
