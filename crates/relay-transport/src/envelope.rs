//! # Transport Envelope
//!
//! The accumulator that travels with a request through a chain of service
//! calls. It is created once per inbound request, mutated by exactly one
//! handler at a time and handed back to the boundary for encoding.
//!
//! ## Invariants
//!
//! - Ledgers only grow during a request. No operation removes or rewrites a
//!   data entry, relation, link, call, transaction or error.
//! - Lookups never fail. Missing entries read as empty, except file lookup
//!   which returns `Option` so callers can tell absence apart.
//! - The envelope never validates business data; that happens before the
//!   data reaches it.

use serde::{Deserialize, Serialize};

use relay_core::{ActionKey, Timestamp, Value};

use crate::calls::{Call, TransportCalls};
use crate::data::TransportData;
use crate::errors::{ErrorRecord, TransportErrors};
use crate::files::{File, TransportFiles};
use crate::links::{Link, TransportLinks};
use crate::meta::{Origin, TransportMeta};
use crate::relations::{Relation, TransportRelations};
use crate::transactions::{Transaction, TransportTransactions};

/// The request-scoped envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transport {
    meta: TransportMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<File>,
    #[serde(default, skip_serializing_if = "TransportFiles::is_empty")]
    files: TransportFiles,
    #[serde(default, skip_serializing_if = "TransportData::is_empty")]
    data: TransportData,
    #[serde(default, skip_serializing_if = "TransportRelations::is_empty")]
    relations: TransportRelations,
    #[serde(default, skip_serializing_if = "TransportLinks::is_empty")]
    links: TransportLinks,
    #[serde(default, skip_serializing_if = "no_calls")]
    calls: TransportCalls,
    #[serde(default, skip_serializing_if = "no_transactions")]
    transactions: TransportTransactions,
    #[serde(default, skip_serializing_if = "no_errors")]
    errors: TransportErrors,
}

fn no_calls(calls: &TransportCalls) -> bool {
    !calls.has()
}

fn no_transactions(transactions: &TransportTransactions) -> bool {
    !transactions.has()
}

fn no_errors(errors: &TransportErrors) -> bool {
    !errors.has()
}

impl Transport {
    /// An envelope with the given metadata and empty ledgers.
    pub fn new(meta: TransportMeta) -> Self {
        Self {
            meta,
            body: None,
            files: TransportFiles::default(),
            data: TransportData::default(),
            relations: TransportRelations::default(),
            links: TransportLinks::default(),
            calls: TransportCalls::default(),
            transactions: TransportTransactions::default(),
            errors: TransportErrors::default(),
        }
    }

    /// An envelope for a request that did not come through a gateway: a
    /// fresh UUID request id, the current UTC time and call depth 1.
    pub fn new_empty() -> Self {
        Self::new(TransportMeta::new(
            uuid::Uuid::new_v4().to_string(),
            Timestamp::now(),
            Origin::default(),
        ))
    }

    /// Request metadata.
    pub fn meta(&self) -> &TransportMeta {
        &self.meta
    }

    /// Mutable request metadata, for properties and fallbacks.
    pub fn meta_mut(&mut self) -> &mut TransportMeta {
        &mut self.meta
    }

    /// Request id.
    pub fn request_id(&self) -> &str {
        &self.meta.id
    }

    /// Time the request was received.
    pub fn request_timestamp(&self) -> Timestamp {
        self.meta.datetime
    }

    /// Service and action that received the request first.
    pub fn origin(&self) -> &Origin {
        &self.meta.origin
    }

    /// A userland property, or `default` when unset.
    pub fn property<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.meta.property(name, default)
    }

    // Download body

    /// Designate a file as the HTTP response body.
    pub fn set_download(&mut self, file: File) {
        self.body = Some(file);
    }

    /// Whether a download body is set.
    pub fn has_download(&self) -> bool {
        self.body.is_some()
    }

    /// The download body.
    pub fn download(&self) -> Option<&File> {
        self.body.as_ref()
    }

    // Data

    /// Append an entity or collection payload for `key`.
    pub fn push_data(&mut self, key: &ActionKey, payload: Value) {
        self.data.push(key, payload);
    }

    /// The data ledger.
    pub fn data_ledger(&self) -> &TransportData {
        &self.data
    }

    /// Data as a nested value, narrowed by service, version and action.
    pub fn data(&self, service: Option<&str>, version: Option<&str>, action: Option<&str>) -> Value {
        self.data.narrow(service, version, action)
    }

    // Files

    /// Register a file for the action `key`.
    pub fn add_file(&mut self, key: &ActionKey, file: File) {
        self.files.add(key, file);
    }

    /// Whether the action `key` has a file called `name`.
    pub fn has_file(&self, key: &ActionKey, name: &str) -> bool {
        self.files.has(key, name)
    }

    /// The file `name` of the action `key`.
    pub fn file(&self, key: &ActionKey, name: &str) -> Option<&File> {
        self.files.get(key, name)
    }

    /// Whether any file is registered.
    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    /// The files ledger.
    pub fn files(&self) -> &TransportFiles {
        &self.files
    }

    // Relations

    /// Record a one-to-one relation.
    pub fn relate_one(&mut self, service: &str, primary_key: &str, foreign_service: &str, foreign_key: &str) {
        self.relations
            .relate_one(service, primary_key, foreign_service, foreign_key);
    }

    /// Record a one-to-many relation.
    pub fn relate_many(
        &mut self,
        service: &str,
        primary_key: &str,
        foreign_service: &str,
        foreign_keys: Vec<String>,
    ) {
        self.relations
            .relate_many(service, primary_key, foreign_service, foreign_keys);
    }

    /// Relations, optionally only those of one service.
    pub fn relations(&self, service: Option<&str>) -> Vec<&Relation> {
        self.relations.filter(service)
    }

    // Links

    /// Publish a link in `namespace`.
    pub fn set_link(&mut self, namespace: &str, name: &str, uri: &str) {
        self.links.set(namespace, name, uri);
    }

    /// Links, optionally only those of one namespace.
    pub fn links(&self, namespace: Option<&str>) -> Vec<&Link> {
        self.links.filter(namespace)
    }

    /// The effective URI of a link.
    pub fn link(&self, namespace: &str, name: &str) -> Option<&str> {
        self.links.get(namespace, name)
    }

    // Calls

    /// Declare a call.
    pub fn add_call(&mut self, call: Call) {
        self.calls.push(call);
    }

    /// Whether any call is declared.
    pub fn has_calls(&self) -> bool {
        self.calls.has()
    }

    /// Calls, optionally only those declared by one service.
    pub fn calls(&self, service: Option<&str>) -> Vec<&Call> {
        self.calls.filter(service)
    }

    // Transactions

    /// Declare a transaction instruction.
    pub fn add_transaction(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// Whether any transaction instruction is declared.
    pub fn has_transactions(&self) -> bool {
        self.transactions.has()
    }

    /// Transaction instructions, optionally only those of one service.
    pub fn transactions(&self, service: Option<&str>) -> Vec<&Transaction> {
        self.transactions.filter(service)
    }

    /// The transactions ledger.
    pub fn transactions_ledger(&self) -> &TransportTransactions {
        &self.transactions
    }

    // Errors

    /// Report an error.
    pub fn add_error(&mut self, error: ErrorRecord) {
        self.errors.push(error);
    }

    /// Whether any error was reported.
    pub fn has_errors(&self) -> bool {
        self.errors.has()
    }

    /// Errors, optionally only those of one service.
    pub fn errors(&self, service: Option<&str>) -> Vec<&ErrorRecord> {
        self.errors.filter(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::ServiceOrigin;
    use serde_json::json;

    use crate::calls::CallTarget;
    use crate::transactions::TransactionKind;

    #[test]
    fn new_empty_has_identity() {
        let t = Transport::new_empty();
        assert!(uuid::Uuid::parse_str(t.request_id()).is_ok());
        assert_eq!(t.meta().level(), 1);
        assert!(!t.has_calls());
        assert!(!t.has_transactions());
        assert!(!t.has_files());
        assert!(!t.has_download());
    }

    #[test]
    fn empty_ledgers_are_omitted_when_serialized() {
        let t = Transport::new_empty();
        let json = serde_json::to_value(&t).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["meta"]);
    }

    #[test]
    fn roundtrip_with_every_ledger() {
        let key = ActionKey::new("users", "1.0.0", "read");
        let origin = ServiceOrigin::new("users", "1.0.0");
        let mut t = Transport::new_empty();
        t.push_data(&key, Value::from(json!({"id": 1})));
        t.add_file(&key, File::new("avatar", "file:///a.png", "image/png"));
        t.relate_one("users", "1", "posts", "10");
        t.set_link("users", "self", "/users/1");
        t.add_call(Call::deferred(origin.clone(), "read", CallTarget::new("posts", "1", "list")));
        t.add_transaction(Transaction {
            kind: TransactionKind::Commit,
            origin,
            caller: "read".into(),
            action: "save".into(),
            params: Vec::new(),
        });
        t.add_error(ErrorRecord {
            service: "users".into(),
            version: "1.0.0".into(),
            message: "boom".into(),
            code: 7,
            status: "500 Internal Server Error".into(),
        });
        t.set_download(File::new("report", "file:///r.csv", "text/csv"));

        let json = serde_json::to_string(&t).unwrap();
        let back: Transport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
