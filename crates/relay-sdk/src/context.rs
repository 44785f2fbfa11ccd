//! # Action Context
//!
//! The only surface user handlers touch. An [`ActionContext`] wraps the
//! request's [`Transport`] for the duration of one handler invocation and
//! scopes every write to the caller's own `(service, version, action)`.
//!
//! ## Shape checks
//!
//! Entities are keyed maps and collections are lists of keyed maps. Since
//! some producers encode lists as maps with `"0"`, `"1"`, ... keys,
//! [`ActionContext::set_entity`] refuses anything that looks like a list
//! and [`ActionContext::set_collection`] refuses anything that does not.
//! Both append to the same data ledger.
//!
//! ## Declared intents
//!
//! Calls and transaction instructions are only recorded. The platform
//! carries them out after the handler returns.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use relay_core::{
    ActionKey, NotFound, ParamLocation, ParamType, ParamValue, RelayError, RelayResult,
    ServiceOrigin, Value,
};
use relay_schema::{ActionSchema, Mapping, ServiceSchema};
use relay_transport::{
    Call, CallTarget, ErrorRecord, File, Transaction, TransactionKind, Transport,
    DEFAULT_CALL_TIMEOUT, DEFAULT_ERROR_STATUS,
};

use crate::config::ComponentConfig;
use crate::request::ActionReply;
use crate::resources::Resources;

type ParamIndex = BTreeMap<ParamLocation, BTreeMap<String, ParamValue>>;

/// Handler-facing view of one request.
pub struct ActionContext<'a> {
    config: &'a ComponentConfig,
    resources: &'a Resources,
    mapping: Option<&'a Mapping>,
    schema: Option<&'a ActionSchema>,
    key: ActionKey,
    transport: Transport,
    params: ParamIndex,
    return_value: Option<Value>,
}

impl fmt::Debug for ActionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("action", &self.key)
            .field("request_id", &self.transport.request_id())
            .field("params", &self.params.values().map(BTreeMap::len).sum::<usize>())
            .finish_non_exhaustive()
    }
}

impl<'a> ActionContext<'a> {
    /// A context for `action` of the configured service.
    pub fn new(
        config: &'a ComponentConfig,
        resources: &'a Resources,
        transport: Transport,
        action: impl Into<String>,
        params: Vec<ParamValue>,
    ) -> Self {
        let mut index = ParamIndex::new();
        for param in params {
            index
                .entry(param.location())
                .or_default()
                .insert(param.name().to_string(), param);
        }
        Self {
            key: ActionKey::new(config.name.clone(), config.version.clone(), action),
            config,
            resources,
            mapping: None,
            schema: None,
            transport,
            params: index,
            return_value: None,
        }
    }

    /// Attach the component's schema mapping.
    pub fn with_mapping(mut self, mapping: &'a Mapping) -> Self {
        self.mapping = Some(mapping);
        self
    }

    /// Attach the action's schema.
    pub fn with_schema(mut self, schema: &'a ActionSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    // Identity and configuration

    /// Service name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Service version.
    pub fn version(&self) -> &str {
        &self.config.version
    }

    /// Platform version.
    pub fn platform_version(&self) -> &str {
        &self.config.platform_version
    }

    /// Action being handled.
    pub fn action_name(&self) -> &str {
        &self.key.action
    }

    /// All configuration variables.
    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.config.variables
    }

    /// A configuration variable, empty when unset.
    pub fn variable(&self, name: &str) -> &str {
        self.config.variables.get(name).map_or("", String::as_str)
    }

    /// Whether the component runs in debug mode.
    pub fn is_debug(&self) -> bool {
        self.config.debug
    }

    /// Whether this service received the request from the gateway.
    pub fn is_origin(&self) -> bool {
        self.transport.origin().service == self.config.name
    }

    /// The action's schema, when the mapping declares one.
    pub fn schema(&self) -> Option<&ActionSchema> {
        self.schema
    }

    /// Every service version the mapping knows.
    pub fn services(&self) -> Vec<ServiceOrigin> {
        self.mapping.map(Mapping::services).unwrap_or_default()
    }

    /// The schema of another service version.
    ///
    /// # Errors
    ///
    /// [`relay_core::NotFound::Service`] when the mapping has no such
    /// service version.
    pub fn service_schema(&self, name: &str, version: &str) -> RelayResult<&ServiceSchema> {
        match self.mapping {
            Some(mapping) => mapping.find(name, version),
            None => Err(NotFound::Service {
                service: name.to_string(),
                version: version.to_string(),
            }
            .into()),
        }
    }

    /// The envelope as mutated so far.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    fn origin(&self) -> ServiceOrigin {
        self.key.origin()
    }

    // Parameters

    /// The parameter `name` read from `location`, or an empty string
    /// parameter reporting `exists() == false` when it was not sent.
    pub fn param(&self, name: &str, location: ParamLocation) -> ParamValue {
        self.params
            .get(&location)
            .and_then(|params| params.get(name))
            .cloned()
            .unwrap_or_else(|| ParamValue::absent(name, location))
    }

    /// Whether `name` was sent in `location`.
    pub fn has_param(&self, name: &str, location: ParamLocation) -> bool {
        self.params
            .get(&location)
            .is_some_and(|params| params.contains_key(name))
    }

    /// Parameters of one location, or of all locations.
    pub fn params(&self, location: Option<ParamLocation>) -> Vec<&ParamValue> {
        match location {
            Some(location) => self
                .params
                .get(&location)
                .map(|params| params.values().collect())
                .unwrap_or_default(),
            None => self.params.values().flat_map(BTreeMap::values).collect(),
        }
    }

    /// Build a parameter, for instance to pass on to a call.
    ///
    /// # Errors
    ///
    /// [`RelayError::InvalidValue`] when `value` does not satisfy `ty`.
    pub fn new_param(&self, name: &str, value: impl Into<Value>, ty: ParamType) -> RelayResult<ParamValue> {
        ParamValue::new(name, value, ty)
    }

    // Files

    /// Whether this action received a file called `name`.
    pub fn has_file(&self, name: &str) -> bool {
        self.transport.has_file(&self.key, name)
    }

    /// The file `name` of this action, or an empty descriptor when absent.
    pub fn file(&self, name: &str) -> File {
        self.transport
            .file(&self.key, name)
            .cloned()
            .unwrap_or_else(|| File::empty(name))
    }

    /// Every file in the envelope, whichever action it belongs to.
    pub fn files(&self) -> Vec<&File> {
        self.transport.files().all().collect()
    }

    /// Build a file descriptor.
    pub fn new_file(&self, name: &str, path: &str, mime: &str) -> File {
        File::new(name, path, mime)
    }

    // Data

    /// Append an entity to this action's data.
    ///
    /// # Errors
    ///
    /// [`RelayError::MalformedPayload`] unless `entity` is a map that does
    /// not look like a list.
    pub fn set_entity(&mut self, entity: impl Into<Value>) -> RelayResult<()> {
        let entity = entity.into();
        if entity.looks_like_list() {
            return Err(RelayError::MalformedPayload("unexpected collection".into()));
        }
        if !matches!(entity, Value::Map(_)) {
            return Err(RelayError::MalformedPayload(format!(
                "entity must be a map, got {}",
                entity.kind()
            )));
        }
        tracing::debug!(action = %self.key, "entity set");
        self.transport.push_data(&self.key, entity);
        Ok(())
    }

    /// Append a collection to this action's data. Maps with dense `"0"`,
    /// `"1"`, ... keys are accepted and stored as lists.
    ///
    /// # Errors
    ///
    /// [`RelayError::MalformedPayload`] when `collection` is not a list, or
    /// when one of its elements is not an entity.
    pub fn set_collection(&mut self, collection: impl Into<Value>) -> RelayResult<()> {
        let collection = collection.into();
        let Some(items) = collection.sequence() else {
            return Err(RelayError::MalformedPayload("unexpected entity".into()));
        };
        if !items.iter().all(|item| is_entity(item)) {
            return Err(RelayError::MalformedPayload("unexpected collection".into()));
        }
        let list = Value::List(items.into_iter().cloned().collect());
        tracing::debug!(action = %self.key, "collection set");
        self.transport.push_data(&self.key, list);
        Ok(())
    }

    /// Relate `primary_key` of this service to one entity of `service`.
    pub fn relate_one(&mut self, primary_key: &str, service: &str, foreign_key: &str) {
        self.transport
            .relate_one(&self.config.name, primary_key, service, foreign_key);
    }

    /// Relate `primary_key` of this service to many entities of `service`.
    pub fn relate_many(&mut self, primary_key: &str, service: &str, foreign_keys: Vec<String>) {
        self.transport
            .relate_many(&self.config.name, primary_key, service, foreign_keys);
    }

    /// Publish a link in this service's namespace.
    pub fn set_link(&mut self, link: &str, uri: &str) {
        self.transport.set_link(&self.config.name, link, uri);
    }

    /// Set a userland property on the request.
    pub fn set_property(&mut self, name: &str, value: &str) {
        self.transport.meta_mut().set_property(name, value);
    }

    // Transactions

    /// Run `action` of this service if the request succeeds overall.
    pub fn commit(&mut self, action: &str, params: Vec<ParamValue>) {
        self.transaction(TransactionKind::Commit, action, params);
    }

    /// Run `action` of this service if the request fails overall.
    pub fn rollback(&mut self, action: &str, params: Vec<ParamValue>) {
        self.transaction(TransactionKind::Rollback, action, params);
    }

    /// Run `action` of this service once the request finishes.
    pub fn complete(&mut self, action: &str, params: Vec<ParamValue>) {
        self.transaction(TransactionKind::Complete, action, params);
    }

    fn transaction(&mut self, kind: TransactionKind, action: &str, params: Vec<ParamValue>) {
        tracing::debug!(action = %self.key, %kind, target = action, "transaction declared");
        let transaction = Transaction {
            kind,
            origin: self.origin(),
            caller: self.key.action.clone(),
            action: action.to_string(),
            params,
        };
        self.transport.add_transaction(transaction);
    }

    // Calls

    /// Declare a mesh-routed call, awaited up to `timeout` milliseconds
    /// (1000 by default).
    pub fn call(&mut self, target: CallTarget, timeout: Option<u64>) {
        self.register_call_files(&target);
        let call = Call::runtime(
            self.origin(),
            self.key.action.clone(),
            target,
            timeout.unwrap_or(DEFAULT_CALL_TIMEOUT),
        );
        self.declare(call);
    }

    /// Declare a mesh-routed call that is queued and not awaited.
    pub fn defer_call(&mut self, target: CallTarget) {
        self.register_call_files(&target);
        let call = Call::deferred(self.origin(), self.key.action.clone(), target);
        self.declare(call);
    }

    /// Declare a call to the component at `address`.
    pub fn remote_call(&mut self, address: &str, target: CallTarget, timeout: Option<u64>) {
        self.register_call_files(&target);
        let call = Call::remote(
            self.origin(),
            self.key.action.clone(),
            address,
            target,
            timeout.unwrap_or(DEFAULT_CALL_TIMEOUT),
        );
        self.declare(call);
    }

    fn register_call_files(&mut self, target: &CallTarget) {
        let destination = ActionKey::new(
            target.service.clone(),
            target.version.clone(),
            target.action.clone(),
        );
        for file in &target.files {
            self.transport.add_file(&destination, file.clone());
        }
    }

    fn declare(&mut self, call: Call) {
        tracing::debug!(
            action = %self.key,
            service = call.service(),
            version = call.version(),
            target = call.action(),
            "call declared"
        );
        self.transport.add_call(call);
    }

    // Reply

    /// Report a business error with code 0 and the default status. The
    /// handler keeps running.
    pub fn error(&mut self, message: &str) {
        self.error_with(message, 0, DEFAULT_ERROR_STATUS);
    }

    /// Report a business error with an explicit code and status line.
    pub fn error_with(&mut self, message: &str, code: i64, status: &str) {
        tracing::debug!(action = %self.key, code, status, "error reported");
        self.transport.add_error(ErrorRecord {
            service: self.config.name.clone(),
            version: self.config.version.clone(),
            message: message.to_string(),
            code,
            status: status.to_string(),
        });
    }

    /// Set the direct return value of the action.
    pub fn set_return(&mut self, value: impl Into<Value>) {
        self.return_value = Some(value.into());
    }

    /// The return value set so far.
    pub fn return_value(&self) -> Option<&Value> {
        self.return_value.as_ref()
    }

    /// Designate `file` as the HTTP response body.
    pub fn set_download(&mut self, file: File) {
        self.transport.set_download(file);
    }

    /// Log a value at info level, tagged with this action.
    pub fn log(&self, value: impl fmt::Display) {
        tracing::info!(
            service = %self.config.name,
            version = %self.config.version,
            action = %self.key.action,
            "{value}"
        );
    }

    // Resources

    /// A resource registered on the component.
    ///
    /// # Errors
    ///
    /// See [`Resources::get`].
    pub fn resource<T: std::any::Any + Send + Sync>(&self, name: &str) -> RelayResult<Arc<T>> {
        self.resources.get(name)
    }

    /// Whether a resource is registered under `name`.
    pub fn has_resource(&self, name: &str) -> bool {
        self.resources.has(name)
    }

    /// Finish the invocation.
    pub fn into_reply(self) -> ActionReply {
        ActionReply {
            transport: self.transport,
            return_value: self.return_value,
        }
    }
}

fn is_entity(value: &Value) -> bool {
    matches!(value, Value::Map(_)) && !value.looks_like_list()
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_transport::{CallKind, Origin, TransportMeta};
    use relay_core::Timestamp;
    use serde_json::json;

    fn config() -> ComponentConfig {
        ComponentConfig::new("users", "1.0.0")
            .with_platform_version("3.0.0")
            .with_variable("db", "postgres://localhost")
    }

    fn transport_from(origin_service: &str) -> Transport {
        Transport::new(TransportMeta::new(
            "req-1",
            Timestamp::now(),
            Origin::new(origin_service, "read"),
        ))
    }

    fn data_of(ctx: &ActionContext<'_>) -> Vec<Value> {
        ctx.transport().data_ledger().get(&ctx.key).to_vec()
    }

    #[test]
    fn identity_and_variables() {
        let cfg = config();
        let resources = Resources::default();
        let ctx = ActionContext::new(&cfg, &resources, transport_from("users"), "read", Vec::new());
        assert_eq!(ctx.name(), "users");
        assert_eq!(ctx.version(), "1.0.0");
        assert_eq!(ctx.platform_version(), "3.0.0");
        assert_eq!(ctx.action_name(), "read");
        assert_eq!(ctx.variable("db"), "postgres://localhost");
        assert_eq!(ctx.variable("missing"), "");
        assert!(!ctx.is_debug());
        assert!(ctx.is_origin());
        assert!(ctx.services().is_empty());
        assert!(ctx.service_schema("users", "1.0.0").is_err());

        let ctx = ActionContext::new(&cfg, &resources, transport_from("gateway"), "read", Vec::new());
        assert!(!ctx.is_origin());
    }

    #[test]
    fn absent_param_is_empty_string() {
        let cfg = config();
        let resources = Resources::default();
        let params = vec![
            ParamValue::new("page", 2, ParamType::Integer).unwrap(),
            ParamValue::string("token", "abc").at(ParamLocation::Header),
        ];
        let ctx = ActionContext::new(&cfg, &resources, Transport::new_empty(), "list", params);

        assert_eq!(ctx.param("page", ParamLocation::Query).value(), &Value::Int(2));
        assert!(ctx.has_param("token", ParamLocation::Header));
        assert!(!ctx.has_param("token", ParamLocation::Query));

        let missing = ctx.param("sort", ParamLocation::Query);
        assert!(!missing.exists());
        assert_eq!(missing.name(), "sort");
        assert_eq!(missing.value(), &Value::String(String::new()));
        assert_eq!(missing.ty(), ParamType::String);

        assert_eq!(ctx.params(Some(ParamLocation::Header)).len(), 1);
        assert_eq!(ctx.params(None).len(), 2);
        assert!(ctx.params(Some(ParamLocation::Body)).is_empty());
    }

    #[test]
    fn entity_shape_checks() {
        let cfg = config();
        let resources = Resources::default();
        let mut ctx = ActionContext::new(&cfg, &resources, Transport::new_empty(), "read", Vec::new());

        let err = ctx.set_entity(json!({"0": "a", "1": "b"})).unwrap_err();
        assert_eq!(err.to_string(), "malformed payload: unexpected collection");
        assert!(ctx.set_entity(json!([{"name": "x"}])).is_err());
        assert!(ctx.set_entity(json!("scalar")).is_err());

        ctx.set_entity(json!({"name": "x"})).unwrap();
        ctx.set_entity(json!({})).unwrap();
        assert_eq!(data_of(&ctx).len(), 2);
    }

    #[test]
    fn collection_shape_checks() {
        let cfg = config();
        let resources = Resources::default();
        let mut ctx = ActionContext::new(&cfg, &resources, Transport::new_empty(), "list", Vec::new());

        let err = ctx.set_collection(json!({"name": "x"})).unwrap_err();
        assert_eq!(err.to_string(), "malformed payload: unexpected entity");
        assert!(ctx.set_collection(json!([{"name": "x"}, [1, 2]])).is_err());
        assert!(ctx.set_collection(json!([{"name": "x"}, {"0": 1}])).is_err());

        ctx.set_collection(json!([{"name": "x"}])).unwrap();
        ctx.set_collection(json!({"1": {"name": "b"}, "0": {"name": "a"}})).unwrap();
        let data = data_of(&ctx);
        assert_eq!(data.len(), 2);
        assert_eq!(data[1], Value::from(json!([{"name": "a"}, {"name": "b"}])));
    }

    #[test]
    fn relations_links_and_properties_use_own_service() {
        let cfg = config();
        let resources = Resources::default();
        let mut ctx = ActionContext::new(&cfg, &resources, Transport::new_empty(), "read", Vec::new());
        ctx.relate_one("1", "posts", "10");
        ctx.relate_many("1", "comments", vec!["5".into(), "6".into()]);
        ctx.set_link("self", "/users/1");
        ctx.set_property("tenant", "acme");

        let t = ctx.transport();
        assert_eq!(t.relations(Some("users")).len(), 2);
        assert_eq!(t.link("users", "self"), Some("/users/1"));
        assert_eq!(t.property("tenant", ""), "acme");
    }

    #[test]
    fn transactions_are_declared_in_order() {
        let cfg = config();
        let resources = Resources::default();
        let mut ctx = ActionContext::new(&cfg, &resources, Transport::new_empty(), "create", Vec::new());
        ctx.commit("save", vec![ParamValue::string("id", "1")]);
        ctx.rollback("undo", Vec::new());
        ctx.complete("cleanup", Vec::new());

        let declared = ctx.transport().transactions(Some("users"));
        let kinds: Vec<TransactionKind> = declared.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            [TransactionKind::Commit, TransactionKind::Rollback, TransactionKind::Complete]
        );
        assert_eq!(declared[0].caller, "create");
        assert_eq!(declared[0].origin, ServiceOrigin::new("users", "1.0.0"));
        assert_eq!(declared[0].params.len(), 1);
    }

    #[test]
    fn calls_register_files_under_destination() {
        let cfg = config();
        let resources = Resources::default();
        let mut ctx = ActionContext::new(&cfg, &resources, Transport::new_empty(), "read", Vec::new());
        let avatar = File::new("avatar", "file:///tmp/a.png", "image/png");

        ctx.call(CallTarget::new("images", "2.0.0", "resize").file(avatar.clone()), None);
        ctx.defer_call(CallTarget::new("audit", "1.0.0", "record"));
        ctx.remote_call(
            "ktp://10.0.0.1:9000",
            CallTarget::new("billing", "1.0.0", "charge"),
            Some(250),
        );

        let calls = ctx.transport().calls(Some("users"));
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].kind(), &CallKind::Runtime { timeout: DEFAULT_CALL_TIMEOUT });
        assert_eq!(calls[1].kind(), &CallKind::Deferred);
        assert_eq!(calls[2].address(), Some("ktp://10.0.0.1:9000"));
        assert_eq!(calls[2].timeout(), Some(250));

        let destination = ActionKey::new("images", "2.0.0", "resize");
        assert_eq!(ctx.transport().file(&destination, "avatar"), Some(&avatar));
        assert!(!ctx.has_file("avatar"));
        assert_eq!(ctx.files().len(), 1);
        assert!(!ctx.file("avatar").exists());
    }

    #[test]
    fn errors_and_reply_surface_both_return_and_download() {
        let cfg = config();
        let resources = Resources::default();
        let mut ctx = ActionContext::new(&cfg, &resources, Transport::new_empty(), "export", Vec::new());
        ctx.error("first");
        ctx.error_with("second", 42, "404 Not Found");
        ctx.set_return(json!({"ok": true}));
        let report = ctx.new_file("report", "file:///tmp/r.csv", "text/csv");
        ctx.set_download(report);

        let errors = ctx.transport().errors(None);
        assert_eq!(errors[0].status, DEFAULT_ERROR_STATUS);
        assert_eq!(errors[1].code, 42);

        let reply = ctx.into_reply();
        assert!(reply.has_return());
        assert_eq!(reply.download().map(|f| f.name.as_str()), Some("report"));
    }
}
