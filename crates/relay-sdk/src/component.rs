//! # Component
//!
//! Owns everything that outlives a request: configuration, the schema
//! mapping, resources and the action name -> handler table. Requests are
//! answered one at a time.
//!
//! ## Dispatch
//!
//! 1. Look up the handler. An unknown action is [`NotFound::Handler`].
//! 2. When the mapping knows this service version, look up the action
//!    schema and validate the inbound parameters and files against it. The
//!    handler sees the effective parameters, defaults included.
//! 3. Run the handler with an [`ActionContext`] over the request envelope.
//! 4. Return the envelope and the return value as an [`ActionReply`].
//!
//! Every dispatch increments `relay_actions_dispatched_total{action}`;
//! failures also increment `relay_actions_failed_total{action, reason}`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use anyhow::Context as _;
use metrics::counter;

use relay_core::{ActionKey, NotFound, RelayError, RelayResult};
use relay_schema::{validate_files, validate_params, ActionSchema, FileInput, Mapping};

use crate::config::ComponentConfig;
use crate::context::ActionContext;
use crate::error::DispatchError;
use crate::handler::{ActionHandler, HandlerResult};
use crate::request::{ActionReply, ActionRequest, RequestSource};
use crate::resources::Resources;

type Hook = Box<dyn FnOnce(&mut Component) -> anyhow::Result<()> + Send>;
type ErrorHook = Box<dyn Fn(&DispatchError) + Send + Sync>;

/// A service component.
pub struct Component {
    config: ComponentConfig,
    mapping: Mapping,
    resources: Resources,
    handlers: BTreeMap<String, Box<dyn ActionHandler>>,
    startup: Option<Hook>,
    shutdown: Option<Hook>,
    on_error: Option<ErrorHook>,
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("config", &self.config)
            .field("services", &self.mapping.len())
            .field("resources", &self.resources)
            .field("actions", &self.handlers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Component {
    /// A component with no schemas and no handlers.
    pub fn new(config: ComponentConfig) -> Self {
        Self {
            config,
            mapping: Mapping::default(),
            resources: Resources::default(),
            handlers: BTreeMap::new(),
            startup: None,
            shutdown: None,
            on_error: None,
        }
    }

    /// Use `mapping` to validate requests.
    pub fn with_mapping(mut self, mapping: Mapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Component configuration.
    pub fn config(&self) -> &ComponentConfig {
        &self.config
    }

    /// Schema mapping used for validation; empty unless set.
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// Registered resources.
    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Register a resource. See [`Resources::set`].
    pub fn set_resource<T, F>(&mut self, name: impl Into<String>, producer: F) -> RelayResult<()>
    where
        T: std::any::Any + Send + Sync,
        F: FnOnce() -> Option<T>,
    {
        self.resources.set(name, producer)
    }

    /// A registered resource. See [`Resources::get`].
    pub fn resource<T: std::any::Any + Send + Sync>(&self, name: &str) -> RelayResult<Arc<T>> {
        self.resources.get(name)
    }

    /// Register a closure as the handler of `name`.
    pub fn action<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut ActionContext<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.handler(name, handler)
    }

    /// Register the handler of `name`, replacing any previous one.
    pub fn handler(&mut self, name: impl Into<String>, handler: impl ActionHandler + 'static) -> &mut Self {
        self.handlers.insert(name.into(), Box::new(handler));
        self
    }

    /// Whether a handler is registered for `name`.
    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Run `hook` before the first request.
    pub fn on_startup<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnOnce(&mut Component) -> anyhow::Result<()> + Send + 'static,
    {
        self.startup = Some(Box::new(hook));
        self
    }

    /// Run `hook` after the last request.
    pub fn on_shutdown<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnOnce(&mut Component) -> anyhow::Result<()> + Send + 'static,
    {
        self.shutdown = Some(Box::new(hook));
        self
    }

    /// Run `hook` for every failed dispatch in [`run`](Self::run).
    pub fn on_error<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&DispatchError) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(hook));
        self
    }

    /// Answer one request.
    ///
    /// # Errors
    ///
    /// [`DispatchError`] when no handler is registered, the request
    /// violates the action's contract or the handler fails.
    pub fn dispatch(&self, request: ActionRequest) -> Result<ActionReply, DispatchError> {
        let action = request.action.clone();
        counter!("relay_actions_dispatched_total", "action" => action.clone()).increment(1);

        let outcome = self.invoke(request);
        if let Err(e) = &outcome {
            tracing::warn!(
                service = %self.config.name,
                version = %self.config.version,
                action = %action,
                error = %e,
                "dispatch failed"
            );
            counter!(
                "relay_actions_failed_total",
                "action" => action,
                "reason" => e.reason()
            )
            .increment(1);
        }
        outcome
    }

    fn invoke(&self, request: ActionRequest) -> Result<ActionReply, DispatchError> {
        let ActionRequest {
            action,
            transport,
            params,
        } = request;

        let handler = self
            .handlers
            .get(&action)
            .ok_or_else(|| RelayError::from(NotFound::Handler(action.clone())))?;

        let schema = self.action_schema(&action)?;
        let params = match schema {
            Some(schema) => {
                let key = ActionKey::new(self.config.name.clone(), self.config.version.clone(), action.clone());
                let effective = validate_params(schema, &params)?;
                validate_files(
                    schema,
                    transport.files().for_action(&key).into_iter().map(|f| FileInput {
                        name: &f.name,
                        mime: &f.mime,
                        size: f.size,
                    }),
                )?;
                effective
            }
            None => params,
        };

        tracing::debug!(
            request_id = transport.request_id(),
            action = %action,
            validated = schema.is_some(),
            "dispatching"
        );

        let mut ctx = ActionContext::new(&self.config, &self.resources, transport, action.clone(), params)
            .with_mapping(&self.mapping);
        if let Some(schema) = schema {
            ctx = ctx.with_schema(schema);
        }
        handler
            .handle(&mut ctx)
            .map_err(|e| DispatchError::Handler {
                action,
                source: e.into(),
            })?;
        Ok(ctx.into_reply())
    }

    fn action_schema(&self, action: &str) -> RelayResult<Option<&ActionSchema>> {
        if !self.mapping.contains(&self.config.name, &self.config.version) {
            return Ok(None);
        }
        let service = self.mapping.find(&self.config.name, &self.config.version)?;
        service.action_schema(action).map(Some)
    }

    /// Serve every request of `source`: run the startup hook, dispatch
    /// until the source is exhausted, then run the shutdown hook. Failed
    /// dispatches are delivered to the source and do not stop the loop.
    ///
    /// Returns the number of requests served.
    ///
    /// # Errors
    ///
    /// A failing startup or shutdown hook.
    pub fn run<S: RequestSource>(&mut self, source: &mut S) -> anyhow::Result<usize> {
        if let Some(hook) = self.startup.take() {
            hook(self).context("startup hook failed")?;
        }
        tracing::info!(
            service = %self.config.name,
            version = %self.config.version,
            actions = self.handlers.len(),
            "component started"
        );

        let mut served = 0;
        while let Some(request) = source.next_request() {
            let outcome = self.dispatch(request);
            if let (Err(e), Some(hook)) = (&outcome, &self.on_error) {
                hook(e);
            }
            source.reply(outcome);
            served += 1;
        }

        if let Some(hook) = self.shutdown.take() {
            hook(self).context("shutdown hook failed")?;
        }
        tracing::info!(service = %self.config.name, served, "component stopped");
        Ok(served)
    }
}
