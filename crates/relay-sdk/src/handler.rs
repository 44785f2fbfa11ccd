//! Action handlers.

use crate::context::ActionContext;

/// Result of a handler. Handlers report business failures through
/// [`ActionContext::error`] and return `Err` only for faults that must stop
/// the request.
pub type HandlerResult = anyhow::Result<()>;

/// User code run for one action.
pub trait ActionHandler: Send + Sync {
    /// Handle one request.
    fn handle(&self, ctx: &mut ActionContext<'_>) -> HandlerResult;
}

impl<F> ActionHandler for F
where
    F: Fn(&mut ActionContext<'_>) -> HandlerResult + Send + Sync,
{
    fn handle(&self, ctx: &mut ActionContext<'_>) -> HandlerResult {
        self(ctx)
    }
}
