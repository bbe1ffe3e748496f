//! Context providers.
//!
//! A provider answers "which request is the calling flow serving?". The
//! task-local provider ties the answer to the tokio task, so concurrent requests
//! each see their own context.

use std::future::Future;
use std::sync::Arc;

use super::types::HttpContext;

/// Supplies the context active for the calling flow.
pub trait ContextProvider: Send + Sync {
    /// The active context, or `None` outside any request.
    fn current(&self) -> Option<Arc<HttpContext>>;
}

/// Closures work as providers, which keeps test stubs short.
impl<F> ContextProvider for F
where
    F: Fn() -> Option<Arc<HttpContext>> + Send + Sync,
{
    fn current(&self) -> Option<Arc<HttpContext>> {
        self()
    }
}

tokio::task_local! {
    static CURRENT_CONTEXT: Arc<HttpContext>;
}

/// Resolves the context installed by [`scope`] or [`sync_scope`] for the
/// current tokio task.
///
/// Work moved to another task (`tokio::spawn`, `spawn_blocking`) does not
/// inherit the context; re-enter a scope there if it needs one.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaskLocalProvider;

impl ContextProvider for TaskLocalProvider {
    fn current(&self) -> Option<Arc<HttpContext>> {
        CURRENT_CONTEXT.try_with(Arc::clone).ok()
    }
}

/// Runs `future` with `context` as the task's current context.
pub async fn scope<F>(context: Arc<HttpContext>, future: F) -> F::Output
where
    F: Future,
{
    CURRENT_CONTEXT.scope(context, future).await
}

/// Runs `f` with `context` as the current context.
pub fn sync_scope<F, R>(context: Arc<HttpContext>, f: F) -> R
where
    F: FnOnce() -> R,
{
    CURRENT_CONTEXT.sync_scope(context, f)
}
