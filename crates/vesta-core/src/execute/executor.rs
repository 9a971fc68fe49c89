//! Executors that drive evaluation tasks.
//!
//! The notebook never polls evaluations itself. It wraps each one in a task
//! that reports back over a channel and hands that task to an [`Executor`],
//! keeping the returned [`CancelHandle`] while the cell is pending.

use futures::future::BoxFuture;

use super::context::CancelHandle;
use crate::error::{Error, Result};

/// Spawns evaluation tasks.
pub trait Executor: Send + Sync {
    /// Start `task` and return a handle that can stop it.
    fn spawn(&self, task: BoxFuture<'static, ()>) -> CancelHandle;
}

/// Executor backed by a tokio runtime.
///
/// Cancellation aborts the spawned task, so an aborted evaluation never
/// reports back at all.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: tokio::runtime::Handle,
}

impl TokioExecutor {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is running on.
    pub fn current() -> Result<Self> {
        tokio::runtime::Handle::try_current()
            .map(Self::new)
            .map_err(|e| Error::Runtime(e.to_string()))
    }
}

impl Executor for TokioExecutor {
    fn spawn(&self, task: BoxFuture<'static, ()>) -> CancelHandle {
        let join = self.handle.spawn(task);
        let abort = join.abort_handle();
        CancelHandle::new(move || abort.abort())
    }
}

/// Executor that runs each task to completion on the calling thread.
///
/// Completions still travel through the notebook's channel, so they are
/// applied on the next [`poll_completions`](crate::Notebook::poll_completions)
/// rather than inside the rebuild that dispatched them. Useful for tests and
/// for evaluations that are synchronous anyway.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn spawn(&self, task: BoxFuture<'static, ()>) -> CancelHandle {
        futures::executor::block_on(task);
        CancelHandle::noop()
    }
}
