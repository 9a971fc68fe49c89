//! Cancellation handles and run tickets for in-flight evaluations.

use std::fmt;

use crate::compile::Outcome;
use crate::graph::CellId;
use crate::state::CellOutput;

/// Handle for cancelling one in-flight evaluation.
///
/// Cancelling consumes the handle. Dropping it without calling
/// [`CancelHandle::cancel`] detaches the task instead; the notebook still
/// ignores whatever it eventually reports, because the run ticket no longer
/// matches.
pub struct CancelHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl CancelHandle {
    /// Create a handle that runs `cancel` when cancelled.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle for work that cannot be interrupted.
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Request cancellation of the evaluation.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Identifies one dispatch of one cell.
///
/// Tickets are unique per notebook, so a completion can always be matched
/// against the run the cell is currently waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunTicket(pub(crate) u64);

/// A settled evaluation travelling back to the notebook.
#[derive(Debug)]
pub(crate) struct Completion {
    pub cell: CellId,
    pub ticket: RunTicket,
    pub outcome: Outcome<CellOutput>,
}

/// A live evaluation owned by a pending cell.
#[derive(Debug)]
pub(crate) struct InFlight {
    pub ticket: RunTicket,
    pub handle: CancelHandle,
}
