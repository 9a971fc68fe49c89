//! Execution plumbing for notebook cells.
//!
//! # Executors
//!
//! - **`TokioExecutor`** - Spawns each evaluation as a tokio task. Cancelling
//!   aborts the task.
//! - **`InlineExecutor`** - Runs each evaluation to completion on the calling
//!   thread. No real concurrency, which keeps scheduling deterministic.
//!
//! # Architecture
//!
//! ```text
//! Notebook::rebuild
//!     │
//!     └── CompiledUnit::evaluate(inputs) ──► Evaluation (future)
//!             │
//!             └── Executor::spawn(task) ──► CancelHandle (kept while pending)
//!                     │
//!                     └── task sends Completion { cell, ticket, outcome }
//!                             │
//!                             └── Notebook::poll_completions / settle
//! ```

mod context;
mod executor;

pub use context::{CancelHandle, RunTicket};
pub use executor::{Executor, InlineExecutor, TokioExecutor};

pub(crate) use context::{Completion, InFlight};
