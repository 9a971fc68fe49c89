//! Contracts for the compiler collaborators.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::state::{Relation, RelationSet};

/// How an evaluation settled.
///
/// Cancellation is its own variant so the scheduler never has to inspect
/// error text to tell a cancelled run from a failed one.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Completed(T),
    Failed(String),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Completed(value) => Outcome::Completed(f(value)),
            Self::Failed(message) => Outcome::Failed(message),
            Self::Cancelled => Outcome::Cancelled,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Outcome<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Completed(value),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// An asynchronous evaluation of one cell.
pub type Evaluation<T> = BoxFuture<'static, Outcome<T>>;

/// A compiled program cell.
pub trait Program: Send + Sync {
    /// Relation names this program reads.
    fn deps(&self) -> &[String];

    /// Relation names this program defines.
    fn results(&self) -> &[String];

    /// Evaluate with a value for every name in [`deps`](Program::deps).
    fn evaluate(&self, inputs: RelationSet) -> Evaluation<RelationSet>;
}

/// A compiled plot cell.
pub trait Plot: Send + Sync {
    /// Relation names passed positionally to the plot.
    fn deps(&self) -> &[String];

    /// At most one name the plot is bound to.
    fn results(&self) -> &[String];

    /// Render with one relation per entry of [`deps`](Plot::deps), in order.
    fn evaluate(&self, inputs: Vec<Arc<Relation>>) -> Evaluation<String>;
}

/// Turns program source into a [`Program`].
///
/// Must be deterministic for identical source and free of side effects.
pub trait Compiler: Send + Sync {
    fn compile(&self, source: &str) -> Result<Arc<dyn Program>, String>;
}

/// Turns plot source into a [`Plot`].
pub trait PlotCompiler: Send + Sync {
    fn compile(&self, source: &str) -> Result<Arc<dyn Plot>, String>;
}
