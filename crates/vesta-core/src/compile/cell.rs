//! Compiled cell units.

use std::sync::Arc;

use futures::FutureExt;

use super::types::{Compiler, Evaluation, Outcome, Plot, PlotCompiler, Program};
use crate::document::CellKind;
use crate::state::{CellOutput, RelationSet};

/// The compiler collaborators a notebook hands cell source to.
#[derive(Clone)]
pub struct Compilers {
    pub program: Arc<dyn Compiler>,
    pub plot: Arc<dyn PlotCompiler>,
}

impl Compilers {
    pub fn new(program: impl Compiler + 'static, plot: impl PlotCompiler + 'static) -> Self {
        Self {
            program: Arc::new(program),
            plot: Arc::new(plot),
        }
    }

    /// Compile source for an executable kind. Markdown yields `None`.
    pub(crate) fn compile(&self, kind: CellKind, source: &str) -> Option<CompiledUnit> {
        let unit = match kind {
            CellKind::Markdown => return None,
            CellKind::Code => match self.program.compile(source) {
                Ok(program) => CompiledUnit::Program(program),
                Err(message) => CompiledUnit::Failed(message),
            },
            CellKind::Plot => match self.plot.compile(source) {
                Ok(plot) => CompiledUnit::Plot(plot),
                Err(message) => CompiledUnit::Failed(message),
            },
        };
        Some(unit)
    }
}

/// Result of compiling one executable cell.
#[derive(Clone)]
pub enum CompiledUnit {
    Program(Arc<dyn Program>),
    Plot(Arc<dyn Plot>),
    /// Compilation failed; the cell stays inert until its source changes.
    Failed(String),
}

impl CompiledUnit {
    pub fn deps(&self) -> &[String] {
        match self {
            Self::Program(program) => program.deps(),
            Self::Plot(plot) => plot.deps(),
            Self::Failed(_) => &[],
        }
    }

    pub fn results(&self) -> &[String] {
        match self {
            Self::Program(program) => program.results(),
            Self::Plot(plot) => plot.results(),
            Self::Failed(_) => &[],
        }
    }

    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Start an evaluation. `inputs` must hold every name in `deps`.
    ///
    /// Panics inside the evaluation are reported as failures.
    pub(crate) fn evaluate(&self, inputs: RelationSet) -> Evaluation<CellOutput> {
        let evaluation: Evaluation<CellOutput> = match self {
            Self::Program(program) => {
                let fut = program.evaluate(inputs);
                async move { fut.await.map(CellOutput::Relations) }.boxed()
            }
            Self::Plot(plot) => {
                let positional = plot
                    .deps()
                    .iter()
                    .filter_map(|dep| inputs.get(dep).cloned())
                    .collect();
                let fut = plot.evaluate(positional);
                async move { fut.await.map(CellOutput::Rendered) }.boxed()
            }
            Self::Failed(message) => {
                let message = message.clone();
                async move { Outcome::Failed(message) }.boxed()
            }
        };

        std::panic::AssertUnwindSafe(evaluation)
            .catch_unwind()
            .map(|result| {
                result.unwrap_or_else(|panic| {
                    let message = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    Outcome::Failed(format!("evaluation panicked: {}", message))
                })
            })
            .boxed()
    }
}

impl std::fmt::Debug for CompiledUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Program(program) => f
                .debug_struct("Program")
                .field("deps", &program.deps())
                .field("results", &program.results())
                .finish(),
            Self::Plot(plot) => f
                .debug_struct("Plot")
                .field("deps", &plot.deps())
                .field("results", &plot.results())
                .finish(),
            Self::Failed(message) => f.debug_tuple("Failed").field(message).finish(),
        }
    }
}
