//! Core engine for the Vesta reactive notebook.
//!
//! This crate provides:
//! - Cell store with stable ids and display order
//! - Dependency resolution over named relations
//! - Cancellation-aware scheduling of cell evaluations
//! - Change notification for presentation layers

pub mod compile;
pub mod config;
pub mod document;
pub mod error;
pub mod execute;
pub mod graph;
pub mod notebook;
pub mod state;

pub use compile::{Compiler, Compilers, Evaluation, Outcome, Plot, PlotCompiler, Program};
pub use config::EngineConfig;
pub use document::{CellData, CellKind};
pub use error::{Error, Result};
pub use execute::{CancelHandle, Executor, InlineExecutor, TokioExecutor};
pub use graph::{CellId, StructuralError};
pub use notebook::{ListenerId, Notebook};
pub use state::{Cell, CellError, CellOutput, Relation, RelationSet, Row, RunStatus};
