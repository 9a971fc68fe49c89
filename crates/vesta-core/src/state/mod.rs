//! State management for notebook cells.
//!
//! This module provides:
//! - Relations and cell outputs
//! - Per-cell run state and error fields

mod cell;
mod output;

pub use cell::{Cell, CellContent, CellError, Executable, RunStatus};
pub use output::{CellOutput, Relation, RelationSet, Row};

pub(crate) use cell::Phase;
