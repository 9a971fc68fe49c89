//! Error types for vesta-core.

use thiserror::Error;

use crate::graph::CellId;

/// Result type for vesta-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by notebook mutations.
///
/// Failures that belong to a single cell (compile, structural, runtime) are
/// never reported here; they are recorded on the cell itself.
#[derive(Debug, Error)]
pub enum Error {
    /// Insertion index outside `[0, len]`.
    #[error("index {index} out of range for notebook with {len} cells")]
    OutOfRange { index: usize, len: usize },

    /// No cell with this id exists.
    #[error("cell not found: {0}")]
    UnknownCell(CellId),

    /// No async runtime is available to run evaluations on.
    #[error("runtime error: {0}")]
    Runtime(String),
}
