//! Types for the graph engine.

use thiserror::Error;

/// Unique identifier for a cell within a notebook.
///
/// Ids are handed out by the notebook on insertion and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct CellId(pub(crate) usize);

impl CellId {
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cell_{}", self.0)
    }
}

/// An error about the shape of the relation graph rather than about a
/// single cell's computation.
///
/// Structural errors are recomputed on every rebuild and disappear on their
/// own once the collision or gap is fixed elsewhere in the notebook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// More than one cell declares the same output relation.
    #[error("relation named {0} is defined in multiple cells")]
    DuplicateRelation(String),

    /// A dependency has no surviving producer.
    #[error("dependency {0} was not found in any cell")]
    MissingDependency(String),

    /// The cell takes part in a cycle of relation dependencies.
    #[error("cyclic dependency detected: {}", .0.join(" → "))]
    Cycle(Vec<String>),
}

/// The declared inputs and outputs of one compiled cell.
#[derive(Debug, Clone, Copy)]
pub struct Declaration<'a> {
    pub id: CellId,
    pub deps: &'a [String],
    pub results: &'a [String],
}
