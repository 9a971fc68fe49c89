//! Graph engine for dependency resolution.
//!
//! This module provides:
//! - Cell identity
//! - Producer resolution from declared relation names
//! - Structural error classification (duplicates, orphans, cycles)

mod resolver;
mod types;

pub use resolver::{Resolution, resolve};
pub use types::{CellId, Declaration, StructuralError};
