//! Compiler collaborator contracts.
//!
//! The engine does not parse or run cell source. It hands source text to a
//! [`Compiler`] (program cells) or [`PlotCompiler`] (plot cells) and works
//! with the opaque units they return: declared dependency names, declared
//! result names, and an asynchronous `evaluate`.

mod cell;
mod types;

pub use cell::{CompiledUnit, Compilers};
pub use types::{Compiler, Evaluation, Outcome, Plot, PlotCompiler, Program};
