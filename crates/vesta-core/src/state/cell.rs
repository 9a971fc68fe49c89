//! Per-cell state.
//!
//! Cells are a closed sum over markdown, program and plot content. Program
//! and plot cells share an [`Executable`] block holding the compiled unit,
//! the run phase, the last output and the error fields.

use std::sync::Arc;

use serde::Serialize;

use super::output::{CellOutput, Relation};
use crate::compile::{CompiledUnit, Compilers};
use crate::document::{CellData, CellKind};
use crate::execute::InFlight;
use crate::graph::StructuralError;

/// Run status of an executable cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Output, if any, may not reflect current source or inputs.
    Stale,
    /// An evaluation is in flight.
    Pending,
    /// The last dispatched evaluation settled.
    Done,
}

/// Run phase. Only `Pending` owns an in-flight run.
#[derive(Debug)]
pub(crate) enum Phase {
    Stale,
    /// Stale after its evaluation cancelled itself. Not dispatched again
    /// until demoted by an upstream change or recompiled.
    Parked,
    Pending(InFlight),
    Done,
}

/// State shared by program and plot cells.
#[derive(Debug)]
pub struct Executable {
    pub(crate) unit: CompiledUnit,
    pub(crate) phase: Phase,
    pub(crate) output: Option<CellOutput>,
    pub(crate) structural_error: Option<StructuralError>,
    pub(crate) runtime_error: Option<String>,
}

impl Executable {
    pub(crate) fn new(unit: CompiledUnit) -> Self {
        Self {
            unit,
            phase: Phase::Stale,
            output: None,
            structural_error: None,
            runtime_error: None,
        }
    }

    pub fn status(&self) -> RunStatus {
        match self.phase {
            Phase::Stale | Phase::Parked => RunStatus::Stale,
            Phase::Pending(_) => RunStatus::Pending,
            Phase::Done => RunStatus::Done,
        }
    }

    pub fn unit(&self) -> &CompiledUnit {
        &self.unit
    }

    pub fn output(&self) -> Option<&CellOutput> {
        self.output.as_ref()
    }

    pub fn compile_error(&self) -> Option<&str> {
        self.unit.error()
    }

    pub fn structural_error(&self) -> Option<&StructuralError> {
        self.structural_error.as_ref()
    }

    pub fn runtime_error(&self) -> Option<&str> {
        self.runtime_error.as_deref()
    }

    /// Stale, compiled, and free of structural errors.
    pub(crate) fn is_eligible(&self) -> bool {
        matches!(self.phase, Phase::Stale) && self.structural_error.is_none() && self.unit.is_ok()
    }

    /// The relation `name` as last emitted, if this cell is a clean producer.
    pub(crate) fn provides(&self, name: &str) -> Option<&Arc<Relation>> {
        let clean = matches!(self.phase, Phase::Done)
            && self.structural_error.is_none()
            && self.runtime_error.is_none();
        if !clean {
            return None;
        }
        self.output.as_ref().and_then(|output| output.relation(name))
    }

    /// Move back to stale. Returns whether the cell was pending or done.
    ///
    /// With `cancel` unset an in-flight run is detached instead of being
    /// cancelled; its completion is discarded either way. A parked cell
    /// becomes eligible again.
    pub(crate) fn demote(&mut self, cancel: bool) -> bool {
        match std::mem::replace(&mut self.phase, Phase::Stale) {
            Phase::Stale | Phase::Parked => false,
            Phase::Done => true,
            Phase::Pending(run) => {
                if cancel {
                    run.handle.cancel();
                }
                true
            }
        }
    }
}

/// Content of a cell, by kind.
#[derive(Debug)]
pub enum CellContent {
    Markdown,
    Code(Executable),
    Plot(Executable),
}

/// The single active error on a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellError<'a> {
    Compile(&'a str),
    Structural(&'a StructuralError),
    Runtime(&'a str),
}

impl std::fmt::Display for CellError<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compile(message) | Self::Runtime(message) => f.write_str(message),
            Self::Structural(error) => write!(f, "{}", error),
        }
    }
}

/// A notebook cell.
#[derive(Debug)]
pub struct Cell {
    source: String,
    hidden: bool,
    content: CellContent,
}

impl Cell {
    /// Build a cell from persisted data, compiling executable source.
    pub(crate) fn compile(data: CellData, compilers: &Compilers) -> Self {
        let content = match compilers.compile(data.kind, &data.value) {
            None => CellContent::Markdown,
            Some(unit) if data.kind == CellKind::Plot => CellContent::Plot(Executable::new(unit)),
            Some(unit) => CellContent::Code(Executable::new(unit)),
        };
        Self {
            source: data.value,
            hidden: data.hidden,
            content,
        }
    }

    pub fn kind(&self) -> CellKind {
        match self.content {
            CellContent::Markdown => CellKind::Markdown,
            CellContent::Code(_) => CellKind::Code,
            CellContent::Plot(_) => CellKind::Plot,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    pub fn content(&self) -> &CellContent {
        &self.content
    }

    pub fn executable(&self) -> Option<&Executable> {
        match &self.content {
            CellContent::Markdown => None,
            CellContent::Code(exec) | CellContent::Plot(exec) => Some(exec),
        }
    }

    pub(crate) fn executable_mut(&mut self) -> Option<&mut Executable> {
        match &mut self.content {
            CellContent::Markdown => None,
            CellContent::Code(exec) | CellContent::Plot(exec) => Some(exec),
        }
    }

    /// Run status, or `None` for markdown cells.
    pub fn status(&self) -> Option<RunStatus> {
        self.executable().map(Executable::status)
    }

    pub fn output(&self) -> Option<&CellOutput> {
        self.executable().and_then(Executable::output)
    }

    /// Declared dependency names. Empty unless compiled successfully.
    pub fn deps(&self) -> &[String] {
        self.executable().map(|e| e.unit.deps()).unwrap_or_default()
    }

    /// Declared result names. Empty unless compiled successfully.
    pub fn results(&self) -> &[String] {
        self.executable().map(|e| e.unit.results()).unwrap_or_default()
    }

    pub fn compile_error(&self) -> Option<&str> {
        self.executable().and_then(Executable::compile_error)
    }

    pub fn structural_error(&self) -> Option<&StructuralError> {
        self.executable().and_then(Executable::structural_error)
    }

    pub fn runtime_error(&self) -> Option<&str> {
        self.executable().and_then(Executable::runtime_error)
    }

    /// The active error, by precedence compile > structural > runtime.
    pub fn error(&self) -> Option<CellError<'_>> {
        self.compile_error()
            .map(CellError::Compile)
            .or_else(|| self.structural_error().map(CellError::Structural))
            .or_else(|| self.runtime_error().map(CellError::Runtime))
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Replace source and recompile, dropping output and errors.
    ///
    /// Any in-flight run is cancelled.
    pub(crate) fn recompile(&mut self, source: String, compilers: &Compilers) {
        self.cancel_run();
        let data = CellData {
            kind: self.kind(),
            value: source,
            hidden: self.hidden,
        };
        *self = Self::compile(data, compilers);
    }

    /// Cancel any in-flight run. Returns whether the cell was pending or done.
    pub(crate) fn cancel_run(&mut self) -> bool {
        self.executable_mut().is_some_and(|exec| exec.demote(true))
    }

    pub fn to_data(&self) -> CellData {
        CellData {
            kind: self.kind(),
            value: self.source.clone(),
            hidden: self.hidden,
        }
    }
}
