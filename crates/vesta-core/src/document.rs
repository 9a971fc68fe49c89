//! Persisted form of notebook cells.
//!
//! This is what save/load collaborators exchange with the notebook: cell
//! kind, source text and visibility, in display order. Run state and outputs
//! are never persisted.

use serde::{Deserialize, Serialize};

/// Kind of a notebook cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    /// Documentation; never executed.
    Markdown,
    /// Program defining relations.
    Code,
    /// Plot rendering relations.
    Plot,
}

impl CellKind {
    pub fn is_executable(&self) -> bool {
        !matches!(self, Self::Markdown)
    }

    /// Mode name used in the plain-text notebook format.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::Code => "Code",
            Self::Plot => "Plot",
        }
    }

    pub fn from_mode(mode: &str) -> Option<Self> {
        match mode {
            "Markdown" => Some(Self::Markdown),
            "Code" => Some(Self::Code),
            "Plot" => Some(Self::Plot),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mode())
    }
}

/// One cell as stored in a notebook document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellData {
    #[serde(rename = "type")]
    pub kind: CellKind,
    pub value: String,
    #[serde(default)]
    pub hidden: bool,
}

impl CellData {
    pub fn new(kind: CellKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            hidden: false,
        }
    }

    pub fn markdown(value: impl Into<String>) -> Self {
        Self::new(CellKind::Markdown, value)
    }

    pub fn code(value: impl Into<String>) -> Self {
        Self::new(CellKind::Code, value)
    }

    pub fn plot(value: impl Into<String>) -> Self {
        Self::new(CellKind::Plot, value)
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}
