//! Integration tests for notebook files.
//!
//! Tests the full pipeline: cells → file → cells, and loading files into a
//! live notebook.

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use vesta_core::{
    CellData, CellKind, Compiler, Compilers, InlineExecutor, Notebook, Plot, PlotCompiler, Program,
};
use vesta_sync::{SyncError, read_notebook, unmarshal, write_notebook};

// =============================================================================
// Test Helpers
// =============================================================================

/// Create a temporary directory for test artifacts.
fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// A small notebook covering every cell kind.
fn sample_cells() -> Vec<CellData> {
    vec![
        CellData::markdown("# Reachability\n\nWhich nodes can reach which?"),
        CellData::code("edge(x: 1, y: 2).\nedge(x: 2, y: 3).").hidden(true),
        CellData::code("tc(x, y) :- edge(x, y).\ntc(x, y) :- tc(x, y: z), edge(x: z, y)."),
        CellData::plot("view => Plot.dot(tc).plot()"),
    ]
}

/// Notebook text as saved by an older editor with Windows line endings.
fn crlf_notebook() -> &'static str {
    "This is a Percival notebook (https://percival.ink/).\r\n\
     \r\n\
     ╔═╡ Markdown\r\n\
     Unicode: 你好世界 🚀\r\n\
     \r\n\
     ╔═╣ Code\r\n\
     name(value: \"Hello 世界!\").\r\n"
}

/// Rejects every program; loading only needs the source kept.
struct Nothing;

impl Compiler for Nothing {
    fn compile(&self, source: &str) -> Result<Arc<dyn Program>, String> {
        Err(format!("cannot compile {}", source))
    }
}

impl PlotCompiler for Nothing {
    fn compile(&self, source: &str) -> Result<Arc<dyn Plot>, String> {
        Err(format!("cannot compile {}", source))
    }
}

// =============================================================================
// File Tests
// =============================================================================

#[test]
fn test_write_then_read() {
    let temp = temp_dir();
    let path = temp.path().join("reachability.percival");
    let cells = sample_cells();

    write_notebook(&path, &cells).expect("Failed to write notebook");
    let read = read_notebook(&path).expect("Failed to read notebook");
    assert_eq!(read, cells);
}

#[test]
fn test_write_creates_parent_directories() {
    let temp = temp_dir();
    let path = temp.path().join("nested/deeper/notebook.percival");

    write_notebook(&path, &sample_cells()).unwrap();
    assert!(path.exists());
}

#[test]
fn test_file_contents() {
    let temp = temp_dir();
    let path = temp.path().join("notebook.percival");
    write_notebook(&path, &[CellData::code("a.").hidden(true)]).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "This is a Percival notebook (https://percival.ink/).\n\n╔═╣ Code\na.\n"
    );
}

#[test]
fn test_read_crlf_file() {
    let temp = temp_dir();
    let path = temp.path().join("windows.percival");
    fs::write(&path, crlf_notebook()).unwrap();

    let cells = read_notebook(&path).unwrap();
    assert_eq!(cells.len(), 2);
    assert_eq!(cells[0].kind, CellKind::Markdown);
    assert_eq!(cells[0].value, "Unicode: 你好世界 🚀");
    assert!(!cells[0].hidden);
    assert_eq!(cells[1].kind, CellKind::Code);
    assert_eq!(cells[1].value, "name(value: \"Hello 世界!\").");
    assert!(cells[1].hidden);
}

#[test]
fn test_read_missing_file() {
    let temp = temp_dir();
    let err = read_notebook(temp.path().join("absent.percival")).unwrap_err();
    assert!(matches!(err, SyncError::ReadError { .. }));
}

#[test]
fn test_read_rejects_other_text() {
    let temp = temp_dir();
    let path = temp.path().join("notes.txt");
    fs::write(&path, "just some notes\n╔═╡ Code\nx.\n").unwrap();

    let err = read_notebook(&path).unwrap_err();
    assert!(matches!(err, SyncError::ParseError(_)));
    assert!(err.to_string().contains("missing the notebook header"));
}

#[test]
fn test_write_to_directory_fails() {
    let temp = temp_dir();
    let err = write_notebook(temp.path(), &sample_cells()).unwrap_err();
    assert!(matches!(err, SyncError::WriteError { .. }));
}

// =============================================================================
// Notebook Roundtrip
// =============================================================================

#[test]
fn test_notebook_load_and_export() {
    let temp = temp_dir();
    let path = temp.path().join("roundtrip.percival");
    write_notebook(&path, &sample_cells()).unwrap();

    let cells = read_notebook(&path).unwrap();
    let mut nb = Notebook::new(Compilers::new(Nothing, Nothing), InlineExecutor);
    nb.load(cells.clone());
    assert_eq!(nb.len(), 4);
    assert_eq!(nb.export(), cells);

    // Visibility changes survive a save.
    let first = nb.ids()[0];
    nb.toggle_visibility(first).unwrap();
    write_notebook(&path, &nb.export()).unwrap();
    let reread = read_notebook(&path).unwrap();
    assert!(reread[0].hidden);
    assert_eq!(reread[1..], cells[1..]);
}

#[test]
fn test_unmarshal_old_two_mode_files() {
    // Files written before plot cells existed use only Code and Markdown.
    let text = "This is a Percival notebook (https://percival.ink/).\n\n\
                ╔═╡ Code\nx.\n\n╔═╡ Markdown\ny\n";
    let cells = unmarshal(text);
    assert_eq!(cells, vec![CellData::code("x."), CellData::markdown("y")]);
}
