//! `vesta fmt`: rewrite a notebook file in canonical form.

use std::fs;
use std::path::Path;

use vesta_sync::{marshal, read_notebook, write_notebook};

use crate::colors;

/// Execute the fmt command.
///
/// With `check` set nothing is written and a non-canonical file is an error.
pub fn execute(notebook_path: &str, check: bool) -> anyhow::Result<()> {
    let path = Path::new(notebook_path);
    if !path.exists() {
        anyhow::bail!("Notebook not found: {}", notebook_path);
    }

    let original = fs::read_to_string(path)?;
    let cells = read_notebook(path)?;
    let canonical = marshal(&cells);
    let name = path.file_name().unwrap_or_default().to_string_lossy();

    if original == canonical {
        println!("{}✓{} {} is formatted", colors::GREEN, colors::RESET, name);
        return Ok(());
    }

    if check {
        anyhow::bail!("{} is not formatted", name);
    }

    tracing::debug!(cells = cells.len(), "rewriting notebook");
    write_notebook(path, &cells)?;
    println!(
        "{}✓{} Formatted {} ({} cells)",
        colors::GREEN,
        colors::RESET,
        name,
        cells.len()
    );
    Ok(())
}
