//! `vesta cells`: list the cells of a notebook file.

use std::path::Path;

use vesta_core::{CellData, CellKind};
use vesta_sync::read_notebook;

use crate::colors;

/// Execute the cells command.
pub fn execute(notebook_path: &str, json: bool) -> anyhow::Result<()> {
    let path = Path::new(notebook_path);
    if !path.exists() {
        anyhow::bail!("Notebook not found: {}", notebook_path);
    }

    let cells = read_notebook(path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&cells)?);
        return Ok(());
    }

    println!(
        "\n{}{}{} ({} cells)",
        colors::BOLD,
        path.file_name().unwrap_or_default().to_string_lossy(),
        colors::RESET,
        cells.len()
    );
    println!("{}", "─".repeat(50));
    for (index, cell) in cells.iter().enumerate() {
        println!("{}", summary_line(index, cell));
    }

    Ok(())
}

/// One line per cell: index, mode, visibility and the first line of text.
fn summary_line(index: usize, cell: &CellData) -> String {
    let color = match cell.kind {
        CellKind::Markdown => colors::DIM,
        CellKind::Code => colors::CYAN,
        CellKind::Plot => colors::GREEN,
    };
    let hidden = if cell.hidden { " (hidden)" } else { "" };
    let first_line = cell.value.lines().next().unwrap_or_default();
    format!(
        "  {:>3}  {}{:<8}{} {}{}{}{}",
        index,
        color,
        cell.kind.mode(),
        colors::RESET,
        first_line,
        colors::YELLOW,
        hidden,
        colors::RESET
    )
}
