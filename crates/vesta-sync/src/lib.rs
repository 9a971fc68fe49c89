//! Plain-text notebook files for Vesta.
//!
//! Converts between [`CellData`] lists and the `.percival` text format.
//!
//! # Architecture
//!
//! ```text
//! notebook.percival ─────► unmarshal ─────► Vec<CellData> ─────► Notebook::load
//!         ▲                                                            │
//!         └──────────────── marshal ◄──────── Notebook::export ◄───────┘
//! ```

mod error;
mod format;

pub use error::{SyncError, SyncResult};
pub use format::{HEADER, marshal, unmarshal};

use std::fs;
use std::path::{Path, PathBuf};

use vesta_core::CellData;

/// File extension of notebook files.
pub const EXTENSION: &str = "percival";

/// Read cells from a notebook file.
///
/// Fails with [`SyncError::ParseError`] if the file does not start with the
/// notebook header.
pub fn read_notebook(path: impl AsRef<Path>) -> SyncResult<Vec<CellData>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| SyncError::ReadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if !text.starts_with(HEADER) {
        return Err(SyncError::ParseError(format!(
            "{} is missing the notebook header",
            path.display()
        )));
    }

    let cells = unmarshal(&text);
    tracing::debug!("Read {} ({} cells)", path.display(), cells.len());
    Ok(cells)
}

/// Write cells to a notebook file, creating parent directories as needed.
pub fn write_notebook(path: impl AsRef<Path>, cells: &[CellData]) -> SyncResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, marshal(cells)).map_err(|e| SyncError::WriteError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::info!("Wrote {} ({} cells)", path.display(), cells.len());
    Ok(())
}

/// Get the default notebook path for a file stem or other path.
pub fn default_notebook_path(path: impl AsRef<Path>) -> PathBuf {
    path.as_ref().with_extension(EXTENSION)
}
