//! The plain-text notebook format.
//!
//! ```text
//! This is a Percival notebook (https://percival.ink/).
//!
//! ╔═╡ Markdown
//! # Reachability
//!
//! ╔═╣ Code
//! tc(x, y) :- edge(x, y).
//! ```
//!
//! Every cell starts with a header line: `╔═╡` for visible cells, `╔═╣` for
//! hidden ones, followed by the mode. The body runs until the newline before
//! the next header. Line endings inside bodies are kept as written.

use std::sync::LazyLock;

use regex::Regex;
use vesta_core::{CellData, CellKind};

/// First line of every notebook file.
pub const HEADER: &str = "This is a Percival notebook (https://percival.ink/).";

const VISIBLE: &str = "╔═╡";
const HIDDEN: &str = "╔═╣";

/// A cell header together with the line breaks around it.
static CELL_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n(╔═╡|╔═╣) (Code|Markdown|Plot)\r?\n").unwrap());

/// Serialize cells, in order.
pub fn marshal(cells: &[CellData]) -> String {
    let mut parts = Vec::with_capacity(cells.len() + 1);
    parts.push(format!("{}\n", HEADER));
    for cell in cells {
        let prefix = if cell.hidden { HIDDEN } else { VISIBLE };
        parts.push(format!("{} {}\n{}\n", prefix, cell.kind.mode(), cell.value));
    }
    parts.join("\n")
}

/// Parse cells from notebook text.
///
/// Text before the first cell header is ignored, so anything without a
/// header yields no cells.
pub fn unmarshal(text: &str) -> Vec<CellData> {
    let headers: Vec<(usize, usize, bool, CellKind)> = CELL_HEADER
        .captures_iter(text)
        .filter_map(|caps| {
            let span = caps.get(0)?;
            let kind = CellKind::from_mode(caps.get(2)?.as_str())?;
            Some((span.start(), span.end(), &caps[1] == HIDDEN, kind))
        })
        .collect();

    let mut cells = Vec::with_capacity(headers.len());
    for (i, &(_, body_start, hidden, kind)) in headers.iter().enumerate() {
        let body_end = headers.get(i + 1).map_or(text.len(), |next| next.0);
        let body = &text[body_start..body_end];
        let body = body
            .strip_suffix("\r\n")
            .or_else(|| body.strip_suffix('\n'))
            .unwrap_or(body);
        cells.push(CellData {
            kind,
            value: body.to_string(),
            hidden,
        });
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marshal_layout() {
        let cells = vec![
            CellData::markdown("# Title"),
            CellData::code("edge(x: 1, y: 2).").hidden(true),
            CellData::plot("view => tc"),
        ];
        assert_eq!(
            marshal(&cells),
            "This is a Percival notebook (https://percival.ink/).\n\
             \n\
             ╔═╡ Markdown\n# Title\n\
             \n\
             ╔═╣ Code\nedge(x: 1, y: 2).\n\
             \n\
             ╔═╡ Plot\nview => tc\n"
        );
    }

    #[test]
    fn test_empty_notebook() {
        assert_eq!(marshal(&[]), format!("{}\n", HEADER));
        assert!(unmarshal(&marshal(&[])).is_empty());
        assert!(unmarshal("").is_empty());
    }

    #[test]
    fn test_preamble_is_ignored() {
        let text = "anything at all\n╔═╡ Code\na.\n";
        assert_eq!(unmarshal(text), vec![CellData::code("a.")]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "header\r\n\r\n╔═╣ Markdown\r\nline one\r\nline two\r\n\r\n╔═╡ Code\r\nx.\r\n";
        assert_eq!(
            unmarshal(text),
            vec![
                CellData::markdown("line one\r\nline two").hidden(true),
                CellData::code("x."),
            ]
        );
    }

    #[test]
    fn test_empty_bodies() {
        let cells = vec![CellData::code(""), CellData::markdown("")];
        assert_eq!(unmarshal(&marshal(&cells)), cells);
    }

    #[test]
    fn test_header_lookalikes_stay_in_body() {
        let value = "╔═╡ Python\n ╔═╡ Code\n╔═╡ Code trailing";
        let cells = vec![CellData::markdown(value)];
        assert_eq!(unmarshal(&marshal(&cells)), cells);
    }

    #[test]
    fn test_trailing_newlines_survive() {
        let cells = vec![CellData::code("a.\n\n"), CellData::code("b.")];
        assert_eq!(unmarshal(&marshal(&cells)), cells);
    }
}
