//! Source-context diagnostic mapping.
//!
//! Rewrites a render-time failure with a window of the original
//! template around the failing line, the failing line marked, and the
//! file identifier (or a default label) in the message head.

use std::path::Path;

use crate::error::StencilError;

/// Label used in diagnostics when no filename is configured.
pub const DEFAULT_LABEL: &str = "stencil";

/// Lines of context shown on each side of the failing line.
const CONTEXT_LINES: usize = 3;

/// Build the mapped render error for a failure on 1-based `line`.
pub fn rethrow(
    message: &str,
    source: &str,
    filename: Option<&Path>,
    line: usize,
) -> StencilError {
    let lines: Vec<&str> = source.split('\n').collect();
    let end = lines.len().min(line + CONTEXT_LINES);
    let start = line.saturating_sub(CONTEXT_LINES).min(end);

    let context = lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let curr = i + start + 1;
            let marker = if curr == line { " >> " } else { "    " };
            format!("{marker}{curr}| {text}")
        })
        .collect::<Vec<_>>()
        .join("\n");

    let label = filename
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| DEFAULT_LABEL.to_owned());

    StencilError::Render {
        path: filename.map(Path::to_path_buf),
        message: format!("{label}:{line}\n{context}\n\n{message}\n"),
    }
}
