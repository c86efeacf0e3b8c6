//! Compilation options.

use crate::escape;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Tag delimiter used when none is configured.
pub const DEFAULT_DELIMITER: char = '%';

/// Extension appended to include references that carry none.
pub const DEFAULT_EXTENSION: &str = "stencil";

/// Output-escaping capability applied by escaped-output instructions.
pub type EscapeFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Options controlling compilation and rendering of one template.
///
/// The delimiter is a single `char` parameterizing every tag marker;
/// `filename` enables relative includes, diagnostics labeling and cache
/// keying; `compile_debug` (on by default) retains the line mapping
/// that the diagnostic mapper needs at render time.
#[derive(Clone)]
pub struct Options {
    pub delimiter: char,
    pub filename: Option<PathBuf>,
    pub cache: bool,
    pub watch_files: bool,
    /// Dump the generated instruction program to stderr after compiling.
    pub debug: bool,
    pub compile_debug: bool,
    pub escape: EscapeFn,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            filename: None,
            cache: false,
            watch_files: false,
            debug: false,
            compile_debug: true,
            escape: Arc::new(escape::escape_html),
        }
    }
}

impl Options {
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("delimiter", &self.delimiter)
            .field("filename", &self.filename)
            .field("cache", &self.cache)
            .field("watch_files", &self.watch_files)
            .field("debug", &self.debug)
            .field("compile_debug", &self.compile_debug)
            .field("escape", &"<escape fn>")
            .finish()
    }
}
