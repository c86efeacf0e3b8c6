use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StencilError {
    // Syntax errors
    #[error("SYNTAX_UNMATCHED_OPEN: could not find matching close tag for '{0}'")]
    UnmatchedOpen(String),

    #[error("SYNTAX_UNMATCHED_CLOSE: close tag '{0}' has no matching open tag")]
    UnmatchedClose(String),

    // Configuration errors
    #[error("CONFIG_CACHE_REQUIRES_FILENAME: cache option requires a filename")]
    CacheRequiresFilename,

    #[error("CONFIG_INCLUDE_REQUIRES_FILENAME: include requires the 'filename' option")]
    IncludeRequiresFilename,

    #[error("CONFIG_MISSING_SOURCE: no template source or filename provided")]
    MissingSource,

    // Include resolution errors
    #[error("INCLUDE_RESOLVE_FAILED: cannot include '{include}' in '{}'", from.display())]
    IncludeResolveFailed { include: String, from: PathBuf },

    #[error("INCLUDE_CYCLE: circular include detected: {0}")]
    IncludeCycle(String),

    // Render-time evaluation errors. The message carries a mapped
    // source-context block when diagnostics are enabled.
    #[error("{message}")]
    Render {
        path: Option<PathBuf>,
        message: String,
    },

    // IO errors
    #[error("IO_ERROR: {0}")]
    Io(#[from] std::io::Error),
}

impl StencilError {
    /// Source file the error was mapped to, when known.
    ///
    /// Only render-time errors rewritten by the diagnostic mapper carry
    /// a path; everything else returns `None`.
    pub fn path(&self) -> Option<&Path> {
        match self {
            StencilError::Render { path, .. } => path.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StencilError>;
