// Core modules
pub mod cache;
pub mod engine;
pub mod error;
pub mod escape;
pub mod eval;
pub mod fs;
pub mod options;

// Re-export commonly used types
pub use cache::ProgramCache;
pub use engine::{compile, Instruction, Program};
pub use error::{Result, StencilError};
pub use eval::{DefaultEvaluator, EvalError, Evaluator, Scope, TemplateContext};
pub use fs::{ChangeCallback, FileSystem, MemoryFileSystem, WatchHandle};
pub use options::{EscapeFn, Options, DEFAULT_DELIMITER, DEFAULT_EXTENSION};
