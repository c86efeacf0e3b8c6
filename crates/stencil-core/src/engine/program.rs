//! Compiled template artifact.

use std::fmt;
use std::path::PathBuf;

use crate::error::Result;
use crate::eval::{Evaluator, TemplateContext};
use crate::fs::FileSystem;
use crate::options::Options;

use super::exec;

/// One step of a compiled template.
///
/// Payload strings are stored verbatim; the `Display` impl escapes
/// control characters so a dumped program stays one instruction per
/// line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Append literal text to the output.
    EmitLiteral(String),
    /// Evaluate an expression and append its escaped value.
    EmitEscaped(String),
    /// Evaluate an expression and append its value unescaped.
    EmitRaw(String),
    /// Execute a statement for its effects.
    Exec(String),
    /// Record the current template source line for diagnostics.
    LineMarker(usize),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::EmitLiteral(text) => {
                write!(f, "emit_literal \"{}\"", escape_payload(text))
            }
            Instruction::EmitEscaped(expr) => {
                write!(f, "emit_escaped \"{}\"", escape_payload(expr))
            }
            Instruction::EmitRaw(expr) => write!(f, "emit_raw \"{}\"", escape_payload(expr)),
            Instruction::Exec(stmt) => write!(f, "exec \"{}\"", escape_payload(stmt)),
            Instruction::LineMarker(line) => write!(f, "line {line}"),
        }
    }
}

fn escape_payload(payload: &str) -> String {
    let mut out = String::with_capacity(payload.len());
    for c in payload.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

/// Immutable compiled template: the main instruction body, a deferred
/// tail that runs after the body completes, and the include dependency
/// list. Created once at compile time, safe to share across threads and
/// reuse concurrently across renders.
pub struct Program {
    pub(crate) instructions: Vec<Instruction>,
    pub(crate) deferred: Vec<Instruction>,
    pub(crate) dependencies: Vec<PathBuf>,
    /// Original template text, retained only when line-mapped
    /// diagnostics are enabled.
    pub(crate) source: Option<String>,
    pub(crate) opts: Options,
}

impl Program {
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn deferred(&self) -> &[Instruction] {
        &self.deferred
    }

    /// Files statically spliced into this program, in splice order,
    /// including transitive includes.
    pub fn dependencies(&self) -> &[PathBuf] {
        &self.dependencies
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Execute against a data environment, producing the output string.
    pub fn render(
        &self,
        ctx: &TemplateContext,
        evaluator: &dyn Evaluator,
        fs: &dyn FileSystem,
    ) -> Result<String> {
        exec::execute(self, ctx, evaluator, fs)
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("instructions", &self.instructions)
            .field("deferred", &self.deferred)
            .field("dependencies", &self.dependencies)
            .field("filename", &self.opts.filename)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        if !self.deferred.is_empty() {
            writeln!(f, "-- deferred --")?;
            for instruction in &self.deferred {
                writeln!(f, "{instruction}")?;
            }
        }
        Ok(())
    }
}
