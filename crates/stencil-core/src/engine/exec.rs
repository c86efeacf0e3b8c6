//! Program executor.
//!
//! A small interpreter over the compiled instruction sequence. Appends
//! to one output buffer, delegates every statement and expression to
//! the evaluator, and rewrites evaluation failures with source context
//! when line-mapped diagnostics are enabled.

use crate::error::{Result, StencilError};
use crate::escape;
use crate::eval::{EvalError, Evaluator, Scope, TemplateContext};
use crate::fs::{read_template, FileSystem};

use super::diagnostics;
use super::include;
use super::program::{Instruction, Program};

pub(super) fn execute(
    program: &Program,
    ctx: &TemplateContext,
    evaluator: &dyn Evaluator,
    fs: &dyn FileSystem,
) -> Result<String> {
    let include = |reference: &str| render_included(reference, program, ctx, evaluator, fs);
    let mut scope = Scope::with_include(ctx, &include);

    let mut out = String::new();
    let mut line = 1usize;
    // The deferred tail runs after the main body completes.
    for instruction in program.instructions().iter().chain(program.deferred()) {
        match instruction {
            Instruction::EmitLiteral(text) => out.push_str(text),
            Instruction::EmitEscaped(expr) => {
                let value = evaluator
                    .eval_expression(expr, &mut scope)
                    .map_err(|e| map_eval_error(program, line, e))?;
                out.push_str(&(program.opts.escape)(&value));
            }
            Instruction::EmitRaw(expr) => {
                let value = evaluator
                    .eval_expression(expr, &mut scope)
                    .map_err(|e| map_eval_error(program, line, e))?;
                out.push_str(&escape::stringify(&value));
            }
            Instruction::Exec(stmt) => {
                evaluator
                    .eval_statement(stmt, &mut scope)
                    .map_err(|e| map_eval_error(program, line, e))?;
            }
            Instruction::LineMarker(n) => line = *n,
        }
    }
    Ok(out)
}

/// Render-time include capability: compile and render another file on
/// demand against the same data environment. Unlike static splicing
/// this always reads the file as it is now.
fn render_included(
    reference: &str,
    program: &Program,
    ctx: &TemplateContext,
    evaluator: &dyn Evaluator,
    fs: &dyn FileSystem,
) -> std::result::Result<String, EvalError> {
    let from = program
        .opts
        .filename
        .as_deref()
        .ok_or_else(|| EvalError::new("include requires the 'filename' option"))?;
    let resolved = include::resolve(reference, from);
    let template = read_template(fs, &resolved).map_err(|e| {
        EvalError::new(format!(
            "cannot include '{}' in '{}': {}",
            reference,
            from.display(),
            e
        ))
    })?;
    let opts = program.opts.clone().with_filename(resolved);
    let included =
        super::compile(&template, &opts, fs).map_err(|e| EvalError::new(e.to_string()))?;
    included
        .render(ctx, evaluator, fs)
        .map_err(|e| EvalError::new(e.to_string()))
}

fn map_eval_error(program: &Program, line: usize, err: EvalError) -> StencilError {
    match &program.source {
        Some(source) if program.opts.compile_debug => diagnostics::rethrow(
            &err.message,
            source,
            program.opts.filename.as_deref(),
            line,
        ),
        _ => StencilError::Render {
            path: None,
            message: err.message,
        },
    }
}
