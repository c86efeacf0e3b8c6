//! Shared test helpers for compiler and executor tests

use std::sync::Mutex;

use serde_json::{json, Value};

use crate::engine::compile;
use crate::error::Result;
use crate::eval::{DefaultEvaluator, EvalError, Evaluator, Scope, TemplateContext};
use crate::fs::MemoryFileSystem;
use crate::options::Options;

/// Build a context from a `json!` object literal
pub(super) fn context(data: Value) -> TemplateContext {
    match data {
        Value::Object(map) => TemplateContext::new(map),
        _ => panic!("test data must be a JSON object"),
    }
}

/// Context with the values most tests look up
pub(super) fn simple_context() -> TemplateContext {
    context(json!({
        "name": "geddy",
        "html": "&nbsp;<script>",
        "zero": 0,
        "nothing": null,
        "user": { "name": "neil" }
    }))
}

/// Compile and render with default options against an empty file system
pub(super) fn render(template: &str, ctx: &TemplateContext) -> Result<String> {
    render_with(template, ctx, Options::default())
}

pub(super) fn render_with(template: &str, ctx: &TemplateContext, opts: Options) -> Result<String> {
    let fs = MemoryFileSystem::new();
    render_on(&fs, template, ctx, opts)
}

/// Compile and render against a prepared file system, for include tests
pub(super) fn render_on(
    fs: &MemoryFileSystem,
    template: &str,
    ctx: &TemplateContext,
    opts: Options,
) -> Result<String> {
    let program = compile(template, &opts, fs)?;
    program.render(ctx, &DefaultEvaluator::new(), fs)
}

/// Evaluator that records every executed statement in call order,
/// delegating expressions to the built-in evaluator
#[derive(Default)]
pub(super) struct RecordingEvaluator {
    statements: Mutex<Vec<String>>,
}

impl RecordingEvaluator {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn recorded(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

impl Evaluator for RecordingEvaluator {
    fn eval_statement(
        &self,
        source: &str,
        _scope: &mut Scope,
    ) -> std::result::Result<(), EvalError> {
        self.statements
            .lock()
            .unwrap()
            .push(source.trim().to_owned());
        Ok(())
    }

    fn eval_expression(
        &self,
        source: &str,
        scope: &mut Scope,
    ) -> std::result::Result<Value, EvalError> {
        DefaultEvaluator::new().eval_expression(source, scope)
    }
}
