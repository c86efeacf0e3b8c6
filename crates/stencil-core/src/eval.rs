//! Expression-evaluation collaborator.
//!
//! Embedded statements and expressions are host-language text the engine
//! never interprets itself; it hands them to an [`Evaluator`] together
//! with a mutable [`Scope`]. The evaluator owns the scoping policy:
//! every data-environment key is directly addressable, and whether an
//! unresolved name raises is its call.
//!
//! [`DefaultEvaluator`] is the built-in implementation: enough for
//! data-lookup templates (identifiers, dotted paths, literals and
//! `include("...")` calls) without pulling in a scripting language.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{Result, StencilError};

/// Failure raised by the host evaluator for one statement or expression.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct EvalError {
    pub message: String,
}

impl EvalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Render data environment: a mapping from name to JSON value.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    data: Map<String, Value>,
}

impl TemplateContext {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Build a context from any serializable value. Fails unless the
    /// value serializes to a JSON object.
    pub fn from_serialize<T: serde::Serialize>(value: &T) -> Result<Self> {
        match serde_json::to_value(value) {
            Ok(Value::Object(map)) => Ok(Self::new(map)),
            Ok(other) => Err(StencilError::Render {
                path: None,
                message: format!("template data must be an object, got {}", other),
            }),
            Err(e) => Err(StencilError::Render {
                path: None,
                message: format!("template data is not serializable: {}", e),
            }),
        }
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}

/// Capability that compiles-and-renders a file on demand (inline
/// include). Installed on the scope by the executor when rendering.
pub type IncludeFn<'a> = &'a dyn Fn(&str) -> std::result::Result<String, EvalError>;

/// Mutable evaluation scope handed to the evaluator.
///
/// Holds a working copy of the data environment (statements may bind
/// new names) plus the engine-provided capabilities.
pub struct Scope<'a> {
    vars: Map<String, Value>,
    include: Option<IncludeFn<'a>>,
}

impl<'a> Scope<'a> {
    pub fn new(ctx: &TemplateContext) -> Self {
        Self {
            vars: ctx.data().clone(),
            include: None,
        }
    }

    pub(crate) fn with_include(ctx: &TemplateContext, include: IncludeFn<'a>) -> Self {
        Self {
            vars: ctx.data().clone(),
            include: Some(include),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn vars(&self) -> &Map<String, Value> {
        &self.vars
    }

    /// Render another template file against this scope's data.
    pub fn include(&self, reference: &str) -> std::result::Result<String, EvalError> {
        match self.include {
            Some(include) => include(reference),
            None => Err(EvalError::new(
                "include is not available in this render environment",
            )),
        }
    }
}

/// Host evaluation capability consumed by the program executor.
pub trait Evaluator: Send + Sync {
    /// Execute statement text for its effects on the scope.
    fn eval_statement(&self, source: &str, scope: &mut Scope)
        -> std::result::Result<(), EvalError>;

    /// Evaluate expression text to a value.
    fn eval_expression(
        &self,
        source: &str,
        scope: &mut Scope,
    ) -> std::result::Result<Value, EvalError>;
}

/// Built-in evaluator for data-lookup templates.
///
/// Expressions: bare identifiers and dotted paths resolved from the
/// scope, single/double-quoted string literals, numeric literals,
/// `undefined`/`null`, and `include("path")` calls. Statements: blank
/// text is a no-op, anything else is rejected. Control flow needs a
/// host-language evaluator plugged in by the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultEvaluator;

impl DefaultEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for DefaultEvaluator {
    fn eval_statement(
        &self,
        source: &str,
        _scope: &mut Scope,
    ) -> std::result::Result<(), EvalError> {
        if source.trim().is_empty() {
            return Ok(());
        }
        Err(EvalError::new(format!(
            "cannot execute statement '{}': the built-in evaluator only resolves expressions",
            source.trim()
        )))
    }

    fn eval_expression(
        &self,
        source: &str,
        scope: &mut Scope,
    ) -> std::result::Result<Value, EvalError> {
        let expr = source.trim();
        if expr.is_empty() {
            return Err(EvalError::new("empty expression"));
        }
        if expr == "undefined" || expr == "null" {
            return Ok(Value::Null);
        }
        if let Some(literal) = string_literal(expr) {
            return Ok(Value::String(literal.to_string()));
        }
        if let Ok(n) = expr.parse::<i64>() {
            return Ok(Value::from(n));
        }
        if let Ok(n) = expr.parse::<f64>() {
            return Ok(serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null));
        }
        if let Some(reference) = include_call(expr) {
            return scope.include(reference).map(Value::String);
        }
        if is_path_expression(expr) {
            return match resolve_path(scope.vars(), expr) {
                Some(value) => Ok(value.clone()),
                None => Err(EvalError::new(format!("{} is not defined", expr))),
            };
        }
        Err(EvalError::new(format!(
            "cannot evaluate expression '{}' with the built-in evaluator",
            expr
        )))
    }
}

/// Resolve a dotted path (`user.name`) against a JSON object.
fn resolve_path<'v>(vars: &'v Map<String, Value>, path: &str) -> Option<&'v Value> {
    let mut parts = path.split('.');
    let mut current = vars.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

fn string_literal(expr: &str) -> Option<&str> {
    for quote in ['"', '\''] {
        if expr.len() >= 2 && expr.starts_with(quote) && expr.ends_with(quote) {
            let inner = &expr[1..expr.len() - 1];
            if !inner.contains(quote) {
                return Some(inner);
            }
        }
    }
    None
}

fn include_call(expr: &str) -> Option<&str> {
    let inner = expr.strip_prefix("include")?.trim_start();
    let inner = inner.strip_prefix('(')?;
    let inner = inner.strip_suffix(')')?;
    string_literal(inner.trim())
}

fn is_path_expression(expr: &str) -> bool {
    !expr.is_empty()
        && expr.split('.').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
                && !part.chars().next().is_some_and(|c| c.is_ascii_digit())
        })
}
