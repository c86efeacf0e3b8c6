//! Static include resolution.
//!
//! A statement-mode body of the exact shape `include <path>` splices
//! the referenced file's compiled instructions in place at compile
//! time. The render-time `include("path")` expression form never
//! reaches this module; it is a scope capability installed by the
//! executor.

use std::path::{Path, PathBuf};

use crate::error::{Result, StencilError};
use crate::fs::read_template;
use crate::options::DEFAULT_EXTENSION;

use super::{compile_inner, Compiler};

/// Recognize the static include shorthand: the word `include` followed
/// by exactly one path token, no parentheses anywhere in the body.
pub(super) fn directive_path(body: &str) -> Option<&str> {
    if body.contains('(') {
        return None;
    }
    let mut parts = body.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("include"), Some(path), None) => Some(path),
        _ => None,
    }
}

/// Resolve an include reference relative to the including file's
/// directory, appending the default extension when the reference
/// carries none.
pub(crate) fn resolve(reference: &str, from: &Path) -> PathBuf {
    let dir = from.parent().unwrap_or_else(|| Path::new(""));
    let mut resolved = dir.join(reference);
    if Path::new(reference).extension().is_none() {
        resolved.set_extension(DEFAULT_EXTENSION);
    }
    resolved
}

/// Compile the referenced file and splice its instructions, deferred
/// tail and dependencies into the including compilation.
pub(super) fn splice(
    compiler: &mut Compiler,
    reference: &str,
    in_flight: &mut Vec<PathBuf>,
) -> Result<()> {
    let from = compiler
        .opts
        .filename
        .clone()
        .ok_or(StencilError::IncludeRequiresFilename)?;
    let resolved = resolve(reference, &from);

    if in_flight.contains(&resolved) {
        let chain = in_flight
            .iter()
            .map(|p| p.display().to_string())
            .chain([resolved.display().to_string()])
            .collect::<Vec<_>>()
            .join(" -> ");
        return Err(StencilError::IncludeCycle(chain));
    }

    let template =
        read_template(compiler.fs, &resolved).map_err(|_| StencilError::IncludeResolveFailed {
            include: reference.to_owned(),
            from,
        })?;

    let opts = compiler.opts.clone().with_filename(resolved.clone());
    in_flight.push(resolved.clone());
    let included = compile_inner(&template, &opts, compiler.fs, in_flight)?;
    in_flight.pop();

    compiler.body.extend(included.instructions);
    compiler.deferred.extend(included.deferred);
    compiler.dependencies.push(resolved);
    compiler.dependencies.extend(included.dependencies);
    Ok(())
}
