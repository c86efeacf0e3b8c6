//! Template compiler.
//!
//! Drives the tokenizer, tracks the open directive mode, applies the
//! whitespace-control rules and generates the instruction [`Program`].
//! Static includes are spliced in here at compile time; everything
//! render-time lives in [`exec`].

pub mod diagnostics;
mod exec;
mod include;
mod program;
pub mod tokenize;

#[cfg(test)]
mod tests;

pub use program::{Instruction, Program};

use std::path::PathBuf;

use crate::error::{Result, StencilError};
use crate::fs::FileSystem;
use crate::options::Options;

use tokenize::{Chunk, Tag, TokenStream};

/// Compile template text into an executable [`Program`].
///
/// Purely CPU-bound except for static includes, which read through the
/// file-system collaborator. With `opts.debug` set, the generated
/// program is dumped to stderr.
pub fn compile(template: &str, opts: &Options, fs: &dyn FileSystem) -> Result<Program> {
    let mut in_flight = Vec::new();
    if let Some(filename) = &opts.filename {
        in_flight.push(filename.clone());
    }
    let program = compile_inner(template, opts, fs, &mut in_flight)?;
    if opts.debug {
        eprintln!("{program}");
    }
    Ok(program)
}

/// Compilation entry shared with the include resolver. `in_flight`
/// holds the chain of files currently being compiled so circular
/// includes fail fast instead of recursing.
pub(crate) fn compile_inner(
    template: &str,
    opts: &Options,
    fs: &dyn FileSystem,
    in_flight: &mut Vec<PathBuf>,
) -> Result<Program> {
    let mut compiler = Compiler::new(opts, fs);
    compiler.run(template, in_flight)?;
    Ok(Program {
        instructions: compiler.body,
        deferred: compiler.deferred,
        dependencies: compiler.dependencies,
        source: opts.compile_debug.then(|| template.to_owned()),
        opts: opts.clone(),
    })
}

/// Active directive kind while inside an open/close tag pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Eval,
    Escaped,
    Raw,
    Comment,
    Literal,
}

struct Compiler<'e> {
    opts: &'e Options,
    fs: &'e dyn FileSystem,
    mode: Option<Mode>,
    /// Pending suppression of one line terminator after `-D>`/`_D>`.
    truncate: bool,
    line: usize,
    body: Vec<Instruction>,
    deferred: Vec<Instruction>,
    dependencies: Vec<PathBuf>,
}

impl<'e> Compiler<'e> {
    fn new(opts: &'e Options, fs: &'e dyn FileSystem) -> Self {
        Self {
            opts,
            fs,
            mode: None,
            truncate: false,
            line: 1,
            body: Vec::new(),
            deferred: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    fn run(&mut self, template: &str, in_flight: &mut Vec<PathBuf>) -> Result<()> {
        let chunks: Vec<Chunk> = TokenStream::new(template, self.opts.delimiter).collect();
        self.check_balance(&chunks)?;

        for idx in 0..chunks.len() {
            match chunks[idx] {
                Chunk::Tag(tag) => self.scan_tag(tag)?,
                Chunk::Text(raw) => {
                    let mut text = raw;
                    if matches!(chunks.get(idx + 1), Some(Chunk::Tag(Tag::OpenSlurp))) {
                        text = text.trim_end_matches([' ', '\t']);
                    }
                    if idx > 0 && matches!(chunks[idx - 1], Chunk::Tag(Tag::CloseSlurp)) {
                        text = text.trim_start_matches([' ', '\t']);
                    }
                    self.scan_text(text, in_flight)?;
                    // Line numbers track the original text, before any
                    // whitespace control.
                    self.advance_line(raw);
                }
            }
        }
        Ok(())
    }

    /// Every open token except `<DD` must be closed either immediately
    /// or after exactly one body chunk.
    fn check_balance(&self, chunks: &[Chunk]) -> Result<()> {
        for (idx, chunk) in chunks.iter().enumerate() {
            let Chunk::Tag(tag) = chunk else { continue };
            if !tag.is_open() || *tag == Tag::OpenLiteral {
                continue;
            }
            let closed = match chunks.get(idx + 1) {
                Some(Chunk::Tag(t)) if t.is_close() => true,
                Some(Chunk::Text(_)) => {
                    matches!(chunks.get(idx + 2), Some(Chunk::Tag(t)) if t.is_close())
                }
                _ => false,
            };
            if !closed {
                return Err(StencilError::UnmatchedOpen(tag.text(self.opts.delimiter)));
            }
        }
        Ok(())
    }

    fn scan_tag(&mut self, tag: Tag) -> Result<()> {
        match tag {
            Tag::OpenEval | Tag::OpenSlurp => self.open(Mode::Eval, tag)?,
            Tag::OpenEscaped => self.open(Mode::Escaped, tag)?,
            Tag::OpenRaw => self.open(Mode::Raw, tag)?,
            Tag::OpenComment => self.open(Mode::Comment, tag)?,
            Tag::OpenLiteral => match self.mode {
                // The doubled delimiter reduces to a single literal
                // open marker.
                None | Some(Mode::Literal) => {
                    let d = self.opts.delimiter;
                    self.append_literal(&format!("<{d}"));
                    self.mode = Some(Mode::Literal);
                }
                Some(_) => {
                    return Err(StencilError::UnmatchedOpen(tag.text(self.opts.delimiter)))
                }
            },
            Tag::Close | Tag::CloseTrim | Tag::CloseSlurp => {
                match self.mode {
                    // A close inside literal mode is itself literal
                    // output, so `<DD body D>` renders `<D body D>`.
                    Some(Mode::Literal) => {
                        let text = tag.text(self.opts.delimiter);
                        self.append_literal(&text);
                    }
                    Some(_) => {}
                    None => {
                        return Err(StencilError::UnmatchedClose(
                            tag.text(self.opts.delimiter),
                        ))
                    }
                }
                self.mode = None;
                self.truncate = matches!(tag, Tag::CloseTrim | Tag::CloseSlurp);
            }
        }
        Ok(())
    }

    fn open(&mut self, mode: Mode, tag: Tag) -> Result<()> {
        if self.mode.is_some() {
            return Err(StencilError::UnmatchedOpen(tag.text(self.opts.delimiter)));
        }
        self.mode = Some(mode);
        Ok(())
    }

    fn scan_text(&mut self, text: &str, in_flight: &mut Vec<PathBuf>) -> Result<()> {
        match self.mode {
            Some(Mode::Eval) => {
                if let Some(reference) = include::directive_path(text) {
                    include::splice(self, reference, in_flight)?;
                } else {
                    self.push_statement(text);
                }
            }
            Some(Mode::Escaped) => {
                let expr = trim_expression(text);
                self.body.push(Instruction::EmitEscaped(expr.to_owned()));
            }
            Some(Mode::Raw) => {
                let expr = trim_expression(text);
                self.body.push(Instruction::EmitRaw(expr.to_owned()));
            }
            Some(Mode::Comment) => {}
            Some(Mode::Literal) | None => self.append_literal(text),
        }
        Ok(())
    }

    /// Statement-mode body: split around deferred-completion markers,
    /// routing everything after the first marker to the deferred tail.
    fn push_statement(&mut self, body: &str) {
        let mut text = body.to_owned();
        // A trailing line comment with no newline would swallow
        // whatever the evaluator runs next; terminate it.
        let comment_at = text.rfind("//").map(|i| i as isize).unwrap_or(-1);
        let newline_at = text.rfind('\n').map(|i| i as isize).unwrap_or(-1);
        if comment_at > newline_at {
            text.push('\n');
        }

        let parts = split_at_done_markers(&text);
        if !parts[0].trim().is_empty() {
            self.body.push(Instruction::Exec(parts[0].to_owned()));
        }
        if parts.len() > 1 {
            let tail = parts[1..].join("\n");
            if !tail.trim().is_empty() {
                self.deferred.push(Instruction::Exec(tail));
            }
        }
    }

    fn append_literal(&mut self, text: &str) {
        let text = if self.truncate {
            self.truncate = false;
            strip_one_newline(text)
        } else {
            text
        };
        if text.is_empty() {
            return;
        }
        self.body.push(Instruction::EmitLiteral(text.to_owned()));
    }

    fn advance_line(&mut self, raw: &str) {
        let newlines = raw.matches('\n').count();
        if newlines > 0 {
            self.line += newlines;
            if self.opts.compile_debug {
                self.body.push(Instruction::LineMarker(self.line));
            }
        }
    }
}

/// Remove the single leading line terminator a trim-trailing close
/// suppresses. CRLF first so Windows endings lose both bytes.
fn strip_one_newline(text: &str) -> &str {
    for terminator in ["\r\n", "\r", "\n"] {
        if let Some(stripped) = text.strip_prefix(terminator) {
            return stripped;
        }
    }
    text
}

/// Output-directive bodies drop one trailing statement terminator and
/// surrounding whitespace.
fn trim_expression(text: &str) -> &str {
    let text = text.trim_end();
    text.strip_suffix(';').unwrap_or(text).trim()
}

/// Split statement text at `done(...)` markers, dropping the markers
/// themselves. `parts[0]` stays in the main body; the rest is deferred.
fn split_at_done_markers(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut pos = 0;
    while let Some((start, end)) = find_done_marker(&text[pos..]) {
        parts.push(&text[pos..pos + start]);
        pos += end;
    }
    parts.push(&text[pos..]);
    parts
}

/// Locate one `done(...)` call, with an optional trailing `;`, returning
/// its byte range. A preceding identifier character disqualifies a
/// match (`isdone(` is not a marker).
fn find_done_marker(text: &str) -> Option<(usize, usize)> {
    let mut search = 0;
    while let Some(found) = text[search..].find("done(") {
        let start = search + found;
        let preceded = text[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$');
        if preceded {
            search = start + "done(".len();
            continue;
        }
        let close = text[start..].find(')')?;
        let mut end = start + close + 1;
        if text[end..].starts_with(';') {
            end += 1;
        }
        return Some((start, end));
    }
    None
}
