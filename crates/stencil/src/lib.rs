//! Stencil template engine, public surface.
//!
//! [`Engine`] is the composition root: it owns the default delimiter,
//! the compiled-program cache and the collaborators (file system and
//! expression evaluator), which the core engine only ever sees through
//! traits. The free [`render`] function covers the one-shot case.
//!
//! ```no_run
//! use serde_json::json;
//!
//! let html = stencil::render("<p><%= name %></p>", &json!({"name": "geddy"})).unwrap();
//! assert_eq!(html, "<p>geddy</p>");
//! ```

mod fs;

pub use fs::OsFileSystem;
pub use stencil_core::{
    DefaultEvaluator, EvalError, Evaluator, FileSystem, Instruction, MemoryFileSystem, Options,
    Program, Result, Scope, StencilError, TemplateContext, WatchHandle, DEFAULT_DELIMITER,
    DEFAULT_EXTENSION,
};

use std::path::Path;
use std::sync::Arc;

use stencil_core::cache::ProgramCache;
use stencil_core::fs::read_template;

/// Template engine composition root.
///
/// Holds the program cache and the pluggable collaborators. Cheap to
/// share behind an `Arc`; all methods take `&self`.
pub struct Engine {
    cache: Arc<ProgramCache>,
    fs: Arc<dyn FileSystem>,
    evaluator: Arc<dyn Evaluator>,
    delimiter: char,
}

impl Engine {
    /// Engine backed by the OS file system and the built-in evaluator.
    pub fn new() -> Self {
        Self::with_parts(Arc::new(OsFileSystem::new()), Arc::new(DefaultEvaluator::new()))
    }

    pub fn with_parts(fs: Arc<dyn FileSystem>, evaluator: Arc<dyn Evaluator>) -> Self {
        Self {
            cache: ProgramCache::new(),
            fs,
            evaluator,
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Change the delimiter used by [`Engine::options`].
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Compilation options carrying this engine's defaults.
    pub fn options(&self) -> Options {
        Options::default().with_delimiter(self.delimiter)
    }

    /// Compile template text, consulting the cache when `opts.cache`
    /// is set.
    pub fn compile(&self, template: &str, opts: Options) -> Result<Arc<Program>> {
        self.handle_cache(opts, Some(template))
    }

    /// Compile the template file at `path`.
    pub fn compile_file(&self, path: impl AsRef<Path>, mut opts: Options) -> Result<Arc<Program>> {
        opts.filename = Some(path.as_ref().to_path_buf());
        self.handle_cache(opts, None)
    }

    /// Compile and render template text against a data environment.
    pub fn render(&self, template: &str, ctx: &TemplateContext, opts: Options) -> Result<String> {
        let program = self.handle_cache(opts, Some(template))?;
        program.render(ctx, self.evaluator.as_ref(), self.fs.as_ref())
    }

    /// Render the template file at `path`. The path becomes the
    /// `filename` option, so relative includes, diagnostics and cache
    /// keying all work without further configuration.
    pub fn render_file(
        &self,
        path: impl AsRef<Path>,
        ctx: &TemplateContext,
        mut opts: Options,
    ) -> Result<String> {
        opts.filename = Some(path.as_ref().to_path_buf());
        let program = self.handle_cache(opts, None)?;
        program.render(ctx, self.evaluator.as_ref(), self.fs.as_ref())
    }

    /// Drop every cached program and cancel the associated watches.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Fetch from the cache or compile, reading the backing file when
    /// no template text was supplied.
    fn handle_cache(&self, opts: Options, template: Option<&str>) -> Result<Arc<Program>> {
        let fs = self.fs.as_ref();
        if opts.cache {
            // Validated before any compilation or file work.
            let Some(path) = opts.filename.clone() else {
                return Err(StencilError::CacheRequiresFilename);
            };
            if let Some(program) = self.cache.get(&path) {
                return Ok(program);
            }
            let source = match template {
                Some(text) => text.to_owned(),
                None => read_template(fs, &path)?,
            };
            let program = Arc::new(stencil_core::compile(&source, &opts, fs)?);
            self.cache
                .set(&path, Arc::clone(&program), opts.watch_files, fs);
            return Ok(program);
        }

        let source = match template {
            Some(text) => text.to_owned(),
            None => {
                let Some(path) = &opts.filename else {
                    return Err(StencilError::MissingSource);
                };
                read_template(fs, path)?
            }
        };
        Ok(Arc::new(stencil_core::compile(&source, &opts, fs)?))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot render with default options and the built-in evaluator.
///
/// `data` must serialize to a JSON object; its keys become the names
/// visible to template expressions.
pub fn render<T: serde::Serialize>(template: &str, data: &T) -> Result<String> {
    let ctx = TemplateContext::from_serialize(data)?;
    Engine::new().render(template, &ctx, Options::default())
}
