//! File-system collaborator interface.
//!
//! The engine performs no I/O of its own: template and include reads go
//! through [`FileSystem`], and cache auto-invalidation registers watches
//! through the same trait. The OS-backed implementation lives in the
//! `stencil` facade crate; [`MemoryFileSystem`] here backs tests and
//! embedded use.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Change callback invoked by an active watch registration.
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

/// File access consumed by the engine.
pub trait FileSystem: Send + Sync {
    /// Read the full contents of `path`.
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Watch `path`, invoking `on_change` whenever it changes.
    ///
    /// Returns `None` when the path cannot be watched (e.g. it does not
    /// exist); callers are expected to tolerate that and proceed
    /// without invalidation.
    fn watch(&self, path: &Path, on_change: ChangeCallback) -> Option<Box<dyn WatchHandle>>;
}

/// An active watch registration. Dropping the handle cancels the watch.
pub trait WatchHandle: Send {}

/// Read a template file as UTF-8 text with any leading byte-order mark
/// removed.
pub fn read_template(fs: &dyn FileSystem, path: &Path) -> io::Result<String> {
    let bytes = fs.read_file(path)?;
    let text = String::from_utf8(bytes)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => Ok(stripped.to_owned()),
        None => Ok(text),
    }
}

/// In-memory file system.
///
/// Writes through [`MemoryFileSystem::write`] fire any watch callbacks
/// registered for the path, which makes cache-invalidation behavior
/// testable without touching the disk.
#[derive(Default)]
pub struct MemoryFileSystem {
    inner: Arc<MemoryFsInner>,
}

#[derive(Default)]
struct MemoryFsInner {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    watchers: Mutex<HashMap<u64, (PathBuf, ChangeCallback)>>,
    next_watch_id: AtomicU64,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a file system pre-populated with the given files.
    pub fn with_files<P, C, I>(files: I) -> Self
    where
        P: Into<PathBuf>,
        C: Into<Vec<u8>>,
        I: IntoIterator<Item = (P, C)>,
    {
        let fs = Self::new();
        for (path, contents) in files {
            let mut map = fs.inner.files.lock().unwrap();
            map.insert(path.into(), contents.into());
        }
        fs
    }

    /// Create or replace a file, firing watch callbacks for the path.
    pub fn write(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        let path = path.into();
        self.inner
            .files
            .lock()
            .unwrap()
            .insert(path.clone(), contents.into());

        // Snapshot the callbacks before invoking them so a callback that
        // unregisters a watch cannot deadlock on the watchers lock.
        let callbacks: Vec<ChangeCallback> = {
            let watchers = self.inner.watchers.lock().unwrap();
            watchers
                .values()
                .filter(|(watched, _)| *watched == path)
                .map(|(_, cb)| Arc::clone(cb))
                .collect()
        };
        for cb in callbacks {
            cb();
        }
    }

    pub fn remove(&self, path: &Path) {
        self.inner.files.lock().unwrap().remove(path);
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.inner
            .files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("{}", path.display()))
            })
    }

    fn watch(&self, path: &Path, on_change: ChangeCallback) -> Option<Box<dyn WatchHandle>> {
        // Mirror a real file system: a missing path is unwatchable.
        if !self.inner.files.lock().unwrap().contains_key(path) {
            return None;
        }
        let id = self.inner.next_watch_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .watchers
            .lock()
            .unwrap()
            .insert(id, (path.to_path_buf(), on_change));
        Some(Box::new(MemoryWatchHandle {
            inner: Arc::downgrade(&self.inner),
            id,
        }))
    }
}

struct MemoryWatchHandle {
    inner: Weak<MemoryFsInner>,
    id: u64,
}

impl WatchHandle for MemoryWatchHandle {}

impl Drop for MemoryWatchHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.watchers.lock().unwrap().remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn read_missing_file_is_not_found() {
        let fs = MemoryFileSystem::new();
        let err = fs.read_file(Path::new("/missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn read_template_strips_bom() {
        let fs = MemoryFileSystem::with_files([("/bom.stencil", "\u{feff}<p>hi</p>")]);
        let text = read_template(&fs, Path::new("/bom.stencil")).unwrap();
        assert_eq!(text, "<p>hi</p>");
    }

    #[test]
    fn watch_fires_on_write_and_stops_on_drop() {
        let fs = MemoryFileSystem::with_files([("/a.stencil", "old")]);
        let hits = Arc::new(AtomicUsize::new(0));
        let hits2 = Arc::clone(&hits);
        let handle = fs
            .watch(
                Path::new("/a.stencil"),
                Arc::new(move || {
                    hits2.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        fs.write("/a.stencil", "new");
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        drop(handle);
        fs.write("/a.stencil", "newer");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn watch_on_missing_path_is_refused() {
        let fs = MemoryFileSystem::new();
        assert!(fs.watch(Path::new("/nope"), Arc::new(|| {})).is_none());
    }
}
