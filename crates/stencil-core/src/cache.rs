//! Compiled-artifact cache.
//!
//! Keyed by file path, holding ready-to-execute programs. Entries are
//! removed explicitly or, when a watch was requested, by the
//! file-system collaborator reporting a change to the backing file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};

use crate::engine::Program;
use crate::fs::{FileSystem, WatchHandle};

pub struct ProgramCache {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    programs: HashMap<PathBuf, Entry>,
}

struct Entry {
    program: Arc<Program>,
    // Dropping the handle cancels the watch.
    _watch: Option<Box<dyn WatchHandle>>,
}

impl ProgramCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner::default()),
        })
    }

    pub fn get(&self, key: &Path) -> Option<Arc<Program>> {
        self.inner
            .lock()
            .unwrap()
            .programs
            .get(key)
            .map(|entry| Arc::clone(&entry.program))
    }

    /// Register a compiled program under `key`, at most one entry per
    /// key (a second `set` replaces the first, last write wins).
    ///
    /// With `watch` set, asks the file system to watch the key path and
    /// evicts the entry when a change is reported. An unwatchable path
    /// is tolerated; the entry is cached without auto-invalidation.
    pub fn set(
        self: &Arc<Self>,
        key: &Path,
        program: Arc<Program>,
        watch: bool,
        fs: &dyn FileSystem,
    ) {
        let handle = if watch {
            let cache = Arc::downgrade(self);
            let watched = key.to_path_buf();
            fs.watch(
                key,
                Arc::new(move || evict(&cache, &watched)),
            )
        } else {
            None
        };
        self.inner.lock().unwrap().programs.insert(
            key.to_path_buf(),
            Entry {
                program,
                _watch: handle,
            },
        );
    }

    pub fn del(&self, key: &Path) {
        self.inner.lock().unwrap().programs.remove(key);
    }

    /// Remove every entry and cancel every active watch.
    pub fn clear(&self) {
        self.inner.lock().unwrap().programs.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn evict(cache: &Weak<ProgramCache>, key: &Path) {
    if let Some(cache) = cache.upgrade() {
        cache.del(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compile;
    use crate::fs::MemoryFileSystem;
    use crate::options::Options;

    fn program(fs: &MemoryFileSystem, template: &str) -> Arc<Program> {
        Arc::new(compile(template, &Options::default(), fs).unwrap())
    }

    #[test]
    fn get_returns_what_set_stored() {
        let fs = MemoryFileSystem::new();
        let cache = ProgramCache::new();
        let key = Path::new("/views/page.stencil");

        assert!(cache.get(key).is_none());
        cache.set(key, program(&fs, "hello"), false, &fs);
        assert!(cache.get(key).is_some());
        assert_eq!(cache.len(), 1);

        cache.del(key);
        assert!(cache.get(key).is_none());
    }

    #[test]
    fn watch_evicts_entry_on_change() {
        let fs = MemoryFileSystem::with_files([("/views/page.stencil", "v1")]);
        let cache = ProgramCache::new();
        let key = Path::new("/views/page.stencil");

        cache.set(key, program(&fs, "v1"), true, &fs);
        assert!(cache.get(key).is_some());

        fs.write("/views/page.stencil", "v2");
        assert!(cache.get(key).is_none());
    }

    #[test]
    fn unwatchable_path_still_caches() {
        let fs = MemoryFileSystem::new();
        let cache = ProgramCache::new();
        let key = Path::new("/views/missing.stencil");

        cache.set(key, program(&fs, "hello"), true, &fs);
        assert!(cache.get(key).is_some());
    }

    #[test]
    fn clear_drops_entries_and_watches() {
        let fs = MemoryFileSystem::with_files([("/a.stencil", "a"), ("/b.stencil", "b")]);
        let cache = ProgramCache::new();
        cache.set(Path::new("/a.stencil"), program(&fs, "a"), true, &fs);
        cache.set(Path::new("/b.stencil"), program(&fs, "b"), false, &fs);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());

        // The watch was cancelled with its entry, so a later write must
        // not touch the cache.
        cache.set(Path::new("/a.stencil"), program(&fs, "a2"), false, &fs);
        fs.write("/a.stencil", "a3");
        assert!(cache.get(Path::new("/a.stencil")).is_some());
    }
}
