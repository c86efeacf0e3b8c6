//! OS-backed file system collaborator.

use std::io;
use std::path::Path;

use notify::{recommended_watcher, Event, RecommendedWatcher, RecursiveMode, Watcher};
use stencil_core::{ChangeCallback, FileSystem, WatchHandle};

/// File access through `std::fs`, with `notify`-based watching.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl OsFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for OsFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn watch(&self, path: &Path, on_change: ChangeCallback) -> Option<Box<dyn WatchHandle>> {
        let mut watcher = recommended_watcher(move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
                    on_change();
                }
            }
        })
        .ok()?;
        // A path that cannot be watched degrades to caching without
        // invalidation.
        watcher.watch(path, RecursiveMode::NonRecursive).ok()?;
        Some(Box::new(OsWatchHandle { _watcher: watcher }))
    }
}

struct OsWatchHandle {
    // Dropping the watcher cancels the subscription.
    _watcher: RecommendedWatcher,
}

impl WatchHandle for OsWatchHandle {}
