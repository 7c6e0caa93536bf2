//! Loading and watching on-disk configuration.
//!
//! Settings (RON) and the level grid (plain text) both live under `data/`
//! and are hot-reloadable during development. This module holds the shared
//! pieces: a RON directory loader and a small filesystem watcher resource
//! that raises a flag when anything under a watched directory changes.

use bevy::prelude::Resource;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// File-watcher resource shared by the settings and level reload systems.
#[derive(Resource)]
pub struct FileWatcher {
    changed: Arc<Mutex<bool>>,
    _watcher: Option<RecommendedWatcher>, // kept alive for the watcher's lifetime
}

impl FileWatcher {
    /// A watcher with no OS backing. Used as a fallback when watcher creation
    /// fails (e.g. inotify limits); `take_changed` then always returns false.
    #[must_use]
    pub fn stub() -> Self {
        FileWatcher {
            changed: Arc::new(Mutex::new(false)),
            _watcher: None,
        }
    }

    /// Raise the changed flag by hand, forcing the next check to reload.
    pub fn mark_changed(&self) {
        let mut flag = match self.changed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *flag = true;
    }

    /// Read and clear the changed flag. Recovers from a poisoned mutex, since
    /// the flag is a plain bool and cannot be left inconsistent.
    pub fn take_changed(&self) -> bool {
        let mut flag = match self.changed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let was = *flag;
        *flag = false;
        was
    }
}

/// Load every `.ron` file in `path` and deserialize each into `T`.
/// Files that fail to parse are skipped with a warning so one bad edit
/// does not take out the rest of the directory.
#[must_use]
pub fn load_ron_files<T: DeserializeOwned>(path: &str) -> Vec<T> {
    let mut items = Vec::new();

    if let Ok(entries) = std::fs::read_dir(path) {
        for entry in entries.flatten() {
            let file_path = entry.path();
            if file_path.extension().is_none_or(|ext| ext != "ron") {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(&file_path) else {
                continue;
            };
            match ron::from_str::<T>(&content) {
                Ok(item) => items.push(item),
                Err(e) => eprintln!("Failed to parse {}: {e:?}", file_path.display()),
            }
        }
    }

    items
}

/// Watch `path` (non-recursively) for modifications.
///
/// The returned watcher's flag is raised whenever a modify event lands on a
/// file under the watched directory; callers drain it with `take_changed`.
///
/// # Errors
/// Returns a `notify::Error` if the OS watcher cannot be created or the
/// directory cannot be registered.
pub fn watch_dir(path: &str) -> Result<FileWatcher, notify::Error> {
    let changed = Arc::new(Mutex::new(false));
    let changed_clone = changed.clone();
    // Canonicalize so event paths can be compared against the watched root
    let watched: PathBuf = std::fs::canonicalize(path).unwrap_or_else(|_| PathBuf::from(path));

    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, notify::EventKind::Modify(_) | notify::EventKind::Create(_)) {
                    return;
                }
                let relevant = event.paths.iter().any(|p| {
                    std::fs::canonicalize(p)
                        .unwrap_or_else(|_| p.clone())
                        .starts_with(&watched)
                });
                if relevant {
                    let mut flag = match changed_clone.lock() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    *flag = true;
                }
            }
            Err(e) => eprintln!("Watch error: {e:?}"),
        },
        Config::default(),
    )?;

    watcher.watch(Path::new(path), RecursiveMode::NonRecursive)?;
    Ok(FileWatcher {
        changed,
        _watcher: Some(watcher),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_changed_is_drained_by_take() {
        let watcher = FileWatcher::stub();
        assert!(!watcher.take_changed());
        watcher.mark_changed();
        assert!(watcher.take_changed());
        assert!(!watcher.take_changed());
    }
}
