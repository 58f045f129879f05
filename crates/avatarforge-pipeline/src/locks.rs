//! In-process serialization of runs that write the same output path.
//!
//! Two runs on the same input would otherwise interleave their purge and
//! write steps. Runs on different paths proceed in parallel. Across
//! processes the last writer wins.
//!
//! Paths are keyed by their normalized absolute form, so `out/./a.obj`,
//! `out/a.obj` and a symlinked spelling of an existing directory all
//! contend for the same lock.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock};

use tracing::debug;

/// A registry of output paths currently being written.
#[derive(Debug, Default)]
pub struct PathLocks {
    held: Mutex<HashSet<PathBuf>>,
    released: Condvar,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry shared by every pipeline by default.
    pub fn global() -> Arc<PathLocks> {
        static GLOBAL: OnceLock<Arc<PathLocks>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(PathLocks::new())))
    }

    fn held(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        // The set stays consistent even if a holder panicked.
        self.held.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Blocks until `path` is free, then holds it until the guard drops.
    pub fn lock(&self, path: &Path) -> PathGuard<'_> {
        let key = lock_key(path);
        let mut held = self.held();
        while held.contains(&key) {
            debug!(path = %key.display(), "waiting for concurrent run on output path");
            held = self
                .released
                .wait(held)
                .unwrap_or_else(|e| e.into_inner());
        }
        held.insert(key.clone());
        PathGuard {
            locks: self,
            path: key,
        }
    }

    /// Returns true if some run currently holds `path`.
    pub fn is_locked(&self, path: &Path) -> bool {
        self.held().contains(&lock_key(path))
    }
}

/// Normalized form of `path` used as the registry key.
///
/// The parent directory is canonicalized when it exists. Otherwise the
/// path is made absolute and `.`/`..` are resolved lexically.
pub fn lock_key(path: &Path) -> PathBuf {
    if let (Some(dir), Some(name)) = (path.parent(), path.file_name()) {
        let dir = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        };
        if let Ok(dir) = dir.canonicalize() {
            return dir.join(name);
        }
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let mut key = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                key.pop();
            }
            other => key.push(other.as_os_str()),
        }
    }
    key
}

/// Holds an output path; releases it on drop.
#[derive(Debug)]
pub struct PathGuard<'a> {
    locks: &'a PathLocks,
    path: PathBuf,
}

impl PathGuard<'_> {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        self.locks.held().remove(&self.path);
        self.locks.released.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_guard_releases_on_drop() {
        let locks = PathLocks::new();
        let path = Path::new("/out/a_male_avatar.obj");
        {
            let guard = locks.lock(path);
            assert_eq!(guard.path(), path);
            assert!(locks.is_locked(path));
            assert!(!locks.is_locked(Path::new("/out/b_male_avatar.obj")));
        }
        assert!(!locks.is_locked(path));
    }

    #[test]
    fn test_same_path_is_serialized() {
        let locks = Arc::new(PathLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                std::thread::spawn(move || {
                    let _guard = locks.lock(Path::new("same.obj"));
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    std::thread::sleep(std::time::Duration::from_millis(5));
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_equivalent_spellings_share_a_lock() {
        let dir = tempfile::TempDir::new().unwrap();
        let plain = dir.path().join("a_male_avatar.obj");
        let dotted = dir.path().join(".").join("a_male_avatar.obj");
        let parent = dir.path().join("sub").join("..").join("a_male_avatar.obj");
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let locks = PathLocks::new();
        let _guard = locks.lock(&dotted);
        assert!(locks.is_locked(&plain));
        assert!(locks.is_locked(&parent));
        assert!(!locks.is_locked(&dir.path().join("b_male_avatar.obj")));
    }

    #[test]
    fn test_missing_directory_is_normalized_lexically() {
        let key = lock_key(Path::new("/no/such/dir/./x/../a.obj"));
        assert_eq!(key, PathBuf::from("/no/such/dir/a.obj"));
        assert!(lock_key(Path::new("rel.obj")).is_absolute());
    }

    #[test]
    fn test_waiter_blocks_on_equivalent_spelling() {
        let dir = tempfile::TempDir::new().unwrap();
        let plain = dir.path().join("a.obj");
        let dotted = dir.path().join(".").join("a.obj");
        let locks = Arc::new(PathLocks::new());
        let entered = Arc::new(AtomicUsize::new(0));

        let guard = locks.lock(&plain);
        let waiter = {
            let locks = Arc::clone(&locks);
            let entered = Arc::clone(&entered);
            std::thread::spawn(move || {
                let _guard = locks.lock(&dotted);
                entered.store(1, Ordering::SeqCst);
            })
        };
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(entered.load(Ordering::SeqCst), 0);
        drop(guard);
        waiter.join().unwrap();
        assert_eq!(entered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_global_is_shared() {
        assert!(Arc::ptr_eq(&PathLocks::global(), &PathLocks::global()));
    }
}
