//! Per-file serialization.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinError;

/// One async mutex per file.
///
/// Operations on the same file run one at a time; different files do not
/// wait on each other. Paths are canonicalized when possible so two
/// spellings of one file share a lock. Entries nobody holds or waits on
/// are dropped the next time a lock is taken.
#[derive(Debug, Default)]
pub struct FileLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FileLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `path`.
    pub async fn lock(&self, path: &Path) -> OwnedMutexGuard<()> {
        let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let lock = {
            let mut locks = self.locks.lock().await;
            // Holders and waiters each keep a clone; the map's is the last one.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(key).or_default())
        };
        lock.lock_owned().await
    }

    /// Run `work` on the blocking pool while holding the lock for `path`.
    ///
    /// The guard travels with `work`, so dropping the returned future
    /// releases the lock only once `work` has returned.
    pub async fn run_exclusive<T, F>(&self, path: &Path, work: F) -> Result<T, JoinError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let guard = self.lock(path).await;
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            work()
        })
        .await
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
