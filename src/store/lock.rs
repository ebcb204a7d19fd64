//! Cross-process exclusion for the store files.
//!
//! Each store has a single owning actor inside one process, but every CLI
//! invocation is its own process. The lock file makes the owning process
//! the only one that may load and rewrite the files until it lets go.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{StoreError, StoreResult};

const RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// An exclusive lock on a lock file, released on drop.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Take the lock, waiting up to `timeout` for another holder to let go.
    pub async fn acquire(path: impl Into<PathBuf>, timeout: Duration) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)?;

        let deadline = Instant::now() + timeout;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => break,
                Err(_) if Instant::now() < deadline => {
                    debug!(path = %path.display(), "Store locked, waiting");
                    tokio::time::sleep(RETRY_INTERVAL).await;
                }
                Err(_) => return Err(StoreError::Busy(path)),
            }
        }

        info!(path = %path.display(), "Store lock acquired");
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        // Closing the file releases the lock as well
        let _ = self.file.unlock();
        debug!(path = %self.path.display(), "Store lock released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_second_holder_times_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.lock");

        let held = StoreLock::acquire(&path, Duration::ZERO).await.unwrap();
        assert_eq!(held.path(), path);

        let err = StoreLock::acquire(&path, Duration::from_millis(120)).await.unwrap_err();
        assert!(matches!(err, StoreError::Busy(p) if p == path));
    }

    #[tokio::test]
    async fn test_waiter_gets_lock_after_release() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store.lock");

        let held = StoreLock::acquire(&path, Duration::ZERO).await.unwrap();
        let waiter = tokio::spawn({
            let path = path.clone();
            async move { StoreLock::acquire(&path, Duration::from_secs(5)).await }
        });

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!waiter.is_finished());

        drop(held);
        assert!(waiter.await.unwrap().is_ok());
    }
}
