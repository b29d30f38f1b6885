//! Cache locations and the exclusive directory cache
//!
//! [`CacheLocation`] is all the orchestrator needs from the cache layer: a
//! base directory that the caller holds exclusively for the duration of a
//! build. [`DirCache`] provides that exclusivity across processes with an
//! advisory lock file, released when the cache is dropped.

use crate::error::{NestError, NestResult};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A directory handed to the orchestrator by the cache layer
pub trait CacheLocation: Send + Sync {
    /// Base directory of the cache
    fn base_dir(&self) -> &Path;
}

impl CacheLocation for PathBuf {
    fn base_dir(&self) -> &Path {
        self
    }
}

/// Cache directory held under an exclusive advisory lock
#[derive(Debug)]
pub struct DirCache {
    dir: PathBuf,
    lock_path: PathBuf,
    /// Held for the lifetime of the cache; closing it releases the lock
    lock_file: File,
}

impl DirCache {
    /// Lock file name
    const LOCK_FILENAME: &'static str = ".nestbuild.lock";

    const POLL_INTERVAL: Duration = Duration::from_millis(50);

    /// Contention shorter than this is not worth reporting
    const CONTENTION_WARN_AFTER: Duration = Duration::from_millis(500);

    /// Open the cache directory and take its lock
    ///
    /// Creates the directory if needed, then waits up to `timeout` for any
    /// other holder to release it.
    pub async fn acquire(dir: impl Into<PathBuf>, timeout: Duration) -> NestResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| NestError::io(format!("creating cache directory {}", dir.display()), e))?;

        let lock_path = dir.join(Self::LOCK_FILENAME);
        let start = Instant::now();
        let mut warned = false;

        loop {
            match try_lock_exclusive(&lock_path) {
                Ok(lock_file) => {
                    if warned {
                        debug!(
                            "Cache lock acquired after {:.1}s contention: {}",
                            start.elapsed().as_secs_f64(),
                            lock_path.display()
                        );
                    }
                    return Ok(Self {
                        dir,
                        lock_path,
                        lock_file,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if !warned && start.elapsed() > Self::CONTENTION_WARN_AFTER {
                        warn!("Cache {} is locked by another process, waiting...", dir.display());
                        warned = true;
                    }
                }
                Err(e) => {
                    return Err(NestError::io(
                        format!("locking cache {}", lock_path.display()),
                        e,
                    ))
                }
            }

            if start.elapsed() >= timeout {
                return Err(NestError::CacheLockTimeout {
                    path: lock_path,
                    timeout,
                });
            }

            tokio::time::sleep(Self::POLL_INTERVAL).await;
        }
    }

    /// Path of the lock file
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

impl CacheLocation for DirCache {
    fn base_dir(&self) -> &Path {
        &self.dir
    }
}

impl Drop for DirCache {
    fn drop(&mut self) {
        unlock(&self.lock_file, &self.lock_path);
    }
}

#[cfg(unix)]
fn try_lock_exclusive(lock_path: &Path) -> io::Result<File> {
    use std::os::unix::io::AsRawFd;

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;

    // SAFETY: the descriptor is owned by `file`, which outlives the call.
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        return Ok(file);
    }

    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
        Err(io::Error::new(io::ErrorKind::WouldBlock, "lock held"))
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
fn try_lock_exclusive(lock_path: &Path) -> io::Result<File> {
    match OpenOptions::new().write(true).create_new(true).open(lock_path) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(io::Error::new(io::ErrorKind::WouldBlock, "lock held"))
        }
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn unlock(file: &File, _lock_path: &Path) {
    use std::os::unix::io::AsRawFd;

    // SAFETY: the descriptor is still owned by `file`.
    unsafe {
        libc::flock(file.as_raw_fd(), libc::LOCK_UN);
    }
}

#[cfg(not(unix))]
fn unlock(_file: &File, lock_path: &Path) {
    if let Err(e) = std::fs::remove_file(lock_path) {
        warn!("Failed to remove cache lock {}: {}", lock_path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn acquire_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("cache");

        let cache = DirCache::acquire(&dir, Duration::from_secs(1)).await.unwrap();

        assert!(dir.is_dir());
        assert_eq!(cache.base_dir(), dir.as_path());
        assert!(cache.lock_path().exists());
    }

    #[tokio::test]
    async fn second_holder_times_out() {
        let temp = TempDir::new().unwrap();
        let _held = DirCache::acquire(temp.path(), Duration::from_secs(1))
            .await
            .unwrap();

        let err = DirCache::acquire(temp.path(), Duration::from_millis(150))
            .await
            .unwrap_err();

        assert!(matches!(err, NestError::CacheLockTimeout { .. }));
    }

    #[tokio::test]
    async fn lock_released_on_drop() {
        let temp = TempDir::new().unwrap();
        let first = DirCache::acquire(temp.path(), Duration::from_secs(1))
            .await
            .unwrap();
        drop(first);

        let second = DirCache::acquire(temp.path(), Duration::from_millis(200)).await;
        assert!(second.is_ok());
    }

    #[test]
    fn pathbuf_is_a_location() {
        let path = PathBuf::from("/var/cache/nestbuild");
        assert_eq!(path.base_dir(), Path::new("/var/cache/nestbuild"));
    }
}
