//! Durable completion marker
//!
//! A zero-byte file whose existence records that a nested build has
//! completed successfully in a cache directory.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tracing::debug;

/// Name of the marker file inside the cache directory
pub const MARKER_FILE_NAME: &str = "built.bin";

/// Completion marker at `<cache>/built.bin`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionMarker {
    path: PathBuf,
}

impl CompletionMarker {
    /// Marker for the given cache base directory
    pub fn in_dir(cache_dir: &Path) -> Self {
        Self {
            path: cache_dir.join(MARKER_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a successful build has completed here before
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Create the marker if it is not already present
    ///
    /// Leaves an existing marker untouched. Never creates the cache
    /// directory itself.
    pub async fn create(&self) -> io::Result<()> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await
        {
            Ok(file) => {
                file.sync_all().await?;
                debug!("Created completion marker {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && self.path.is_file() => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Remove the marker so the next build is hinted as a rebuild
    ///
    /// Returns whether a marker was present.
    pub async fn remove(&self) -> io::Result<bool> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
