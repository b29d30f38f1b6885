//! Invalidate command - force the next run to rebuild from clean

use crate::cache::{CacheLocation, CompletionMarker, DirCache};
use crate::config::{Config, ConfigManager};
use crate::error::{NestError, NestResult};
use console::style;
use std::time::Duration;

/// Execute the invalidate command
pub async fn execute(config: &Config) -> NestResult<()> {
    let cache_dir = ConfigManager::cache_dir(config);
    if !cache_dir.is_dir() {
        println!("{} Nothing to invalidate", style("!").yellow());
        return Ok(());
    }

    // Hold the cache so a concurrent run cannot write the marker back mid-removal
    let timeout = Duration::from_secs(config.cache.lock_timeout_secs);
    let cache = DirCache::acquire(cache_dir, timeout).await?;
    let marker = CompletionMarker::in_dir(cache.base_dir());

    let removed = marker.remove().await.map_err(|e| {
        NestError::io(format!("removing marker {}", marker.path().display()), e)
    })?;

    if removed {
        println!(
            "{} Cache invalidated: {}",
            style("✓").green(),
            cache.base_dir().display()
        );
    } else {
        println!("{} Nothing to invalidate", style("!").yellow());
    }

    Ok(())
}
