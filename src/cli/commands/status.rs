//! Status command - show whether the cache holds a completed build

use crate::cache::CompletionMarker;
use crate::cli::args::{StatusArgs, StatusFormat};
use crate::config::{Config, ConfigManager};
use crate::error::NestResult;
use console::style;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct StatusJson {
    cache_dir: PathBuf,
    marker: PathBuf,
    built: bool,
}

/// Execute the status command
pub async fn execute(args: StatusArgs, config: &Config) -> NestResult<()> {
    let cache_dir = ConfigManager::cache_dir(config);
    let marker = CompletionMarker::in_dir(&cache_dir);
    let built = marker.exists();

    match args.format {
        StatusFormat::Json => {
            let status = StatusJson {
                cache_dir,
                marker: marker.path().to_path_buf(),
                built,
            };
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        StatusFormat::Plain => {
            println!("Cache: {}", cache_dir.display());
            if built {
                println!(
                    "{} Completed build recorded; next run is incremental",
                    style("✓").green()
                );
            } else {
                println!(
                    "{} No completed build; next run rebuilds from clean",
                    style("○").dim()
                );
            }
        }
    }

    Ok(())
}
