//! Run command - run the nested build and print its classpath

use crate::artifact::ArtifactSet;
use crate::build::{ClasspathListenerFactory, ProcessDriver};
use crate::cache::DirCache;
use crate::cli::args::{ClasspathFormat, RunArgs};
use crate::config::{Config, ConfigManager};
use crate::error::NestResult;
use crate::operation::OperationStack;
use crate::orchestrator::CacheGatedBuild;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Execute the run command
pub async fn execute(args: RunArgs, config: &Config) -> NestResult<()> {
    let mut build = config.build.clone();
    if !args.command.is_empty() {
        build.command = args.command;
    }
    if let Some(dir) = args.working_dir {
        build.working_dir = Some(dir);
    }

    let operations = Arc::new(OperationStack::new());
    let _operation = operations.start("nestbuild run");

    let cache_dir = ConfigManager::cache_dir(config);
    let timeout = Duration::from_secs(config.cache.lock_timeout_secs);
    debug!("Acquiring cache {}", cache_dir.display());
    let cache = DirCache::acquire(cache_dir, timeout).await?;

    let orchestrator = CacheGatedBuild::new(
        Arc::new(cache),
        Arc::new(ProcessDriver::new(build)),
        Arc::new(ClasspathListenerFactory),
        operations.clone(),
    )
    .with_marker_failure(config.cache.marker_failure);

    let artifacts = orchestrator.produce_artifacts().await?;
    info!("Nested build produced {} artifact(s)", artifacts.len());

    print_classpath(&artifacts, args.format)
}

fn print_classpath(artifacts: &ArtifactSet, format: ClasspathFormat) -> NestResult<()> {
    match format {
        ClasspathFormat::Plain => {
            println!("{}", artifacts.to_classpath()?.to_string_lossy());
        }
        ClasspathFormat::Lines => {
            for location in artifacts {
                println!("{}", location.display());
            }
        }
        ClasspathFormat::Json => {
            println!("{}", serde_json::to_string_pretty(artifacts)?);
        }
    }
    Ok(())
}
