//! nestbuild - Cache-gated nested build runner
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use nestbuild::cli::{Cli, Commands};
use nestbuild::config::{Config, ConfigManager};
use nestbuild::error::{NestError, NestResult};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> NestResult<()> {
    let cli = Cli::parse();

    let (mut config, local_config_path) = load_config(&cli).await?;
    if let Some(ref dir) = cli.cache_dir {
        config.cache.dir = Some(dir.clone());
    }

    init_logging(cli.verbose, &config);
    match local_config_path {
        Some(path) => debug!("Using local config: {}", path.display()),
        None if cli.no_local => debug!("Local config discovery disabled (--no-local)"),
        None => {}
    }

    match cli.command {
        Commands::Run(args) => nestbuild::cli::commands::run(args, &config).await,
        Commands::Status(args) => nestbuild::cli::commands::status(args, &config).await,
        Commands::Invalidate => nestbuild::cli::commands::invalidate(&config).await,
        Commands::Config(args) => {
            nestbuild::cli::commands::config(args, &config, cli.config.clone()).await
        }
    }
}

async fn load_config(cli: &Cli) -> NestResult<(Config, Option<PathBuf>)> {
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| NestError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    Ok((config, local_config_path))
}

/// 0 = warn, 1 = info, 2+ = debug; logs always go to stderr
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("nestbuild=warn"),
        1 => EnvFilter::new("nestbuild=info"),
        _ => EnvFilter::new("nestbuild=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
