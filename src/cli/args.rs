//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// nestbuild - Cache-gated nested build runner
///
/// Runs a bootstrap build only when its cache says so, and prints the
/// classpath it produced.
#[derive(Parser, Debug)]
#[command(name = "nestbuild")]
#[command(author, version, about = "Cache-gated nested build runner", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "NESTBUILD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .nestbuild.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,

    /// Cache directory (overrides cache.dir)
    #[arg(long, global = true, env = "NESTBUILD_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the nested build and print its classpath
    Run(RunArgs),

    /// Show whether the cache holds a completed build
    Status(StatusArgs),

    /// Remove the completion marker so the next run rebuilds from clean
    Invalidate,

    /// Show configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Classpath output format
    #[arg(short, long, default_value = "plain")]
    pub format: ClasspathFormat,

    /// Working directory for the build (overrides build.working_dir)
    #[arg(short = 'C', long)]
    pub working_dir: Option<PathBuf>,

    /// Build command and arguments (overrides build.command)
    #[arg(last = true)]
    pub command: Vec<String>,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, default_value = "plain")]
    pub format: StatusFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the global config file path
    Path,
}

/// How to print the classpath
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClasspathFormat {
    /// Joined with the platform path separator
    #[default]
    Plain,
    /// One location per line
    Lines,
    /// JSON array
    Json,
}

/// How to print cache status
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFormat {
    #[default]
    Plain,
    Json,
}
