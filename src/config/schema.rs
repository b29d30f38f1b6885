//! Configuration schema for nestbuild
//!
//! Configuration is stored at `~/.config/nestbuild/config.toml`, with
//! optional per-project overrides in `.nestbuild.toml`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache settings
    pub cache: CacheConfig,

    /// Nested build settings
    pub build: BuildConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// What to do when the completion marker cannot be written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerFailurePolicy {
    /// Return an error carrying the harvested artifacts
    #[default]
    Fail,
    /// Log a warning and return the artifacts
    Warn,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory (defaults to the platform cache dir)
    pub dir: Option<PathBuf>,

    /// Seconds to wait for another process to release the cache
    pub lock_timeout_secs: u64,

    /// Behavior when the completion marker cannot be written
    pub marker_failure: MarkerFailurePolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            lock_timeout_secs: 30,
            marker_failure: MarkerFailurePolicy::Fail,
        }
    }
}

/// Nested build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build command and leading arguments
    pub command: Vec<String>,

    /// Working directory (defaults to the current directory)
    pub working_dir: Option<PathBuf>,

    /// Output line prefix marking a produced artifact
    pub artifact_prefix: String,

    /// Tasks appended when a rebuild is required
    pub clean_tasks: Vec<String>,

    /// Tasks appended otherwise
    pub tasks: Vec<String>,

    /// Extra environment variables for the build
    pub env: HashMap<String, String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: vec![],
            working_dir: None,
            artifact_prefix: "artifact:".to_string(),
            clean_tasks: vec!["clean".to_string(), "build".to_string()],
            tasks: vec!["build".to_string()],
            env: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[cache]"));
        assert!(toml.contains("[build]"));
        assert!(toml.contains("marker_failure = \"fail\""));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.cache.lock_timeout_secs, 30);
        assert_eq!(config.build.tasks, vec!["build"]);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [cache]
            marker_failure = "warn"

            [build]
            command = ["./gradlew", "-q"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cache.marker_failure, MarkerFailurePolicy::Warn);
        assert_eq!(config.build.command, vec!["./gradlew", "-q"]);
        assert_eq!(config.build.artifact_prefix, "artifact:"); // default preserved
    }

    #[test]
    fn unknown_policy_rejected() {
        let result: Result<Config, _> = toml::from_str("[cache]\nmarker_failure = \"ignore\"");
        assert!(result.is_err());
    }
}
