//! Error types for nestbuild
//!
//! All modules use `NestResult<T>` as their return type.

use crate::artifact::ArtifactSet;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for nestbuild operations
pub type NestResult<T> = Result<T, NestError>;

/// All errors that can occur in nestbuild
#[derive(Error, Debug)]
pub enum NestError {
    // Nested build errors
    #[error("Nested build failed: {command}, exit code: {code}\n{output_tail}")]
    BuildFailed {
        command: String,
        code: i32,
        output_tail: String,
    },

    #[error("Nested build terminated by signal: {0}")]
    BuildSignaled(String),

    #[error("Failed to start nested build: {command}")]
    BuildSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No build command configured. Set [build] command in config or pass one after --")]
    NoBuildCommand,

    #[error("Artifacts read before the nested build finished")]
    ArtifactsNotFinalized,

    // Cache errors
    #[error("Failed to write completion marker {path}: {source}")]
    MarkerPersist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        /// Artifacts harvested by the build that preceded the failed write
        artifacts: ArtifactSet,
    },

    #[error("Timed out after {timeout:?} waiting for cache lock {path}")]
    CacheLockTimeout { path: PathBuf, timeout: Duration },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NestError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Whether the nested build itself reported the failure
    pub fn is_build_failure(&self) -> bool {
        matches!(
            self,
            Self::BuildFailed { .. } | Self::BuildSignaled(_) | Self::BuildSpawn { .. }
        )
    }

    /// Whether the build succeeded but the completion marker could not be written
    pub fn is_marker_persistence(&self) -> bool {
        matches!(self, Self::MarkerPersist { .. })
    }

    /// Artifacts that were harvested before a marker write failed
    pub fn into_artifacts(self) -> Option<ArtifactSet> {
        match self {
            Self::MarkerPersist { artifacts, .. } => Some(artifacts),
            _ => None,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NoBuildCommand => Some("Run: nestbuild run -- <command> [args...]"),
            Self::MarkerPersist { .. } => {
                Some("Check that the cache directory is writable, or set cache.marker_failure = \"warn\"")
            }
            Self::CacheLockTimeout { .. } => {
                Some("Another nestbuild process holds the cache; wait for it or raise cache.lock_timeout_secs")
            }
            _ => None,
        }
    }
}
