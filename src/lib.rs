//! nestbuild - Cache-gated nested build runner
//!
//! Runs a self-contained bootstrap build whose output is a runtime
//! classpath, skipping the clean rebuild when a completion marker in the
//! cache records an earlier success.

pub mod artifact;
pub mod build;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod operation;
pub mod orchestrator;

pub use artifact::ArtifactSet;
pub use error::{NestError, NestResult};
pub use orchestrator::CacheGatedBuild;
