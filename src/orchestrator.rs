//! Cache-gated nested build
//!
//! Runs a nested build and returns the artifact set it produced, using a
//! completion marker in the cache directory to tell the build whether it
//! has to start from scratch.
//!
//! The sequence within one call is fixed:
//!
//! 1. test the marker to compute the rebuild hint
//! 2. run the nested build with a fresh listener, attributed to the
//!    caller's current operation
//! 3. take the finalized artifact set from the listener
//! 4. create the marker
//!
//! The marker is written only after the build succeeded, so a build that
//! crashed or failed is hinted as a rebuild next time.
//!
//! The cache directory must be held exclusively by the caller for the
//! duration of [`CacheGatedBuild::produce_artifacts`]; nothing here locks it.

use crate::artifact::ArtifactSet;
use crate::build::{ArtifactListener, ListenerFactory, NestedBuildDriver};
use crate::cache::{CacheLocation, CompletionMarker};
use crate::config::MarkerFailurePolicy;
use crate::error::{NestError, NestResult};
use crate::operation::OperationTracker;
use std::sync::Arc;
use tracing::{debug, info_span, warn, Instrument};

/// Orchestrates one nested build against a cache directory
pub struct CacheGatedBuild {
    cache: Arc<dyn CacheLocation>,
    driver: Arc<dyn NestedBuildDriver>,
    listeners: Arc<dyn ListenerFactory>,
    operations: Arc<dyn OperationTracker>,
    marker_failure: MarkerFailurePolicy,
}

impl CacheGatedBuild {
    pub fn new(
        cache: Arc<dyn CacheLocation>,
        driver: Arc<dyn NestedBuildDriver>,
        listeners: Arc<dyn ListenerFactory>,
        operations: Arc<dyn OperationTracker>,
    ) -> Self {
        Self {
            cache,
            driver,
            listeners,
            operations,
            marker_failure: MarkerFailurePolicy::default(),
        }
    }

    /// Set how a failed marker write is reported
    pub fn with_marker_failure(mut self, policy: MarkerFailurePolicy) -> Self {
        self.marker_failure = policy;
        self
    }

    /// The completion marker for this build's cache directory
    pub fn marker(&self) -> CompletionMarker {
        CompletionMarker::in_dir(self.cache.base_dir())
    }

    /// Run the nested build and return its artifact set
    ///
    /// A nested build error is returned unchanged and leaves the marker
    /// absent. If the build succeeds but the marker cannot be written, the
    /// result is [`NestError::MarkerPersist`] carrying the artifacts, unless
    /// the policy is [`MarkerFailurePolicy::Warn`].
    pub async fn produce_artifacts(&self) -> NestResult<ArtifactSet> {
        let marker = self.marker();
        let rebuild = !marker.exists();
        debug!(
            "Completion marker {} {}",
            marker.path().display(),
            if rebuild { "absent, rebuild required" } else { "present" }
        );

        let artifacts = self.build(rebuild).await?;
        debug!("Nested build classpath is: {}", artifacts);

        if let Err(source) = marker.create().await {
            match self.marker_failure {
                MarkerFailurePolicy::Fail => {
                    return Err(NestError::MarkerPersist {
                        path: marker.path().to_path_buf(),
                        source,
                        artifacts,
                    });
                }
                MarkerFailurePolicy::Warn => {
                    warn!(
                        "Failed to write completion marker {}: {}; next run will rebuild",
                        marker.path().display(),
                        source
                    );
                }
            }
        }

        Ok(artifacts)
    }

    async fn build(&self, rebuild: bool) -> NestResult<ArtifactSet> {
        let mut listener = self.listeners.create(rebuild);
        let parent = self.operations.current_operation();
        let span = info_span!(
            "nested_build",
            driver = self.driver.driver_name(),
            rebuild,
            parent = %parent.as_ref().map(|op| op.to_string()).unwrap_or_else(|| "none".to_string()),
        );

        {
            let _binding = self.driver.execution_context().bind(parent);
            self.driver.run(listener.as_observer()).instrument(span).await?;
        }

        listener.take_artifacts()
    }
}
