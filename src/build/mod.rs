//! Nested build abstraction
//!
//! A nested build is driven by a [`NestedBuildDriver`]. The driver reports
//! progress to a [`BuildObserver`] lent to it for the duration of one run;
//! once the run returns, the orchestrator pulls the finalized artifact set
//! out of the listener it still owns.

mod listener;
mod process;

pub use listener::{ClasspathListener, ClasspathListenerFactory};
pub use process::ProcessDriver;

use crate::artifact::ArtifactSet;
use crate::error::NestResult;
use crate::operation::ExecutionContext;
use async_trait::async_trait;
use std::path::PathBuf;

/// How the nested build should be run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildPlan {
    /// Discard previous outputs before building
    pub clean: bool,
}

/// Receives progress reports from a running nested build
pub trait BuildObserver: Send {
    /// Called once before the build starts, to adjust the plan
    fn build_starting(&mut self, plan: &mut BuildPlan);

    /// Called for each output location in the order the build produces them
    fn output_produced(&mut self, location: PathBuf);

    /// Called once after the build completed successfully
    fn build_finished(&mut self);
}

/// Observer that harvests the nested build's artifact set
pub trait ArtifactListener: BuildObserver {
    /// The rebuild hint this listener was created with
    fn rebuild_required(&self) -> bool;

    /// This listener as the observer handed to the driver
    fn as_observer(&mut self) -> &mut dyn BuildObserver;

    /// Take the finalized artifact set
    ///
    /// Fails with [`NestError::ArtifactsNotFinalized`](crate::NestError::ArtifactsNotFinalized)
    /// if the build has not signalled completion.
    fn take_artifacts(&mut self) -> NestResult<ArtifactSet>;
}

/// Creates a fresh listener for each nested build
pub trait ListenerFactory: Send + Sync {
    fn create(&self, rebuild_required: bool) -> Box<dyn ArtifactListener>;
}

impl<F> ListenerFactory for F
where
    F: Fn(bool) -> Box<dyn ArtifactListener> + Send + Sync,
{
    fn create(&self, rebuild_required: bool) -> Box<dyn ArtifactListener> {
        self(rebuild_required)
    }
}

/// Engine that executes a nested build
///
/// Runs are sequential: a driver may be reused with a new observer for each
/// run, but concurrent runs on one driver are not supported.
#[async_trait]
pub trait NestedBuildDriver: Send + Sync {
    /// Execution context carrying the parent operation of the nested work
    fn execution_context(&self) -> &ExecutionContext;

    /// Run the build to completion, reporting to `observer`
    ///
    /// Returns the build's own error unchanged on failure, in which case
    /// `observer.build_finished()` is not called.
    async fn run(&self, observer: &mut dyn BuildObserver) -> NestResult<()>;

    /// Human-readable driver name for diagnostics
    fn driver_name(&self) -> &'static str;
}
