//! Classpath-harvesting listener

use super::{ArtifactListener, BuildObserver, BuildPlan, ListenerFactory};
use crate::artifact::ArtifactSet;
use crate::error::{NestError, NestResult};
use std::path::PathBuf;
use tracing::{debug, trace};

/// Collects the runtime classpath reported by a nested build
///
/// When created with a rebuild hint it asks the build to start clean, so
/// stale outputs from an earlier failed build never reach the classpath.
#[derive(Debug)]
pub struct ClasspathListener {
    rebuild: bool,
    artifacts: ArtifactSet,
    finished: bool,
}

impl ClasspathListener {
    pub fn new(rebuild: bool) -> Self {
        Self {
            rebuild,
            artifacts: ArtifactSet::new(),
            finished: false,
        }
    }
}

impl BuildObserver for ClasspathListener {
    fn build_starting(&mut self, plan: &mut BuildPlan) {
        plan.clean = self.rebuild;
        debug!("Nested build starting (clean: {})", plan.clean);
    }

    fn output_produced(&mut self, location: PathBuf) {
        if !self.artifacts.insert(location.clone()) {
            trace!("Ignoring repeated output {}", location.display());
        }
    }

    fn build_finished(&mut self) {
        self.finished = true;
    }
}

impl ArtifactListener for ClasspathListener {
    fn rebuild_required(&self) -> bool {
        self.rebuild
    }

    fn as_observer(&mut self) -> &mut dyn BuildObserver {
        self
    }

    fn take_artifacts(&mut self) -> NestResult<ArtifactSet> {
        if !self.finished {
            return Err(NestError::ArtifactsNotFinalized);
        }
        Ok(std::mem::take(&mut self.artifacts))
    }
}

/// Factory producing a fresh [`ClasspathListener`] per build
#[derive(Debug, Clone, Copy, Default)]
pub struct ClasspathListenerFactory;

impl ListenerFactory for ClasspathListenerFactory {
    fn create(&self, rebuild_required: bool) -> Box<dyn ArtifactListener> {
        Box::new(ClasspathListener::new(rebuild_required))
    }
}
