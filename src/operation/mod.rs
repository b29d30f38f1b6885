//! Units of work for diagnostics
//!
//! An [`OperationHandle`] names the build operation currently in progress.
//! Nested builds borrow the caller's handle so their work is attributed to
//! it in logs, then release it when they finish.

mod context;

pub use context::{ExecutionContext, OperationBinding};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::debug;
use uuid::Uuid;

/// Opaque token for a tracked unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationHandle {
    /// Unique operation ID
    pub id: Uuid,

    /// Human-readable description
    pub name: String,

    /// When the operation started
    pub started_at: DateTime<Utc>,
}

impl OperationHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            started_at: Utc::now(),
        }
    }
}

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Source of the caller's current unit of work
pub trait OperationTracker: Send + Sync {
    /// The innermost operation in progress, if any
    fn current_operation(&self) -> Option<OperationHandle>;
}

/// Stack of nested operations on a single call path
#[derive(Debug, Default)]
pub struct OperationStack {
    operations: Mutex<Vec<OperationHandle>>,
}

impl OperationStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an operation, ending it when the returned scope is dropped
    pub fn start(&self, name: impl Into<String>) -> OperationScope<'_> {
        let handle = OperationHandle::new(name);
        debug!("Starting operation {}", handle);
        self.operations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle.clone());
        OperationScope {
            stack: self,
            handle,
        }
    }

    /// Number of operations currently in progress
    pub fn depth(&self) -> usize {
        self.operations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn finish(&self, id: Uuid) {
        let mut operations = self.operations.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pos) = operations.iter().rposition(|op| op.id == id) {
            operations.remove(pos);
        }
    }
}

impl OperationTracker for OperationStack {
    fn current_operation(&self) -> Option<OperationHandle> {
        self.operations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

/// An operation in progress on an [`OperationStack`]
#[must_use = "the operation ends when the scope is dropped"]
pub struct OperationScope<'a> {
    stack: &'a OperationStack,
    handle: OperationHandle,
}

impl OperationScope<'_> {
    pub fn handle(&self) -> &OperationHandle {
        &self.handle
    }
}

impl Drop for OperationScope<'_> {
    fn drop(&mut self) {
        debug!("Finished operation {}", self.handle);
        self.stack.finish(self.handle.id);
    }
}
