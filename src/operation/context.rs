//! Execution context shared between the orchestrator and a nested build

use super::OperationHandle;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Execution context of a nested build
///
/// Holds the parent operation the nested build's work is attributed to.
/// The slot is only ever written through an [`OperationBinding`].
#[derive(Debug, Default)]
pub struct ExecutionContext {
    parent: Mutex<Option<OperationHandle>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The operation nested work is currently attributed to
    pub fn parent_operation(&self) -> Option<OperationHandle> {
        self.slot().clone()
    }

    /// Attribute nested work to `operation` until the binding is dropped
    pub fn bind(&self, operation: Option<OperationHandle>) -> OperationBinding<'_> {
        if let Some(ref op) = operation {
            debug!("Binding nested build to operation {}", op);
        }
        *self.slot() = operation;
        OperationBinding { context: self }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<OperationHandle>> {
        self.parent.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scoped attribution of nested work to a parent operation
///
/// Dropping the binding clears the parent, whether the scope exits normally,
/// through an error, by unwinding, or because the owning future was dropped.
#[must_use = "the binding is cleared as soon as it is dropped"]
#[derive(Debug)]
pub struct OperationBinding<'a> {
    context: &'a ExecutionContext,
}

impl Drop for OperationBinding<'_> {
    fn drop(&mut self) {
        *self.context.slot() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_sets_and_clears_parent() {
        let context = ExecutionContext::new();
        let op = OperationHandle::new("outer build");

        {
            let _binding = context.bind(Some(op.clone()));
            assert_eq!(context.parent_operation(), Some(op));
        }

        assert!(context.parent_operation().is_none());
    }

    #[test]
    fn binding_cleared_on_panic() {
        let context = ExecutionContext::new();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _binding = context.bind(Some(OperationHandle::new("doomed")));
            panic!("nested build blew up");
        }));

        assert!(result.is_err());
        assert!(context.parent_operation().is_none());
    }

    #[test]
    fn binding_none_leaves_slot_empty() {
        let context = ExecutionContext::new();
        let _binding = context.bind(None);
        assert!(context.parent_operation().is_none());
    }
}
