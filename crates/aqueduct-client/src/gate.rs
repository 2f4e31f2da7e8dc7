use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds the number of concurrently active query lifecycles.
///
/// A slot is acquired before submission and held by the resulting
/// [`QueryHandle`](crate::controller::QueryHandle) until its lifecycle
/// reaches a terminal outcome.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    permits: Arc<Semaphore>,
}

impl AdmissionGate {
    /// Create a gate with the given capacity (clamped to at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity.max(1))),
        }
    }

    /// Wait for a free lifecycle slot.
    pub async fn acquire(&self) -> AdmissionPermit {
        // The semaphore is owned by this gate and never closed.
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .expect("admission semaphore closed");
        AdmissionPermit { _permit: permit }
    }

    /// Currently free slots.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

/// One held lifecycle slot. Dropping the permit frees the slot.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}
