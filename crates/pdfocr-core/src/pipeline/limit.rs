//! Fan-out limits.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Caps how many tasks of one kind run at once.
///
/// Cloning shares the same budget.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimit {
    semaphore: Option<Arc<Semaphore>>,
    max: usize,
}

impl ConcurrencyLimit {
    /// Allow at most `max` tasks at once. `0` means unbounded.
    pub fn new(max: usize) -> Self {
        if max == 0 {
            return Self::unbounded();
        }
        let max = max.min(Semaphore::MAX_PERMITS);
        Self {
            semaphore: Some(Arc::new(Semaphore::new(max))),
            max,
        }
    }

    /// No limit.
    pub fn unbounded() -> Self {
        Self {
            semaphore: None,
            max: 0,
        }
    }

    /// The cap, or `None` when unbounded.
    pub fn max(&self) -> Option<usize> {
        self.semaphore.as_ref().map(|_| self.max)
    }

    /// Wait for a slot. The slot is released when the permit drops.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        match &self.semaphore {
            // The semaphore is never closed, so acquisition cannot fail.
            Some(semaphore) => Arc::clone(semaphore).acquire_owned().await.ok(),
            None => None,
        }
    }
}
