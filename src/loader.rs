//! In-flight operation tracking for busy indicators.
//!
//! Counts overlapping operations, so `is_loading` stays true until the last
//! one finishes. The count is released by a drop guard, so a cancelled
//! future does not leave the loader stuck.

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Debug, Default)]
pub struct Loader {
    in_flight: Arc<AtomicUsize>,
}

struct LoadingGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Loader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Run `fut` while marked as loading.
    pub async fn run<F, T>(&self, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _guard = LoadingGuard { in_flight: Arc::clone(&self.in_flight) };
        fut.await
    }
}
