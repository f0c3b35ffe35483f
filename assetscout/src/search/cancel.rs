use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared, cooperative stop signal for one search session.
///
/// Polled, never waited on. Once cancelled it stays cancelled until the engine
/// resets it at the start of the next session.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    pub(crate) fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}
