use std::sync::atomic::{AtomicUsize, Ordering};

use super::cancel::CancellationToken;
use crate::metrics::SearchMetrics;
use crate::results::ResultStore;

/// Session-wide processed/total file counters
#[derive(Debug, Default)]
pub struct ProgressCounters {
    processed: AtomicUsize,
    total: AtomicUsize,
}

impl ProgressCounters {
    pub(crate) fn add_total(&self, files: usize) {
        self.total.fetch_add(files, Ordering::Relaxed);
    }

    pub(crate) fn file_done(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn reset(&self) {
        self.processed.store(0, Ordering::Relaxed);
        self.total.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            total: self.total.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`ProgressCounters`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub processed: usize,
    pub total: usize,
}

/// State shared by every task of the current session.
///
/// Owned by the engine and handed to tasks by reference, so separate engines
/// never share counters, results or cancellation.
#[derive(Debug, Default)]
pub struct SessionState {
    pub cancel: CancellationToken,
    pub results: ResultStore,
    pub progress: ProgressCounters,
    pub metrics: SearchMetrics,
}

impl SessionState {
    /// Returns the state to a fresh session
    pub(crate) fn begin(&self) {
        self.cancel.reset();
        self.results.clear();
        self.progress.reset();
        self.metrics.reset();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::SearchResult;

    #[test]
    fn test_begin_resets_everything() {
        let state = SessionState::default();
        state.cancel.cancel();
        state.results.push(SearchResult::new("a.txt", "foo"));
        state.progress.add_total(5);
        state.progress.file_done();
        state.metrics.record_match();

        state.begin();

        assert!(!state.is_cancelled());
        assert!(state.results.is_empty());
        assert_eq!(state.progress.snapshot(), ProgressSnapshot::default());
        assert_eq!(state.metrics.get_stats().matches, 0);
    }
}
