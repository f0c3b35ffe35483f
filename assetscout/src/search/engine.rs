use rayon::ThreadPoolBuilder;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::cancel::CancellationToken;
use super::events::SearchListener;
use super::matcher::PatternMatcher;
use super::processor::FileProcessor;
use super::scheduler::Scheduler;
use super::session::{ProgressSnapshot, SessionState};
use crate::config::{default_thread_count, SearchConfig, SizeLimits};
use crate::errors::Result;
use crate::metrics::SearchStats;
use crate::results::{ProgressEvent, SearchResult};

/// How a call to [`SearchEngine::search`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every root was fully processed
    Completed,
    /// Cancellation was observed; results are partial
    Cancelled,
    /// The pattern did not compile; nothing was scheduled
    InvalidPattern,
    /// Another session was already running; nothing happened
    Busy,
}

/// Concurrent, cancellable content search over directory trees.
///
/// One engine runs at most one session at a time. Every method takes `&self`,
/// so the engine can be shared (e.g. behind an `Arc`) between the thread
/// running [`search`](Self::search) and threads polling or stopping it.
#[derive(Debug)]
pub struct SearchEngine {
    state: SessionState,
    searching: AtomicBool,
    limits: Mutex<SizeLimits>,
    thread_count: AtomicUsize,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    pub fn new() -> Self {
        Self {
            state: SessionState::default(),
            searching: AtomicBool::new(false),
            limits: Mutex::new(SizeLimits::default()),
            thread_count: AtomicUsize::new(default_thread_count().get()),
        }
    }

    /// Engine with the size window and worker count taken from `config`
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let engine = Self::new();
        let limits = config.size_limits()?;
        engine.set_file_size_limits(limits.min, limits.max)?;
        engine.set_thread_count(config.thread_count.get());
        Ok(engine)
    }

    /// Sets the inclusive size window for subsequent sessions.
    ///
    /// A running session keeps the window it started with; callers should not
    /// rely on changes made while [`is_searching`](Self::is_searching) is true.
    pub fn set_file_size_limits(&self, min: u64, max: u64) -> Result<()> {
        let limits = SizeLimits::new(min, max)?;
        *self.limits.lock().unwrap_or_else(PoisonError::into_inner) = limits;
        Ok(())
    }

    pub fn file_size_limits(&self) -> SizeLimits {
        *self.limits.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the worker count for subsequent sessions; zero is treated as one.
    pub fn set_thread_count(&self, threads: usize) {
        self.thread_count.store(threads.max(1), Ordering::Relaxed);
    }

    pub fn get_thread_count(&self) -> usize {
        self.thread_count.load(Ordering::Relaxed)
    }

    /// Runs a session over `roots`, blocking until it completes or is cancelled.
    ///
    /// Starting a session clears the previous session's results, counters and
    /// cancellation. If a session is already running this returns
    /// [`SessionOutcome::Busy`] without touching any state. Invalid patterns,
    /// missing roots and non-directory roots are reported through
    /// `listener.on_progress` with `total == 0`; per-file I/O failures are not
    /// reported at all.
    pub fn search<L>(&self, pattern: &str, roots: &[PathBuf], listener: &L) -> SessionOutcome
    where
        L: SearchListener + ?Sized,
    {
        if self
            .searching
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Search already in progress, ignoring request for '{}'", pattern);
            return SessionOutcome::Busy;
        }
        let _session = SearchingGuard(&self.searching);

        let started = Instant::now();
        self.state.begin();
        info!("Starting search for '{}' in {} roots", pattern, roots.len());

        let matcher = match PatternMatcher::with_metrics(pattern, &self.state.metrics) {
            Ok(matcher) => matcher,
            Err(e) => {
                warn!("Aborting search: {}", e);
                listener.on_progress(&ProgressEvent::diagnostic(e.to_string()));
                return SessionOutcome::InvalidPattern;
            }
        };

        let processor = FileProcessor::new(matcher, self.file_size_limits(), &self.state.metrics);
        let workers = self.get_thread_count();
        let scheduler = Scheduler::new(&processor, &self.state, listener, workers);

        let run = || {
            rayon::scope(|scope| {
                for root in roots {
                    if self.state.is_cancelled() {
                        break;
                    }
                    if !root.exists() {
                        warn!("Search root does not exist: {}", root.display());
                        listener.on_progress(&ProgressEvent::diagnostic(format!(
                            "Directory not found: {}",
                            root.display()
                        )));
                        continue;
                    }
                    if !root.is_dir() {
                        warn!("Search root is not a directory: {}", root.display());
                        listener.on_progress(&ProgressEvent::diagnostic(format!(
                            "Error accessing: {} - not a directory",
                            root.display()
                        )));
                        continue;
                    }
                    let scheduler = &scheduler;
                    scope.spawn(move |_| scheduler.search_root(root));
                }
            })
        };

        match ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("assetscout-worker-{i}"))
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!("Falling back to the global thread pool: {}", e);
                run()
            }
        }

        let outcome = if self.state.is_cancelled() {
            SessionOutcome::Cancelled
        } else {
            SessionOutcome::Completed
        };
        info!(
            "Search {:?} in {:.2?}: {} matching files",
            outcome,
            started.elapsed(),
            self.state.results.len()
        );
        self.state.metrics.log_stats();
        outcome
    }

    /// Requests cancellation of the running session. Safe from any thread, any number of times.
    pub fn stop_search(&self) {
        if self.is_searching() {
            debug!("Cancellation requested");
        }
        self.state.cancel.cancel();
    }

    pub fn is_searching(&self) -> bool {
        self.searching.load(Ordering::Acquire)
    }

    /// Handle that cancels this engine's sessions without borrowing the engine.
    ///
    /// The handle stays valid across sessions; each new session clears the flag.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.state.cancel.clone()
    }

    /// Copy of the matches collected by the current or most recent session
    pub fn get_results(&self) -> Vec<SearchResult> {
        self.state.results.snapshot()
    }

    pub fn clear_results(&self) {
        self.state.results.clear();
    }

    /// Files processed and collected so far across all roots of the session
    pub fn progress(&self) -> ProgressSnapshot {
        self.state.progress.snapshot()
    }

    pub fn metrics(&self) -> SearchStats {
        self.state.metrics.get_stats()
    }
}

/// Returns the engine to idle however the session ends, panics included.
struct SearchingGuard<'a>(&'a AtomicBool);

impl Drop for SearchingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
