use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

use super::collector::collect_files;
use super::events::SearchListener;
use super::processor::FileProcessor;
use super::session::SessionState;
use crate::results::{ProgressEvent, SearchResult};

/// Progress is re-reported every this many processed files
pub const PROGRESS_INTERVAL: usize = 10;

const PROCESSING_MESSAGE: &str = "Processing files...";

/// Files per batch: an even split across workers, never zero
pub fn batch_size(file_count: usize, worker_count: usize) -> usize {
    (file_count / worker_count.max(1)).max(1)
}

/// Fans one root's files out across batch tasks
pub struct Scheduler<'s, L: ?Sized> {
    processor: &'s FileProcessor<'s>,
    state: &'s SessionState,
    listener: &'s L,
    worker_count: usize,
}

impl<'s, L> Scheduler<'s, L>
where
    L: SearchListener + ?Sized,
{
    pub fn new(
        processor: &'s FileProcessor<'s>,
        state: &'s SessionState,
        listener: &'s L,
        worker_count: usize,
    ) -> Self {
        Self {
            processor,
            state,
            listener,
            worker_count: worker_count.max(1),
        }
    }

    /// Collects `root` and scans its files in contiguous batches.
    ///
    /// Must run inside a rayon pool; returns once every batch task has finished.
    pub fn search_root(&self, root: &Path) {
        if self.state.is_cancelled() {
            return;
        }

        let files = collect_files(root, &self.state.cancel);
        let total = files.len();
        self.state.progress.add_total(total);
        self.listener.on_progress(&ProgressEvent::new(
            format!("Searching in: {}", root.display()),
            0,
            total,
        ));

        let size = batch_size(total, self.worker_count);
        debug!(
            "Scheduling {} files under {} in batches of {}",
            total,
            root.display(),
            size
        );

        let processed = AtomicUsize::new(0);
        rayon::scope(|scope| {
            for batch in files.chunks(size) {
                if self.state.is_cancelled() {
                    break;
                }
                let processed = &processed;
                scope.spawn(move |_| self.run_batch(batch, processed, total));
            }
        });
    }

    fn run_batch(&self, batch: &[PathBuf], processed: &AtomicUsize, total: usize) {
        for path in batch {
            // In-flight files finish; new ones are not started
            if self.state.is_cancelled() {
                trace!("Batch stopped by cancellation before {}", path.display());
                break;
            }

            if let Some(result) = self.processor.process_file(path) {
                self.publish(result);
            }

            self.state.progress.file_done();
            let done = processed.fetch_add(1, Ordering::AcqRel) + 1;
            if done % PROGRESS_INTERVAL == 0 || done == total {
                self.report(done, total);
            }
        }

        self.report(processed.load(Ordering::Acquire), total);
    }

    fn publish(&self, result: SearchResult) {
        self.state.results.push(result.clone());
        self.listener.on_result(&result);
    }

    fn report(&self, done: usize, total: usize) {
        self.listener
            .on_progress(&ProgressEvent::new(PROCESSING_MESSAGE, done, total));
    }
}
