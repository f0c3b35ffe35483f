use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Lock-free counters describing what one search session did.
///
/// Shared by reference with every worker task; all updates are relaxed atomics.
#[derive(Debug, Default)]
pub struct SearchMetrics {
    // File outcomes
    files_scanned: AtomicU64,
    files_skipped: AtomicU64,
    files_failed: AtomicU64,
    matches: AtomicU64,

    // Mapping accounting
    bytes_mapped: AtomicU64,
    live_mapped: AtomicU64,
    peak_mapped: AtomicU64,

    // Compiled pattern cache
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl SearchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes every counter; called at session start.
    pub fn reset(&self) {
        for counter in [
            &self.files_scanned,
            &self.files_skipped,
            &self.files_failed,
            &self.matches,
            &self.bytes_mapped,
            &self.live_mapped,
            &self.peak_mapped,
            &self.cache_hits,
            &self.cache_misses,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Records a file whose size fell outside the configured window
    pub fn record_skipped(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a file that could not be stat'ed, opened or mapped
    pub fn record_failed(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a file whose bytes were scanned by the matcher
    pub fn record_scanned(&self) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_match(&self) {
        self.matches.fetch_add(1, Ordering::Relaxed);
    }

    /// Records creation of a mapping of `bytes` length
    pub fn record_mmap(&self, bytes: u64) {
        self.bytes_mapped.fetch_add(bytes, Ordering::Relaxed);
        let live = self.live_mapped.fetch_add(bytes, Ordering::Relaxed) + bytes;
        let mut peak = self.peak_mapped.load(Ordering::Relaxed);
        while live > peak {
            match self.peak_mapped.compare_exchange_weak(
                peak,
                live,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => peak = current,
            }
        }
        debug!("Memory mapped: {} bytes, live mapped: {} bytes", bytes, live);
    }

    /// Records release of a mapping of `bytes` length
    pub fn record_munmap(&self, bytes: u64) {
        let live = self.live_mapped.fetch_sub(bytes, Ordering::Relaxed) - bytes;
        debug!("Memory unmapped: {} bytes, live mapped: {} bytes", bytes, live);
    }

    pub fn record_cache_lookup(&self, hit: bool) {
        if hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get_stats(&self) -> SearchStats {
        SearchStats {
            files_scanned: self.files_scanned.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            matches: self.matches.load(Ordering::Relaxed),
            bytes_mapped: self.bytes_mapped.load(Ordering::Relaxed),
            live_mapped: self.live_mapped.load(Ordering::Relaxed),
            peak_mapped: self.peak_mapped.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Search stats:\n\
             Files scanned/skipped/failed: {}/{}/{}\n\
             Matches: {}\n\
             Bytes mapped: {} (peak live {}, live now {})\n\
             Pattern cache hits/misses: {}/{}",
            stats.files_scanned,
            stats.files_skipped,
            stats.files_failed,
            stats.matches,
            stats.bytes_mapped,
            stats.peak_mapped,
            stats.live_mapped,
            stats.cache_hits,
            stats.cache_misses
        );
    }
}

/// Point-in-time copy of [`SearchMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    pub files_scanned: u64,
    pub files_skipped: u64,
    pub files_failed: u64,
    pub matches: u64,
    pub bytes_mapped: u64,
    pub live_mapped: u64,
    pub peak_mapped: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}
