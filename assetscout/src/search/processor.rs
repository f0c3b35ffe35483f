use memmap2::Mmap;
use std::fs::{self, File};
use std::ops::Deref;
use std::path::Path;
use tracing::trace;

use super::matcher::PatternMatcher;
use crate::config::SizeLimits;
use crate::errors::{Result, SearchError};
use crate::metrics::SearchMetrics;
use crate::results::SearchResult;

/// Bytes inspected when building a preview
pub const PREVIEW_WINDOW: usize = 1000;

/// Preview used when the preview window contains a NUL byte
pub const BINARY_PREVIEW: &str = "Binary content match";

/// Read-only mapping of a whole file.
///
/// The mapping is released when the value is dropped, whatever path the
/// caller leaves by. The file handle is closed as soon as the mapping exists.
pub struct MappedFile<'m> {
    map: Mmap,
    metrics: &'m SearchMetrics,
}

impl<'m> MappedFile<'m> {
    pub fn open(path: &Path, metrics: &'m SearchMetrics) -> Result<Self> {
        let file = File::open(path).map_err(|e| SearchError::from_io(path, e))?;
        // SAFETY: the mapping is read-only and never outlives this value. A file
        // truncated by another process while mapped can still fault, which is
        // the accepted cost of scanning without copying.
        let map = unsafe { Mmap::map(&file) }.map_err(|e| SearchError::from_io(path, e))?;
        metrics.record_mmap(map.len() as u64);
        Ok(Self { map, metrics })
    }
}

impl Deref for MappedFile<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.map
    }
}

impl Drop for MappedFile<'_> {
    fn drop(&mut self) {
        self.metrics.record_munmap(self.map.len() as u64);
    }
}

/// Matches single files against a compiled pattern
#[derive(Debug)]
pub struct FileProcessor<'m> {
    matcher: PatternMatcher,
    limits: SizeLimits,
    metrics: &'m SearchMetrics,
}

impl<'m> FileProcessor<'m> {
    pub fn new(matcher: PatternMatcher, limits: SizeLimits, metrics: &'m SearchMetrics) -> Self {
        Self {
            matcher,
            limits,
            metrics,
        }
    }

    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    /// Scans one file, returning a result when its bytes match.
    ///
    /// Files outside the size window, files that cannot be stat'ed, opened or
    /// mapped, and empty files all yield `None`.
    pub fn process_file(&self, path: &Path) -> Option<SearchResult> {
        trace!("Processing file: {}", path.display());

        let size = match fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                trace!("Cannot stat {}: {}", path.display(), e);
                self.metrics.record_failed();
                return None;
            }
        };
        if !self.limits.contains(size) {
            self.metrics.record_skipped();
            return None;
        }
        if size == 0 {
            return None;
        }

        let mapped = match MappedFile::open(path, self.metrics) {
            Ok(mapped) => mapped,
            Err(e) => {
                trace!("Skipping {}: {}", path.display(), e);
                self.metrics.record_failed();
                return None;
            }
        };
        self.metrics.record_scanned();

        if !self.matcher.is_match(&mapped) {
            return None;
        }

        self.metrics.record_match();
        Some(SearchResult::new(path, build_preview(&mapped)))
    }
}

/// Single-line excerpt of the first [`PREVIEW_WINDOW`] bytes.
///
/// A NUL byte anywhere in the window marks the content as binary.
pub fn build_preview(bytes: &[u8]) -> String {
    let window = &bytes[..bytes.len().min(PREVIEW_WINDOW)];
    if window.contains(&0) {
        return BINARY_PREVIEW.to_string();
    }

    let flattened: Vec<u8> = window
        .iter()
        .map(|&b| if b == b'\r' || b == b'\n' { b' ' } else { b })
        .collect();
    String::from_utf8_lossy(&flattened).into_owned()
}
