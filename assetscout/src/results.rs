//! Result and progress types produced by a search session, plus the
//! mutex-guarded store that aggregates matches for the current session.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Line indicator attached to every match.
///
/// Matching is whole-file, so this is a fixed marker rather than a line number.
pub const MATCH_LINE_SENTINEL: usize = 1;

/// A single matching file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Path of the matching file, as produced by directory traversal
    pub path: PathBuf,
    /// Single-line text excerpt, or a fixed marker for binary content
    pub preview: String,
    /// Always [`MATCH_LINE_SENTINEL`]
    pub line_number: usize,
}

impl SearchResult {
    pub fn new(path: impl Into<PathBuf>, preview: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            preview: preview.into(),
            line_number: MATCH_LINE_SENTINEL,
        }
    }

    /// File name component of the path, lossily converted
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// What a [`ProgressEvent`] reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressKind {
    /// Normal progress; `total` may still be 0 for an empty root
    Status,
    /// An invalid pattern or an unusable root; `message` carries the text
    Diagnostic,
}

/// A progress notification.
///
/// `total == 0` marks an indeterminate or error state. Diagnostics always have
/// `total == 0`, but so does the status event for a root with no files, so
/// front-ends should check [`kind`](Self::kind) rather than the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub message: String,
    pub current: usize,
    pub total: usize,
    pub kind: ProgressKind,
}

impl ProgressEvent {
    pub fn new(message: impl Into<String>, current: usize, total: usize) -> Self {
        Self {
            message: message.into(),
            current,
            total,
            kind: ProgressKind::Status,
        }
    }

    /// A diagnostic event with no determinate progress
    pub fn diagnostic(message: impl Into<String>) -> Self {
        Self {
            kind: ProgressKind::Diagnostic,
            ..Self::new(message, 0, 0)
        }
    }

    pub fn is_diagnostic(&self) -> bool {
        self.kind == ProgressKind::Diagnostic
    }
}

/// Append-only, insertion-ordered store of matches for one session.
///
/// No deduplication happens here; the same path can only appear twice if the
/// caller passes overlapping roots.
#[derive(Debug, Default)]
pub struct ResultStore {
    results: Mutex<Vec<SearchResult>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, result: SearchResult) {
        self.lock().push(result);
    }

    /// Copy of everything collected so far
    pub fn snapshot(&self) -> Vec<SearchResult> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panicking result callback must not poison the store for later sessions.
    fn lock(&self) -> MutexGuard<'_, Vec<SearchResult>> {
        self.results
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_result_defaults() {
        let result = SearchResult::new("/assets/AWeapon.uasset", "Binary content match");
        assert_eq!(result.line_number, MATCH_LINE_SENTINEL);
        assert_eq!(result.file_name(), "AWeapon.uasset");
    }

    #[test]
    fn test_diagnostic_progress() {
        let event = ProgressEvent::diagnostic("Directory not found: /nope");
        assert!(event.is_diagnostic());
        assert_eq!(event.current, 0);

        assert_eq!(event.total, 0);

        let event = ProgressEvent::new("Processing files...", 10, 40);
        assert!(!event.is_diagnostic());

        // An empty root reports total 0 without being a diagnostic
        let event = ProgressEvent::new("Searching in: /empty", 0, 0);
        assert!(!event.is_diagnostic());
        assert_eq!(event.kind, ProgressKind::Status);
    }

    #[test]
    fn test_store_keeps_insertion_order_and_duplicates() {
        let store = ResultStore::new();
        store.push(SearchResult::new("a.txt", "foo"));
        store.push(SearchResult::new("b.txt", "foo"));
        store.push(SearchResult::new("a.txt", "foo"));

        let names: Vec<_> = store.snapshot().iter().map(|r| r.file_name()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "a.txt"]);

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_concurrent_push() {
        let store = Arc::new(ResultStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..100 {
                        store.push(SearchResult::new(format!("{t}_{i}.txt"), ""));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 800);
    }
}
