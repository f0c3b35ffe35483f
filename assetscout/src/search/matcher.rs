use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::bytes::{Regex, RegexBuilder};
use std::sync::Arc;
use tracing::debug;

use crate::errors::{Result, SearchError};
use crate::metrics::SearchMetrics;

/// Compiled patterns kept process-wide; the cache is emptied once it reaches this size
pub const MAX_CACHED_PATTERNS: usize = 256;

static PATTERN_CACHE: Lazy<DashMap<String, Arc<Regex>>> = Lazy::new(DashMap::new);

/// Compiled, case-insensitive matcher over raw bytes.
///
/// Unicode mode is off: `.` and negated classes match any single byte, and
/// case folding is ASCII-only, so patterns work across non-UTF-8 content.
/// Cheap to clone and safe to share across worker threads.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pattern: String,
    regex: Arc<Regex>,
}

impl PatternMatcher {
    /// Compiles `pattern` as a case-insensitive regular expression
    pub fn new(pattern: &str) -> Result<Self> {
        Self::with_metrics(pattern, &SearchMetrics::new())
    }

    /// Compiles `pattern`, consulting the process-wide cache first
    pub fn with_metrics(pattern: &str, metrics: &SearchMetrics) -> Result<Self> {
        if let Some(entry) = PATTERN_CACHE.get(pattern) {
            metrics.record_cache_lookup(true);
            return Ok(Self {
                pattern: pattern.to_string(),
                regex: Arc::clone(entry.value()),
            });
        }

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .unicode(false)
            .build()
            .map_err(|e| SearchError::invalid_pattern(e.to_string()))?;
        let regex = Arc::new(regex);

        metrics.record_cache_lookup(false);
        debug!("Compiled pattern '{}'", pattern);
        insert_bounded(&PATTERN_CACHE, pattern, Arc::clone(&regex));

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Whether `haystack` contains a match anywhere
    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.regex.is_match(haystack)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

fn insert_bounded(cache: &DashMap<String, Arc<Regex>>, pattern: &str, regex: Arc<Regex>) {
    if cache.len() >= MAX_CACHED_PATTERNS {
        debug!("Pattern cache full, dropping {} entries", cache.len());
        cache.clear();
    }
    cache.insert(pattern.to_string(), regex);
}
