//! Presentation-side helpers layered over engine output.
//!
//! The engine itself never deduplicates or filters; these helpers implement
//! the conventions front-ends use: projecting results to file names, hiding
//! repeated names, narrowing by a live substring filter, and turning a class
//! name into a search pattern.

use std::borrow::Cow;

use crate::results::SearchResult;

/// Leading letters used as type prefixes in class names (`AActor`, `UObject`, ...)
pub const TYPE_PREFIXES: [char; 7] = ['A', 'U', 'F', 'S', 'T', 'E', 'I'];

/// Drops a class-type prefix from `name`.
///
/// The prefix is removed only when the base name (extension excluded) starts
/// with one of [`TYPE_PREFIXES`] followed by another upper-case letter. The
/// extension, if any, is kept.
///
/// ```
/// use assetscout::filters::strip_type_prefix;
/// assert_eq!(strip_type_prefix("AWeapon"), "Weapon");
/// assert_eq!(strip_type_prefix("UHealth.uasset"), "Health.uasset");
/// assert_eq!(strip_type_prefix("Apple"), "Apple");
/// ```
pub fn strip_type_prefix(name: &str) -> Cow<'_, str> {
    let (base, extension) = match name.rfind('.') {
        Some(dot) => name.split_at(dot),
        None => (name, ""),
    };

    let mut chars = base.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second))
            if TYPE_PREFIXES.contains(&first) && second.is_uppercase() =>
        {
            Cow::Owned(format!("{}{}", &base[first.len_utf8()..], extension))
        }
        _ => Cow::Borrowed(name),
    }
}

/// Deduplicated, filterable list of matched file names
#[derive(Debug, Clone, Default)]
pub struct FileNameView {
    names: Vec<String>,
    filter: String,
}

impl FileNameView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the result's file name; returns false if the name was already present
    pub fn push(&mut self, result: &SearchResult) -> bool {
        let name = result.file_name();
        if self.names.contains(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    /// Sets the case-insensitive substring filter; empty shows everything
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into().to_lowercase();
    }

    /// Names passing the current filter, in arrival order
    pub fn visible(&self) -> Vec<&str> {
        self.names
            .iter()
            .filter(|name| self.filter.is_empty() || name.to_lowercase().contains(&self.filter))
            .map(String::as_str)
            .collect()
    }

    /// Every distinct name seen, ignoring the filter
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn clear(&mut self) {
        self.names.clear();
        self.filter.clear();
    }
}
