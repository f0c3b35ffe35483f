use ignore::{DirEntry, WalkBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use super::cancel::CancellationToken;

/// Recursively lists every regular file under `root`.
///
/// Nothing is filtered: hidden files and ignore files are not honored, and
/// directory symlinks are not descended. Entries that cannot be read are
/// skipped without error. When `cancel` is set the walk stops and whatever was
/// collected so far is returned.
pub fn collect_files(root: &Path, cancel: &CancellationToken) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build();

    let mut files = Vec::new();
    let mut directories = 0usize;

    for entry in walker {
        if cancel.is_cancelled() {
            debug!(
                "Collection of {} cancelled after {} files",
                root.display(),
                files.len()
            );
            break;
        }

        match entry {
            Ok(entry) if is_regular_file(&entry) => files.push(entry.into_path()),
            Ok(entry) => {
                if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    directories += 1;
                }
            }
            Err(err) => trace!("Skipping unreadable entry under {}: {}", root.display(), err),
        }
    }

    debug!(
        "Collected {} files in {} directories under {}",
        files.len(),
        directories,
        root.display()
    );
    files
}

/// Regular files, including symlinks that resolve to one.
fn is_regular_file(entry: &DirEntry) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_file() => true,
        Some(ft) if ft.is_symlink() => fs::metadata(entry.path()).is_ok_and(|m| m.is_file()),
        _ => false,
    }
}
