//! Concurrent content search.
//!
//! A session flows through these pieces, leaves first:
//!
//! 1. [`matcher`] compiles the pattern into a case-insensitive byte matcher.
//! 2. [`collector`] walks one root into a flat list of regular files.
//! 3. [`scheduler`] splits that list into contiguous batches and runs one
//!    rayon task per batch, throttling progress reports.
//! 4. [`processor`] checks each file's size, maps it read-only, runs the
//!    matcher and builds a preview. The mapping is released on every path.
//! 5. Matches land in the session's [`ResultStore`](crate::results::ResultStore)
//!    and are streamed to the caller's [`SearchListener`].
//!
//! [`engine`] ties these together: it owns the per-session state, spawns one
//! task per root on a pool sized to the configured worker count, and blocks
//! until all of them finish or observe cancellation.
//!
//! Cancellation is cooperative. The [`CancellationToken`] is polled between
//! traversal steps, before each file and before each root; a file already
//! being scanned always runs to completion.

pub mod cancel;
pub mod collector;
pub mod engine;
pub mod events;
pub mod matcher;
pub mod processor;
pub mod scheduler;
pub mod session;

pub use cancel::CancellationToken;
pub use engine::{SearchEngine, SessionOutcome};
pub use events::{Callbacks, SearchEvent, SearchListener};
pub use matcher::PatternMatcher;
pub use processor::FileProcessor;
pub use session::ProgressSnapshot;
