use std::sync::mpsc::Sender;

use crate::results::{ProgressEvent, SearchResult};

/// Receives progress and results while a session runs.
///
/// Both methods are called from arbitrary worker threads, possibly at the
/// same time, so implementations must be internally synchronized. Each match
/// is delivered exactly once; no ordering holds across files or roots.
pub trait SearchListener: Sync {
    fn on_progress(&self, _event: &ProgressEvent) {}

    fn on_result(&self, _result: &SearchResult) {}
}

/// Discards every event
impl SearchListener for () {}

/// Adapts a pair of closures into a [`SearchListener`]
pub struct Callbacks<P, R> {
    progress: P,
    result: R,
}

impl<P, R> Callbacks<P, R>
where
    P: Fn(&ProgressEvent) + Sync,
    R: Fn(&SearchResult) + Sync,
{
    pub fn new(progress: P, result: R) -> Self {
        Self { progress, result }
    }
}

impl<P, R> SearchListener for Callbacks<P, R>
where
    P: Fn(&ProgressEvent) + Sync,
    R: Fn(&SearchResult) + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) {
        (self.progress)(event)
    }

    fn on_result(&self, result: &SearchResult) {
        (self.result)(result)
    }
}

/// Event form used when a session is consumed through a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    Progress(ProgressEvent),
    Result(SearchResult),
}

/// Forwards events into a channel; a disconnected receiver is ignored.
impl SearchListener for Sender<SearchEvent> {
    fn on_progress(&self, event: &ProgressEvent) {
        let _ = self.send(SearchEvent::Progress(event.clone()));
    }

    fn on_result(&self, result: &SearchResult) {
        let _ = self.send(SearchEvent::Result(result.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;

    #[test]
    fn test_callbacks_dispatch() {
        let progress = AtomicUsize::new(0);
        let results = AtomicUsize::new(0);
        let listener = Callbacks::new(
            |_: &ProgressEvent| {
                progress.fetch_add(1, Ordering::Relaxed);
            },
            |_: &SearchResult| {
                results.fetch_add(1, Ordering::Relaxed);
            },
        );

        listener.on_progress(&ProgressEvent::new("Processing files...", 1, 2));
        listener.on_result(&SearchResult::new("a.txt", "foo"));
        listener.on_result(&SearchResult::new("b.txt", "foo"));

        assert_eq!(progress.load(Ordering::Relaxed), 1);
        assert_eq!(results.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_channel_listener() {
        let (tx, rx) = mpsc::channel();
        tx.on_result(&SearchResult::new("a.txt", "foo"));
        tx.on_progress(&ProgressEvent::diagnostic("done"));
        drop(tx);

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(
            events,
            vec![
                SearchEvent::Result(SearchResult::new("a.txt", "foo")),
                SearchEvent::Progress(ProgressEvent::diagnostic("done")),
            ]
        );
    }

    #[test]
    fn test_disconnected_channel_is_ignored() {
        let (tx, rx) = mpsc::channel::<SearchEvent>();
        drop(rx);
        tx.on_result(&SearchResult::new("a.txt", "foo"));
    }
}
