//! Progress-callback trait for per-part summarization events.
//!
//! Inject an [`Arc<dyn SummaryProgressCallback>`] via
//! [`crate::config::SummaryConfigBuilder::progress_callback`] to receive
//! events as the orchestrator works through the transcript's parts. The CLI
//! drives its progress bar from these events; library users can forward them
//! to a channel, a log or a UI.
//!
//! # Example
//!
//! ```rust
//! use lesson_summarizer::{SummaryProgressCallback, SummaryConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl SummaryProgressCallback for CountingCallback {
//!     fn on_part_complete(&self, part: usize, total: usize, markdown_len: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Part {}/{} done ({} bytes)", part, total, markdown_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = SummaryConfig::builder()
//!     .progress_callback(counter as Arc<dyn SummaryProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the orchestrator as it processes each part.
///
/// All methods default to no-ops. Implementations must be `Send + Sync`:
/// with `concurrency > 1` part events arrive from concurrent futures.
pub trait SummaryProgressCallback: Send + Sync {
    /// Called once after chunking, before the first completion call.
    fn on_summary_start(&self, total_parts: usize) {
        let _ = total_parts;
    }

    /// Called just before the completion request for a part is sent.
    ///
    /// `part` is 1-indexed.
    fn on_part_start(&self, part: usize, total_parts: usize) {
        let _ = (part, total_parts);
    }

    /// Called when a part's Markdown is ready.
    fn on_part_complete(&self, part: usize, total_parts: usize, markdown_len: usize) {
        let _ = (part, total_parts, markdown_len);
    }

    /// Called when a part fails. The run aborts right after.
    fn on_part_error(&self, part: usize, total_parts: usize, error: &str) {
        let _ = (part, total_parts, error);
    }

    /// Called once after every part succeeded.
    fn on_summary_complete(&self, total_parts: usize) {
        let _ = total_parts;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl SummaryProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SummaryConfig`].
pub type ProgressCallback = Arc<dyn SummaryProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        total: AtomicUsize,
    }

    impl SummaryProgressCallback for TrackingCallback {
        fn on_summary_start(&self, total_parts: usize) {
            self.total.store(total_parts, Ordering::SeqCst);
        }

        fn on_part_start(&self, _part: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_part_complete(&self, _part: usize, _total: usize, _len: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_part_error(&self, _part: usize, _total: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_summary_start(3);
        cb.on_part_start(1, 3);
        cb.on_part_complete(1, 3, 42);
        cb.on_part_error(2, 3, "quota");
        cb.on_summary_complete(3);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_summary_start(2);
        tracker.on_part_start(1, 2);
        tracker.on_part_complete(1, 2, 100);
        tracker.on_part_start(2, 2);
        tracker.on_part_error(2, 2, "timeout");

        assert_eq!(tracker.total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_summary_start(10);
        cb.on_part_complete(1, 10, 512);
    }
}
