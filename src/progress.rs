//! Progress-callback trait for per-item batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::ConvertConfigBuilder::progress_callback`] to receive
//! events as the batch loop processes each file.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers
//! can forward events to a terminal progress bar, a web-socket, or a UI
//! widget without the library knowing anything about how the host
//! application communicates. The trait is `Send + Sync` so the same
//! callback can be shared between threads even though the batch loop
//! itself is strictly sequential.
//!
//! # Example
//!
//! ```rust
//! use omniconv::{BatchProgressCallback, ConvertConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl BatchProgressCallback for CountingCallback {
//!     fn on_item_complete(&self, index: usize, total: usize, name: &str, output_bytes: usize) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{done}/{total} done: {name} ({output_bytes} bytes)");
//!         let _ = index;
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ConvertConfig::builder()
//!     .progress_callback(counter as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the batch loop as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Items are processed strictly in input order, so
/// events for item `i` always arrive before events for item `i + 1`.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before any file is converted.
    ///
    /// # Arguments
    /// * `total_items` — number of files that will be processed
    fn on_batch_start(&self, total_items: usize) {
        let _ = total_items;
    }

    /// Called just before a file's conversion begins.
    ///
    /// # Arguments
    /// * `index` — 0-indexed position in the input list
    /// * `total` — total files in the batch
    /// * `name`  — original file name
    fn on_item_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Called when a file converts successfully.
    ///
    /// # Arguments
    /// * `output_bytes` — size of the converted blob
    fn on_item_complete(&self, index: usize, total: usize, name: &str, output_bytes: usize) {
        let _ = (index, total, name, output_bytes);
    }

    /// Called when a file fails; the batch continues with the next file.
    ///
    /// # Arguments
    /// * `error` — human-readable failure description
    fn on_item_error(&self, index: usize, total: usize, name: &str, error: &str) {
        let _ = (index, total, name, error);
    }

    /// Called once after every file has been attempted.
    ///
    /// # Arguments
    /// * `total_items`   — files in the batch
    /// * `success_count` — files that converted without error
    fn on_batch_complete(&self, total_items: usize, success_count: usize) {
        let _ = (total_items, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConvertConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
