//! Progress-callback trait for per-document analysis events.
//!
//! Inject an [`Arc<dyn AnalysisProgressCallback>`] via
//! [`crate::config::AnalysisConfigBuilder::progress_callback`] to receive
//! events as the pipeline settles each document. Callers can forward them
//! to a progress bar, a channel or a log without the library knowing how
//! the host application communicates.
//!
//! # Example
//!
//! ```rust
//! use scan2report::{AnalysisProgressCallback, AnalysisConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     settled: AtomicUsize,
//! }
//!
//! impl AnalysisProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, index: usize, total: usize, lines: usize) {
//!         self.settled.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Document {}/{} done ({} lines)", index, total, lines);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { settled: AtomicUsize::new(0) });
//!
//! let config = AnalysisConfig::builder()
//!     .progress_callback(counter as Arc<dyn AnalysisProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as it processes each document.
///
/// Documents are processed concurrently, so `on_document_*` may be called
/// from several threads at once. All methods default to no-ops.
pub trait AnalysisProgressCallback: Send + Sync {
    /// Called once before any document is processed.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called when a document's task starts.
    ///
    /// # Arguments
    /// * `index` — 1-based document index
    /// * `total` — documents in the batch
    fn on_document_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when a document was analysed successfully.
    ///
    /// # Arguments
    /// * `lines` — number of text lines extracted
    fn on_document_complete(&self, index: usize, total: usize, lines: usize) {
        let _ = (index, total, lines);
    }

    /// Called when a document failed.
    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after every document has settled.
    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let _ = (total, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AnalysisConfig`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;
