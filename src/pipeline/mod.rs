//! Pipeline stages for document analysis.
//!
//! Each submodule implements exactly one transformation step, so every
//! stage is testable on its own and the analysis backend can be swapped
//! without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ preprocess ──▶ analyzer ──▶ normalize
//! (path/URL)  (resize)     (service)    (block graph → DocumentResult)
//! ```
//!
//! 1. [`input`]      — read the user-supplied path or URL into a buffer
//! 2. [`preprocess`] — fit images inside the pixel envelope; runs in
//!    `spawn_blocking` because decoding and resampling are CPU-bound
//! 3. [`analyzer`]   — the document-analysis call; the only stage with
//!    network I/O besides URL downloads
//! 4. [`normalize`]  — deterministic conversion of the block graph into
//!    text lines, dense tables and form fields

pub mod analyzer;
pub mod input;
pub mod normalize;
pub mod preprocess;
#[cfg(feature = "textract")]
pub mod textract;
