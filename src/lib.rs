//! # scan2report
//!
//! Turn scanned document images into plain-text or CSV reports using a
//! document-analysis service (AWS Textract or any endpoint speaking its
//! JSON protocol).
//!
//! The service answers with a flat graph of blocks (pages, lines, words,
//! table cells, key/value sets) linked by id. This crate walks that graph
//! into three facets per document: reading-order text lines, dense
//! rectangular tables and key/value form fields. It then renders the
//! requested facet for every document into a single report.
//!
//! ## Pipeline Overview
//!
//! ```text
//! images
//!  │
//!  ├─ 1. Input       in-memory buffers, local paths or URLs
//!  ├─ 2. Preprocess  fit inside 1500×1500 (CPU-bound, spawn_blocking)
//!  ├─ 3. Analyze     concurrent service calls, one per document
//!  ├─ 4. Normalize   block graph → text / tables / forms
//!  └─ 5. Report      plain text or CSV, documents in input order
//! ```
//!
//! A failure in any stage is confined to its document: the report shows an
//! error entry for it and every other document is rendered normally.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scan2report::{analyze_documents, AnalysisConfig, DocumentInput, ExtractionType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AnalysisConfig::builder()
//!         .endpoint("https://textract.example.com/")
//!         .extraction(ExtractionType::Table)
//!         .build()?;
//!     let scan = DocumentInput::new("invoice.png", std::fs::read("invoice.png")?);
//!     let output = analyze_documents(vec![scan], &config).await?;
//!     print!("{}", output.report.body);
//!     eprintln!("{}/{} documents analysed",
//!         output.stats.succeeded,
//!         output.stats.total_documents);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature    | Default | Description |
//! |------------|---------|-------------|
//! | `cli`      | on      | Enables the `scan2report` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `textract` | off     | Calls AWS Textract through the official SDK when no endpoint is configured |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! scan2report = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod graph;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze_documents, analyze_sources, analyze_sync, analyze_to_file, report_path};
pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use error::{AnalyzeError, DocumentError, ReportError};
pub use graph::forms::FormField;
pub use graph::table::{Cell, Table};
pub use graph::{AnalysisResponse, Block, BlockGraph, BlockType};
pub use output::{AnalysisOutput, AnalysisStats, DocumentResult, ExtractedContent};
pub use pipeline::analyzer::{DocumentAnalyzer, HttpAnalyzer};
pub use pipeline::input::{DocumentInput, DocumentSource};
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback};
pub use report::{render_report, ExtractionType, Report, ReportFormat};
pub use stream::{analyze_sources_stream, analyze_stream, DocumentStream};
