//! Error types for the scan2report library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`ReportError`] — **Fatal**: the batch cannot be processed or the
//!   report cannot be produced at all (no documents, analyzer not
//!   configured, output file not writable). Returned as `Err(ReportError)`
//!   from the top-level `analyze*` functions.
//!
//! * [`DocumentError`] — **Non-fatal**: a single document failed (empty
//!   upload, undecodable image, the analysis service refused it) but every
//!   other document in the batch is unaffected. Stored inside
//!   [`crate::output::DocumentResult`] and rendered as that document's
//!   error line in the report.
//!
//! * [`AnalyzeError`] — what a [`crate::pipeline::analyzer::DocumentAnalyzer`]
//!   returns when the service call fails. It is always folded into a
//!   [`DocumentError::AnalysisFailed`] before leaving the pipeline.
//!
//! Malformed analysis graphs (dangling block ids, cells without indices)
//! are deliberately *not* represented here: they are skipped and logged so
//! partial structured data still reaches the report.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the scan2report library.
///
/// Document-level failures use [`DocumentError`] and are stored in
/// [`crate::output::DocumentResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ReportError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The batch contained no documents.
    #[error("No files uploaded")]
    NoDocuments,

    /// The batch exceeded the configured document limit.
    #[error("Too many documents: {count} supplied, at most {max} allowed per batch")]
    TooManyDocuments { count: usize, max: usize },

    /// A `format` or `extractionType` selector was not recognised.
    #[error("Unknown {kind} '{value}'")]
    InvalidSelector { kind: &'static str, value: String },

    // ── Analyzer errors ───────────────────────────────────────────────────
    /// No analysis service could be configured.
    #[error("Document analyzer is not configured.\n{hint}")]
    AnalyzerNotConfigured { hint: String },

    /// Some documents succeeded but at least one failed.
    ///
    /// Returned by [`crate::output::AnalysisOutput::into_result`] when
    /// the caller wants to treat any document failure as an error.
    #[error("{failed}/{total} documents failed during analysis")]
    PartialFailure {
        success: usize,
        failed: usize,
        total: usize,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Delimited encoding of a report row failed.
    #[error("Failed to encode delimited report: {0}")]
    Encoding(String),

    /// Could not create or write the report file.
    #[error("Failed to write report file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<csv::Error> for ReportError {
    fn from(e: csv::Error) -> Self {
        ReportError::Encoding(e.to_string())
    }
}

/// A non-fatal error for a single document.
///
/// The index is the document's 1-based position in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The document buffer was missing, empty, or could not be read.
    #[error("Invalid document {index}: {detail}")]
    InvalidInput { index: usize, detail: String },

    /// The image could not be decoded or resized before submission.
    #[error("Image preprocessing failed: {detail}")]
    PreprocessFailed { index: usize, detail: String },

    /// The analysis service call failed. Never retried.
    #[error("Analysis failed: {detail}")]
    AnalysisFailed { index: usize, detail: String },

    /// The analysis service did not answer in time.
    #[error("Analysis timed out after {secs}s")]
    Timeout { index: usize, secs: u64 },
}

impl DocumentError {
    /// 1-based index of the document this error belongs to.
    pub fn index(&self) -> usize {
        match self {
            DocumentError::InvalidInput { index, .. }
            | DocumentError::PreprocessFailed { index, .. }
            | DocumentError::AnalysisFailed { index, .. }
            | DocumentError::Timeout { index, .. } => *index,
        }
    }
}

/// Failure of a single call to the document-analysis service.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body was not a valid analysis result.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The service reported an error of its own (SDK error, throttling).
    #[error("{0}")]
    Service(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_display() {
        let e = ReportError::PartialFailure {
            success: 3,
            failed: 1,
            total: 4,
        };
        let msg = e.to_string();
        assert!(msg.contains("1/4"), "got: {msg}");
    }

    #[test]
    fn no_documents_display() {
        assert_eq!(ReportError::NoDocuments.to_string(), "No files uploaded");
    }

    #[test]
    fn invalid_selector_display() {
        let e = ReportError::InvalidSelector {
            kind: "format",
            value: "xlsx".into(),
        };
        assert_eq!(e.to_string(), "Unknown format 'xlsx'");
    }

    #[test]
    fn analysis_failed_keeps_upstream_message() {
        let e = DocumentError::AnalysisFailed {
            index: 2,
            detail: AnalyzeError::Service("rate limited".into()).to_string(),
        };
        assert!(e.to_string().contains("rate limited"));
        assert_eq!(e.index(), 2);
    }

    #[test]
    fn http_error_display() {
        let e = AnalyzeError::Http {
            status: 429,
            body: "ThrottlingException".into(),
        };
        assert_eq!(e.to_string(), "HTTP 429: ThrottlingException");
    }

    #[test]
    fn timeout_display() {
        let e = DocumentError::Timeout { index: 1, secs: 30 };
        assert!(e.to_string().contains("30s"));
        assert_eq!(e.index(), 1);
    }
}
