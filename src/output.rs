//! Result types produced by an analysis batch.
//!
//! A [`DocumentResult`] is either extracted content or an error, never
//! both: the two states are variants of [`DocumentOutcome`] rather than a
//! pair of optional fields, so a half-filled record cannot be built.

use crate::error::{DocumentError, ReportError};
use crate::graph::forms::FormField;
use crate::graph::table::Table;
use crate::report::Report;
use serde::{Deserialize, Serialize, Serializer};

/// Normalised content of one successfully analysed document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContent {
    /// LINE texts in reading order.
    pub text: Vec<String>,
    /// Non-empty reconstructed tables, in block order.
    pub tables: Vec<Table>,
    /// Complete key/value pairs.
    pub forms: Vec<FormField>,
}

impl ExtractedContent {
    /// Lines joined with `\n`.
    pub fn joined_text(&self) -> String {
        self.text.join("\n")
    }

    /// True when at least one line carries text. Lines without text count as `""`.
    pub fn has_text(&self) -> bool {
        self.text.iter().any(|line| !line.is_empty())
    }

    /// True when nothing at all was detected.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.tables.is_empty() && self.forms.is_empty()
    }
}

/// Success or failure of one document.
///
/// A failure serialises as `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DocumentOutcome {
    Extracted(ExtractedContent),
    Failed {
        #[serde(serialize_with = "error_message")]
        error: DocumentError,
    },
}

fn error_message<S: Serializer>(error: &DocumentError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// The per-document record the report is rendered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentResult {
    /// 1-based position of the document in the batch.
    pub index: usize,
    #[serde(flatten)]
    pub outcome: DocumentOutcome,
}

impl DocumentResult {
    pub fn extracted(index: usize, content: ExtractedContent) -> Self {
        Self {
            index,
            outcome: DocumentOutcome::Extracted(content),
        }
    }

    pub fn failed(index: usize, error: DocumentError) -> Self {
        Self {
            index,
            outcome: DocumentOutcome::Failed { error },
        }
    }

    pub fn content(&self) -> Option<&ExtractedContent> {
        match &self.outcome {
            DocumentOutcome::Extracted(content) => Some(content),
            DocumentOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&DocumentError> {
        match &self.outcome {
            DocumentOutcome::Extracted(_) => None,
            DocumentOutcome::Failed { error } => Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.content().is_some()
    }
}

/// Counters and timings for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub total_documents: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_lines: usize,
    pub total_tables: usize,
    pub total_forms: usize,
    pub total_duration_ms: u64,
    pub analysis_duration_ms: u64,
}

impl AnalysisStats {
    /// Tally counters over `results`; durations are left at zero.
    pub fn from_results(results: &[DocumentResult]) -> Self {
        let mut stats = Self {
            total_documents: results.len(),
            ..Self::default()
        };
        for result in results {
            match result.content() {
                Some(content) => {
                    stats.succeeded += 1;
                    stats.total_lines += content.text.len();
                    stats.total_tables += content.tables.len();
                    stats.total_forms += content.forms.len();
                }
                None => stats.failed += 1,
            }
        }
        stats
    }
}

/// Everything a batch produced: per-document records, the rendered report,
/// and stats.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    /// One record per input document, ordered by `index`.
    pub results: Vec<DocumentResult>,
    pub report: Report,
    pub stats: AnalysisStats,
}

impl AnalysisOutput {
    /// Turn any failed document into [`ReportError::PartialFailure`].
    pub fn into_result(self) -> Result<Self, ReportError> {
        if self.stats.failed > 0 {
            return Err(ReportError::PartialFailure {
                success: self.stats.succeeded,
                failed: self.stats.failed,
                total: self.stats.total_documents,
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> ExtractedContent {
        ExtractedContent {
            text: vec!["a".into(), "b".into()],
            tables: vec![],
            forms: vec![FormField::new("k", "v")],
        }
    }

    #[test]
    fn success_and_error_are_exclusive() {
        let ok = DocumentResult::extracted(1, content());
        assert!(ok.is_ok());
        assert!(ok.error().is_none());

        let err = DocumentResult::failed(
            2,
            DocumentError::AnalysisFailed {
                index: 2,
                detail: "boom".into(),
            },
        );
        assert!(!err.is_ok());
        assert!(err.content().is_none());
    }

    #[test]
    fn serialises_flat_records() {
        let ok = serde_json::to_value(DocumentResult::extracted(1, content())).unwrap();
        assert_eq!(ok["index"], 1);
        assert_eq!(ok["text"][1], "b");
        assert_eq!(ok["forms"][0]["key"], "k");
        assert!(ok.get("error").is_none());

        let err = serde_json::to_value(DocumentResult::failed(
            2,
            DocumentError::Timeout { index: 2, secs: 5 },
        ))
        .unwrap();
        assert_eq!(err["index"], 2);
        assert_eq!(err["error"], "Analysis timed out after 5s");
        assert!(err.get("text").is_none());
    }

    #[test]
    fn stats_tally() {
        let results = vec![
            DocumentResult::extracted(1, content()),
            DocumentResult::failed(2, DocumentError::Timeout { index: 2, secs: 5 }),
        ];
        let stats = AnalysisStats::from_results(&results);
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.total_lines, 2);
        assert_eq!(stats.total_forms, 1);
    }

    #[test]
    fn joined_text() {
        assert_eq!(content().joined_text(), "a\nb");
        assert!(ExtractedContent::default().is_empty());
    }

    #[test]
    fn blank_lines_are_not_text() {
        let blank = ExtractedContent {
            text: vec![String::new(), String::new()],
            ..ExtractedContent::default()
        };
        assert!(!blank.has_text());
        assert!(content().has_text());
    }
}
