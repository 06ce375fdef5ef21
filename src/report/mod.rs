//! Report rendering: a batch of [`DocumentResult`]s → one downloadable payload.
//!
//! Two selectors choose the rendering:
//!
//! | `format` \ `extraction` | `text` | `table` | `forms` | `all` |
//! |---|---|---|---|---|
//! | `txt` ([`ReportFormat::Plain`]) | [`plain::text`] | [`plain::tables`] | [`plain::forms`] | [`plain::all`] |
//! | `csv` ([`ReportFormat::Delimited`]) | [`delimited::text`] | [`delimited::tables`] | [`delimited::forms`] | [`delimited::all`] |
//!
//! Each cell of the table is an independent renderer function; [`renderer`]
//! is the only place that knows the mapping. A failed document always
//! renders as a single error line, whatever the selectors.

pub mod delimited;
pub mod plain;

use crate::error::ReportError;
use crate::output::DocumentResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output file format, selected by the `format` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable text with padded table columns (`txt`, default).
    #[default]
    Plain,
    /// Comma-separated values (`csv`).
    Delimited,
}

impl ReportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ReportFormat::Plain => "text/plain",
            ReportFormat::Delimited => "text/csv",
        }
    }

    /// Suggested download file name.
    pub fn file_name(self) -> &'static str {
        match self {
            ReportFormat::Plain => "analysis_results.txt",
            ReportFormat::Delimited => "analysis_results.csv",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Plain => "txt",
            ReportFormat::Delimited => "csv",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" | "plain" => Ok(ReportFormat::Plain),
            "csv" | "delimited" => Ok(ReportFormat::Delimited),
            other => Err(ReportError::InvalidSelector {
                kind: "format",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Which facet of each document to render, selected by `extractionType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionType {
    /// Extracted lines (default).
    #[default]
    Text,
    /// Reconstructed tables.
    Table,
    /// Key/value form fields.
    Forms,
    /// Text, tables and forms together.
    All,
}

impl FromStr for ExtractionType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ExtractionType::Text),
            "table" | "tables" => Ok(ExtractionType::Table),
            "form" | "forms" => Ok(ExtractionType::Forms),
            "all" => Ok(ExtractionType::All),
            other => Err(ReportError::InvalidSelector {
                kind: "extraction type",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExtractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExtractionType::Text => "text",
            ExtractionType::Table => "table",
            ExtractionType::Forms => "forms",
            ExtractionType::All => "all",
        })
    }
}

/// A rendered report plus the metadata the serving layer needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub format: ReportFormat,
    pub extraction: ExtractionType,
    pub body: String,
}

impl Report {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    pub fn file_name(&self) -> &'static str {
        self.format.file_name()
    }
}

/// Signature shared by every renderer.
pub type Renderer = fn(&[DocumentResult]) -> Result<String, ReportError>;

/// The renderer for one `format × extraction` combination.
pub fn renderer(format: ReportFormat, extraction: ExtractionType) -> Renderer {
    match (format, extraction) {
        (ReportFormat::Plain, ExtractionType::Text) => plain::text,
        (ReportFormat::Plain, ExtractionType::Table) => plain::tables,
        (ReportFormat::Plain, ExtractionType::Forms) => plain::forms,
        (ReportFormat::Plain, ExtractionType::All) => plain::all,
        (ReportFormat::Delimited, ExtractionType::Text) => delimited::text,
        (ReportFormat::Delimited, ExtractionType::Table) => delimited::tables,
        (ReportFormat::Delimited, ExtractionType::Forms) => delimited::forms,
        (ReportFormat::Delimited, ExtractionType::All) => delimited::all,
    }
}

/// Render `results` (expected in `index` order) into a [`Report`].
pub fn render_report(
    results: &[DocumentResult],
    format: ReportFormat,
    extraction: ExtractionType,
) -> Result<Report, ReportError> {
    let body = renderer(format, extraction)(results)?;
    Ok(Report {
        format,
        extraction,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocumentError;
    use crate::output::ExtractedContent;

    #[test]
    fn parse_format_selector() {
        assert_eq!("txt".parse::<ReportFormat>().unwrap(), ReportFormat::Plain);
        assert_eq!("CSV".parse::<ReportFormat>().unwrap(), ReportFormat::Delimited);
        assert!("xlsx".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn parse_extraction_selector() {
        assert_eq!("text".parse::<ExtractionType>().unwrap(), ExtractionType::Text);
        assert_eq!("table".parse::<ExtractionType>().unwrap(), ExtractionType::Table);
        assert_eq!("forms".parse::<ExtractionType>().unwrap(), ExtractionType::Forms);
        assert_eq!("all".parse::<ExtractionType>().unwrap(), ExtractionType::All);
        assert!("images".parse::<ExtractionType>().is_err());
    }

    #[test]
    fn defaults_are_plain_text() {
        assert_eq!(ReportFormat::default(), ReportFormat::Plain);
        assert_eq!(ExtractionType::default(), ExtractionType::Text);
    }

    #[test]
    fn report_metadata() {
        let report = render_report(&[], ReportFormat::Delimited, ExtractionType::Text).unwrap();
        assert_eq!(report.content_type(), "text/csv");
        assert_eq!(report.file_name(), "analysis_results.csv");
        assert_eq!(ReportFormat::Plain.file_name(), "analysis_results.txt");
        assert_eq!(ReportFormat::Plain.content_type(), "text/plain");
    }

    #[test]
    fn error_short_circuits_every_combination() {
        let results = vec![DocumentResult::failed(
            1,
            DocumentError::AnalysisFailed {
                index: 1,
                detail: "rate limited".into(),
            },
        )];
        for format in [ReportFormat::Plain, ReportFormat::Delimited] {
            for extraction in [
                ExtractionType::Text,
                ExtractionType::Table,
                ExtractionType::Forms,
                ExtractionType::All,
            ] {
                let body = renderer(format, extraction)(&results).unwrap();
                assert!(body.contains("Error: Analysis failed: rate limited"), "{format}/{extraction}: {body}");
                assert!(!body.contains("No text extracted"), "{format}/{extraction}");
                assert!(!body.contains("No tables found"), "{format}/{extraction}");
            }
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let results = vec![DocumentResult::extracted(
            1,
            ExtractedContent {
                text: vec!["x".into()],
                ..Default::default()
            },
        )];
        let a = render_report(&results, ReportFormat::Plain, ExtractionType::All).unwrap();
        let b = render_report(&results, ReportFormat::Plain, ExtractionType::All).unwrap();
        assert_eq!(a, b);
    }
}
