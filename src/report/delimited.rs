//! Comma-separated reports.
//!
//! Table and form rows quote every field and double embedded quotes, so any
//! CSV reader recovers the original cell text. Structural lines (`Image 1`,
//! `Table 2`, `Forms`) are written bare. Document blocks are separated by a
//! blank line, as are the tables inside one document.

use crate::error::ReportError;
use crate::graph::forms::FormField;
use crate::graph::table::Table;
use crate::output::{DocumentOutcome, DocumentResult, ExtractedContent};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use once_cell::sync::Lazy;
use regex::Regex;

use super::plain::{NO_FORMS, NO_TABLES};

static RE_LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\r|\n").unwrap());

/// One `Image {index},{text}` line per document, line breaks flattened to spaces.
pub fn text(results: &[DocumentResult]) -> Result<String, ReportError> {
    let lines = results
        .iter()
        .map(|result| match &result.outcome {
            DocumentOutcome::Failed { .. } => error_line(result),
            DocumentOutcome::Extracted(content) => text_line(result.index, content),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(finish(lines, "\n"))
}

/// Every table of every document as quoted rows.
pub fn tables(results: &[DocumentResult]) -> Result<String, ReportError> {
    blocks(results, |index, content| {
        let mut parts = vec![image_header(index)];
        parts.push(tables_block(&content.tables)?);
        Ok(parts.join("\n"))
    })
}

/// Every form field of every document as a quoted `key,value` row.
pub fn forms(results: &[DocumentResult]) -> Result<String, ReportError> {
    blocks(results, |index, content| {
        let mut parts = vec![image_header(index)];
        parts.push(forms_block(&content.forms)?);
        Ok(parts.join("\n"))
    })
}

/// Text line, tables and forms of every document.
pub fn all(results: &[DocumentResult]) -> Result<String, ReportError> {
    blocks(results, |index, content| {
        Ok([
            text_line(index, content)?,
            tables_block(&content.tables)?,
            format!("Forms\n{}", forms_block(&content.forms)?),
        ]
        .join("\n"))
    })
}

/// Encode `fields` as one CSV record without its line terminator.
pub fn record<I, T>(fields: I, style: QuoteStyle) -> Result<String, ReportError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(style)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(fields)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Encoding(e.to_string()))?;
    let mut line = String::from_utf8(bytes).map_err(|e| ReportError::Encoding(e.to_string()))?;
    if line.ends_with('\n') {
        line.pop();
    }
    Ok(line)
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn blocks<F>(results: &[DocumentResult], body: F) -> Result<String, ReportError>
where
    F: Fn(usize, &ExtractedContent) -> Result<String, ReportError>,
{
    let rendered = results
        .iter()
        .map(|result| match &result.outcome {
            DocumentOutcome::Failed { .. } => error_line(result),
            DocumentOutcome::Extracted(content) => body(result.index, content),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(finish(rendered, "\n\n"))
}

fn finish(parts: Vec<String>, separator: &str) -> String {
    if parts.is_empty() {
        return String::new();
    }
    let mut out = parts.join(separator);
    out.push('\n');
    out
}

fn image_header(index: usize) -> String {
    format!("Image {index}")
}

fn text_line(index: usize, content: &ExtractedContent) -> Result<String, ReportError> {
    let flat = RE_LINE_BREAKS.replace_all(&content.joined_text(), " ").into_owned();
    record([image_header(index), flat], QuoteStyle::Necessary)
}

fn error_line(result: &DocumentResult) -> Result<String, ReportError> {
    let message = match result.error() {
        Some(error) => format!("Error: {error}"),
        None => String::new(),
    };
    record([image_header(result.index), message], QuoteStyle::Necessary)
}

fn tables_block(tables: &[Table]) -> Result<String, ReportError> {
    let mut rendered = Vec::new();
    for table in tables.iter().filter(|t| !t.is_empty()) {
        let mut lines = vec![format!("Table {}", rendered.len() + 1)];
        for row in &table.rows {
            lines.push(record(row.iter().map(|c| c.text.as_str()), QuoteStyle::Always)?);
        }
        rendered.push(lines.join("\n"));
    }
    if rendered.is_empty() {
        return Ok(NO_TABLES.to_string());
    }
    Ok(rendered.join("\n\n"))
}

fn forms_block(forms: &[FormField]) -> Result<String, ReportError> {
    if forms.is_empty() {
        return Ok(NO_FORMS.to_string());
    }
    let lines = forms
        .iter()
        .map(|f| record([f.key.as_str(), f.value.as_str()], QuoteStyle::Always))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocumentError;
    use crate::graph::table::Cell;

    fn table(rows: &[&[&str]]) -> Table {
        Table {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|t| Cell::new(*t)).collect())
                .collect(),
        }
    }

    fn doc(index: usize, text: &[&str], tables: Vec<Table>, forms: Vec<FormField>) -> DocumentResult {
        DocumentResult::extracted(
            index,
            ExtractedContent {
                text: text.iter().map(|s| s.to_string()).collect(),
                tables,
                forms,
            },
        )
    }

    fn failed(index: usize, detail: &str) -> DocumentResult {
        DocumentResult::failed(
            index,
            DocumentError::AnalysisFailed {
                index,
                detail: detail.into(),
            },
        )
    }

    #[test]
    fn text_lines_flatten_newlines() {
        let out = text(&[
            doc(1, &["Invoice #12", "Due today"], vec![], vec![]),
            failed(2, "rate limited"),
        ])
        .unwrap();
        assert_eq!(
            out,
            "Image 1,Invoice #12 Due today\nImage 2,Error: Analysis failed: rate limited\n"
        );
    }

    #[test]
    fn text_with_delimiter_is_quoted() {
        let out = text(&[doc(1, &["Smith, John"], vec![], vec![])]).unwrap();
        assert_eq!(out, "Image 1,\"Smith, John\"\n");
    }

    #[test]
    fn empty_text_leaves_empty_field() {
        let out = text(&[doc(1, &[], vec![], vec![])]).unwrap();
        assert_eq!(out, "Image 1,\n");
    }

    #[test]
    fn tables_are_quoted_and_separated() {
        let out = tables(&[
            doc(1, &[], vec![table(&[&["Name", "Amt"], &["A", "10"]]), table(&[&["x"]])], vec![]),
            doc(2, &[], vec![], vec![]),
        ])
        .unwrap();
        assert_eq!(
            out,
            "Image 1\nTable 1\n\"Name\",\"Amt\"\n\"A\",\"10\"\n\nTable 2\n\"x\"\n\nImage 2\nNo tables found\n"
        );
    }

    #[test]
    fn quotes_round_trip_through_a_csv_reader() {
        let original = vec!["say \"hi\"", "a,b", "line\nbreak", ""];
        let out = tables(&[doc(1, &[], vec![table(&[&original])], vec![])]).unwrap();
        let data_row = out
            .split_once("Table 1\n")
            .map(|(_, rest)| rest)
            .unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(data_row.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        let decoded: Vec<&str> = record.iter().collect();
        assert_eq!(decoded, original);
    }

    #[test]
    fn error_line_replaces_tables() {
        let out = tables(&[failed(1, "boom")]).unwrap();
        assert_eq!(out, "Image 1,Error: Analysis failed: boom\n");
    }

    #[test]
    fn forms_rows() {
        let out = forms(&[doc(1, &[], vec![], vec![FormField::new("Total", "42.00")])]).unwrap();
        assert_eq!(out, "Image 1\n\"Total\",\"42.00\"\n");
    }

    #[test]
    fn combined_block() {
        let out = all(&[doc(
            1,
            &["Hello"],
            vec![table(&[&["a"]])],
            vec![FormField::new("k", "v")],
        )])
        .unwrap();
        assert_eq!(out, "Image 1,Hello\nTable 1\n\"a\"\nForms\n\"k\",\"v\"\n");
    }

    #[test]
    fn empty_batch_is_empty_report() {
        assert_eq!(text(&[]).unwrap(), "");
        assert_eq!(tables(&[]).unwrap(), "");
    }

    #[test]
    fn record_doubles_quotes() {
        assert_eq!(
            record(["He said \"no\""], QuoteStyle::Always).unwrap(),
            "\"He said \"\"no\"\"\""
        );
    }
}
