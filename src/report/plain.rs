//! Human-readable text reports.
//!
//! Every document renders as a section headed `Image {index}` followed by a
//! blank line; sections are joined by a `---` separator line. Table columns
//! are padded to the widest cell of that column within the same table.

use crate::error::ReportError;
use crate::graph::forms::FormField;
use crate::graph::table::Table;
use crate::output::{DocumentOutcome, DocumentResult, ExtractedContent};

/// Placed between two document sections.
pub const SECTION_SEPARATOR: &str = "\n---\n\n";

pub const NO_TEXT: &str = "No text extracted";
pub const NO_TABLES: &str = "No tables found";
pub const NO_FORMS: &str = "No forms found";

/// Extracted lines per document.
pub fn text(results: &[DocumentResult]) -> Result<String, ReportError> {
    Ok(sections(results, |content| format!("{}\n", text_block(content))))
}

/// Reconstructed tables per document.
pub fn tables(results: &[DocumentResult]) -> Result<String, ReportError> {
    Ok(sections(results, |content| tables_block(&content.tables)))
}

/// Form fields per document.
pub fn forms(results: &[DocumentResult]) -> Result<String, ReportError> {
    Ok(sections(results, |content| forms_block(&content.forms)))
}

/// Text, tables and forms per document, each under its own heading.
pub fn all(results: &[DocumentResult]) -> Result<String, ReportError> {
    Ok(sections(results, |content| {
        let tables = if content.tables.iter().all(Table::is_empty) {
            format!("{NO_TABLES}\n\n")
        } else {
            tables_block(&content.tables)
        };
        format!(
            "Extracted Text:\n{}\n\nTables:\n{}Forms:\n{}",
            text_block(content),
            tables,
            forms_block(&content.forms)
        )
    }))
}

/// Render one table as `| a | b |` rows with per-column padding.
pub fn render_table(table: &Table) -> String {
    let widths = column_widths(table);
    let mut out = String::new();
    for row in &table.rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{:<width$}", cell.text))
            .collect();
        out.push_str("| ");
        out.push_str(&cells.join(" | "));
        out.push_str(" |\n");
    }
    out
}

/// Widest cell (in characters) of every column of `table`.
pub fn column_widths(table: &Table) -> Vec<usize> {
    let mut widths = vec![0usize; table.column_count()];
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.text.chars().count());
        }
    }
    widths
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn sections<F>(results: &[DocumentResult], body: F) -> String
where
    F: Fn(&ExtractedContent) -> String,
{
    results
        .iter()
        .map(|result| {
            let rendered = match &result.outcome {
                DocumentOutcome::Failed { error } => format!("Error: {error}\n"),
                DocumentOutcome::Extracted(content) => body(content),
            };
            format!("Image {}\n\n{}", result.index, rendered)
        })
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}

fn text_block(content: &ExtractedContent) -> String {
    if content.has_text() {
        content.joined_text()
    } else {
        NO_TEXT.to_string()
    }
}

fn tables_block(tables: &[Table]) -> String {
    let mut out = String::new();
    let mut number = 0;
    for table in tables.iter().filter(|t| !t.is_empty()) {
        number += 1;
        out.push_str(&format!("Table {number}:\n"));
        out.push_str(&render_table(table));
        out.push('\n');
    }
    if number == 0 {
        out = format!("{NO_TABLES}\n");
    }
    out
}

fn forms_block(forms: &[FormField]) -> String {
    if forms.is_empty() {
        return format!("{NO_FORMS}\n");
    }
    forms
        .iter()
        .map(|f| format!("{}: {}\n", f.key, f.value))
        .collect()
}
