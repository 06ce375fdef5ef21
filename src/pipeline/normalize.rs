//! Result normalisation: analysis response (or failure) → [`DocumentResult`].
//!
//! This is the per-document isolation boundary. Whatever happened upstream,
//! exactly one `DocumentResult` comes out and nothing is propagated.

use crate::error::DocumentError;
use crate::graph::forms::extract_forms;
use crate::graph::table::extract_tables;
use crate::graph::text::extract_lines;
use crate::graph::{AnalysisResponse, Block, BlockGraph};
use crate::output::{DocumentResult, ExtractedContent};
use tracing::debug;

/// Build the render-ready content of one document from its blocks.
///
/// Pure and deterministic: the same blocks always give the same content.
pub fn normalize_blocks(blocks: &[Block]) -> ExtractedContent {
    if blocks.is_empty() {
        debug!("No blocks in analysis response");
        return ExtractedContent::default();
    }

    let graph = BlockGraph::new(blocks);
    let content = ExtractedContent {
        text: extract_lines(blocks),
        tables: extract_tables(&graph),
        forms: extract_forms(&graph),
    };

    debug!(
        "Normalised {} blocks → {} lines, {} tables, {} form fields",
        blocks.len(),
        content.text.len(),
        content.tables.len(),
        content.forms.len()
    );
    content
}

/// Fold the outcome of one analysis call into a [`DocumentResult`].
pub fn normalize_response(
    index: usize,
    response: Result<AnalysisResponse, DocumentError>,
) -> DocumentResult {
    match response {
        Ok(response) => DocumentResult::extracted(index, normalize_blocks(&response.blocks)),
        Err(error) => DocumentResult::failed(index, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BlockType, EntityType, Relationship};

    fn invoice() -> Vec<Block> {
        vec![
            Block::line("l1", "Invoice #12"),
            Block::new("t", BlockType::Table).with_relationship(Relationship::child(["c1", "c2"])),
            Block::cell("c1", 1, 1).with_relationship(Relationship::child(["w1"])),
            Block::cell("c2", 1, 2).with_relationship(Relationship::child(["w2"])),
            Block::word("w1", "Total"),
            Block::word("w2", "42.00"),
            Block::new("k", BlockType::KeyValueSet)
                .with_entity(EntityType::Key)
                .with_text("Total")
                .with_relationship(Relationship::value(["v"])),
            Block::new("v", BlockType::KeyValueSet)
                .with_entity(EntityType::Value)
                .with_text("42.00"),
            Block::new("empty-table", BlockType::Table),
        ]
    }

    #[test]
    fn all_facets_are_extracted() {
        let content = normalize_blocks(&invoice());
        assert_eq!(content.text, vec!["Invoice #12"]);
        assert_eq!(content.tables.len(), 1);
        assert_eq!(content.tables[0].texts(), vec![vec!["Total", "42.00"]]);
        assert_eq!(content.forms.len(), 1);
    }

    #[test]
    fn normalisation_is_idempotent() {
        let blocks = invoice();
        let a = serde_json::to_string(&normalize_blocks(&blocks)).unwrap();
        let b = serde_json::to_string(&normalize_blocks(&blocks)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_response_is_not_an_error() {
        let result = normalize_response(4, Ok(AnalysisResponse::default()));
        assert_eq!(result.index, 4);
        let content = result.content().expect("success");
        assert!(content.is_empty());
    }

    #[test]
    fn failure_is_captured() {
        let result = normalize_response(
            2,
            Err(DocumentError::AnalysisFailed {
                index: 2,
                detail: "rate limited".into(),
            }),
        );
        assert_eq!(result.index, 2);
        assert!(result.error().unwrap().to_string().contains("rate limited"));
    }
}
