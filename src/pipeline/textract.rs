//! AWS Textract backend (feature `textract`).
//!
//! Credentials and region come from the AWS default provider chain
//! (`AWS_REGION`, `AWS_ACCESS_KEY_ID`, profiles, instance roles). SDK block
//! types are converted into the crate's own [`Block`] model through their
//! wire names, so unknown values land in the `Other` variants exactly as
//! they would when decoding JSON.

use crate::error::AnalyzeError;
use crate::graph::{AnalysisResponse, Block, BlockType, DocumentMetadata, Relationship, RelationshipType};
use crate::pipeline::analyzer::DocumentAnalyzer;
use async_trait::async_trait;
use aws_sdk_textract::error::DisplayErrorContext;
use aws_sdk_textract::primitives::Blob;
use aws_sdk_textract::types::{Document, FeatureType};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Analyzer calling `AnalyzeDocument` with TABLES and FORMS.
#[derive(Debug, Clone)]
pub struct TextractAnalyzer {
    client: aws_sdk_textract::Client,
}

impl TextractAnalyzer {
    /// Build a client from the AWS default configuration chain.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            client: aws_sdk_textract::Client::new(&config),
        }
    }

    pub fn from_client(client: aws_sdk_textract::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentAnalyzer for TextractAnalyzer {
    fn name(&self) -> &str {
        "textract"
    }

    async fn analyze(&self, document: &[u8]) -> Result<AnalysisResponse, AnalyzeError> {
        let output = self
            .client
            .analyze_document()
            .document(Document::builder().bytes(Blob::new(document.to_vec())).build())
            .feature_types(FeatureType::Tables)
            .feature_types(FeatureType::Forms)
            .send()
            .await
            .map_err(|e| AnalyzeError::Service(DisplayErrorContext(&e).to_string()))?;

        let blocks: Vec<Block> = output.blocks().iter().map(convert_block).collect();
        debug!("textract: received {} blocks", blocks.len());

        Ok(AnalysisResponse {
            blocks,
            document_metadata: output.document_metadata().map(|m| DocumentMetadata {
                pages: m.pages().and_then(|p| u32::try_from(p).ok()).unwrap_or(0),
            }),
        })
    }
}

/// Parse an SDK enum through its wire name.
fn wire<T: DeserializeOwned>(name: &str) -> Option<T> {
    serde_json::from_value(serde_json::Value::String(name.to_string())).ok()
}

fn positive(v: Option<i32>) -> Option<u32> {
    v.and_then(|n| u32::try_from(n).ok())
}

fn convert_block(b: &aws_sdk_textract::types::Block) -> Block {
    let mut block = Block::new(
        b.id().unwrap_or_default(),
        b.block_type()
            .and_then(|t| wire(t.as_str()))
            .unwrap_or(BlockType::Other),
    );
    block.text = b.text().map(str::to_string);
    block.row_index = positive(b.row_index());
    block.column_index = positive(b.column_index());
    block.row_span = positive(b.row_span());
    block.column_span = positive(b.column_span());
    block.entity_types = b
        .entity_types()
        .iter()
        .filter_map(|e| wire(e.as_str()))
        .collect();
    block.relationships = b
        .relationships()
        .iter()
        .map(|r| Relationship {
            kind: r
                .r#type()
                .and_then(|t| wire(t.as_str()))
                .unwrap_or(RelationshipType::Other),
            ids: r.ids().to_vec(),
        })
        .collect();
    block.selection_status = b.selection_status().and_then(|s| wire(s.as_str()));
    block.confidence = b.confidence();
    block.page = positive(b.page());
    block
}
