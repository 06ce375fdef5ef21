//! The analysis block graph and its id index.
//!
//! A document-analysis response is a flat list of [`Block`]s. Structure is
//! expressed only through [`Relationship`]s that reference other blocks by
//! id: a TABLE lists its CELLs, a CELL lists its WORDs, a KEY block points
//! at its VALUE block. Nothing guarantees the graph is acyclic or that every
//! referenced id exists.
//!
//! [`BlockGraph`] is built once per document and borrowed by every
//! extractor; blocks themselves never hold back-references. Extraction is
//! split into one submodule per facet:
//!
//! 1. [`text`]  — LINE blocks in reading order
//! 2. [`table`] — TABLE blocks rebuilt into dense cell grids
//! 3. [`forms`] — KEY/VALUE pairs
//!
//! The serde model follows the service's JSON wire format (PascalCase field
//! names, SCREAMING_SNAKE_CASE enum values). Unknown enum values map to an
//! `Other` variant so new block kinds never fail deserialisation.

pub mod forms;
pub mod table;
pub mod text;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Top-level response of a document-analysis call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnalysisResponse {
    /// Every block of the document, in the service's reading order.
    #[serde(default)]
    pub blocks: Vec<Block>,

    /// Page count reported by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_metadata: Option<DocumentMetadata>,
}

impl AnalysisResponse {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            document_metadata: None,
        }
    }
}

/// Document-level metadata attached to a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentMetadata {
    #[serde(default)]
    pub pages: u32,
}

/// Kind of a [`Block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    Page,
    Line,
    Word,
    Table,
    Cell,
    MergedCell,
    KeyValueSet,
    SelectionElement,
    #[serde(other)]
    Other,
}

/// Entity classification of a KEY_VALUE_SET (or CELL) block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Key,
    Value,
    ColumnHeader,
    #[serde(other)]
    Other,
}

/// Kind of edge between blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    /// Structural containment.
    Child,
    /// Key-to-value pairing.
    Value,
    #[serde(other)]
    Other,
}

/// State of a checkbox / radio button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionStatus {
    Selected,
    NotSelected,
    #[serde(other)]
    Other,
}

/// A typed edge from one block to an ordered list of others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Relationship {
    #[serde(rename = "Type")]
    pub kind: RelationshipType,
    #[serde(default)]
    pub ids: Vec<String>,
}

impl Relationship {
    pub fn child<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: RelationshipType::Child,
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn value<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: RelationshipType::Value,
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// A node of the analysis graph. Read-only once received.
///
/// Cell geometry (`row_index` … `column_span`) is only present on CELL
/// blocks and is 1-based; `entity_types` only on KEY_VALUE_SET blocks;
/// `selection_status` only on SELECTION_ELEMENT blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    pub id: String,
    pub block_type: BlockType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_span: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_span: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_types: Vec<EntityType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_status: Option<SelectionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl Block {
    /// A bare block with no text, geometry or relationships.
    pub fn new(id: impl Into<String>, block_type: BlockType) -> Self {
        Self {
            id: id.into(),
            block_type,
            text: None,
            row_index: None,
            column_index: None,
            row_span: None,
            column_span: None,
            entity_types: Vec::new(),
            relationships: Vec::new(),
            selection_status: None,
            confidence: None,
            page: None,
        }
    }

    /// A LINE block.
    pub fn line(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, BlockType::Line).with_text(text)
    }

    /// A WORD block.
    pub fn word(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, BlockType::Word).with_text(text)
    }

    /// A CELL block anchored at a 1-based `(row, column)`.
    pub fn cell(id: impl Into<String>, row: u32, column: u32) -> Self {
        let mut block = Self::new(id, BlockType::Cell);
        block.row_index = Some(row);
        block.column_index = Some(column);
        block
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_span(mut self, rows: u32, columns: u32) -> Self {
        self.row_span = Some(rows);
        self.column_span = Some(columns);
        self
    }

    pub fn with_entity(mut self, entity: EntityType) -> Self {
        self.entity_types.push(entity);
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    pub fn with_selection(mut self, status: SelectionStatus) -> Self {
        self.selection_status = Some(status);
        self
    }

    /// The block's own text, or `""` when absent.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn has_entity(&self, entity: EntityType) -> bool {
        self.entity_types.contains(&entity)
    }

    /// Ids referenced by every relationship of `kind`, in list order.
    pub fn related_ids(&self, kind: RelationshipType) -> impl Iterator<Item = &str> + '_ {
        self.relationships
            .iter()
            .filter(move |r| r.kind == kind)
            .flat_map(|r| r.ids.iter().map(String::as_str))
    }
}

/// Immutable id → block index over one document's blocks.
///
/// Built once per document; every traversal takes the graph by reference.
/// When two blocks share an id, the later one wins.
#[derive(Debug)]
pub struct BlockGraph<'a> {
    blocks: &'a [Block],
    by_id: HashMap<&'a str, &'a Block>,
}

impl<'a> BlockGraph<'a> {
    pub fn new(blocks: &'a [Block]) -> Self {
        let mut by_id = HashMap::with_capacity(blocks.len());
        for block in blocks {
            by_id.insert(block.id.as_str(), block);
        }
        Self { blocks, by_id }
    }

    /// All blocks, in their original order.
    pub fn blocks(&self) -> &'a [Block] {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&'a Block> {
        self.by_id.get(id).copied()
    }

    /// Blocks of type `block_type`, in original order.
    pub fn blocks_of_type(&self, block_type: BlockType) -> impl Iterator<Item = &'a Block> + 'a {
        let blocks: &'a [Block] = self.blocks;
        blocks.iter().filter(move |b| b.block_type == block_type)
    }

    /// Every resolvable CHILD of `block`, in relationship order.
    ///
    /// Dangling ids are skipped.
    pub fn children(&self, block: &'a Block) -> Vec<&'a Block> {
        block
            .related_ids(RelationshipType::Child)
            .filter_map(|id| self.resolve(block, id))
            .collect()
    }

    /// CHILD blocks of `block` whose type is `block_type`, in relationship order.
    pub fn children_of_type(&self, block: &'a Block, block_type: BlockType) -> Vec<&'a Block> {
        block
            .related_ids(RelationshipType::Child)
            .filter_map(|id| self.resolve(block, id))
            .filter(|child| child.block_type == block_type)
            .collect()
    }

    /// The block referenced by the first id of `block`'s VALUE relationships.
    pub fn value_target(&self, block: &'a Block) -> Option<&'a Block> {
        let id = block.related_ids(RelationshipType::Value).next()?;
        self.resolve(block, id)
    }

    fn resolve(&self, parent: &Block, id: &str) -> Option<&'a Block> {
        let found = self.get(id);
        if found.is_none() {
            debug!("Block {}: dangling reference to '{}' skipped", parent.id, id);
        }
        found
    }
}
