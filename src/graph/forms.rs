//! Key/value form fields.
//!
//! Both sides are taken from the blocks' own `text` field. Unlike table
//! cells, nothing is reassembled from WORD children.

use super::{BlockGraph, BlockType, EntityType};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One key/value pair; both sides are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub key: String,
    pub value: String,
}

impl FormField {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Every complete key/value pair, in key-block order.
///
/// Keys without a resolvable VALUE target, and pairs where either side is
/// empty, are skipped.
pub fn extract_forms(graph: &BlockGraph<'_>) -> Vec<FormField> {
    graph
        .blocks_of_type(BlockType::KeyValueSet)
        .filter(|block| block.has_entity(EntityType::Key))
        .filter_map(|key| {
            let Some(value) = graph.value_target(key) else {
                debug!("Key {}: no value target, skipped", key.id);
                return None;
            };
            let key_text = key.text_or_empty();
            let value_text = value.text_or_empty();
            if key_text.is_empty() || value_text.is_empty() {
                debug!("Key {}: empty key or value text, skipped", key.id);
                return None;
            }
            Some(FormField::new(key_text, value_text))
        })
        .collect()
}
