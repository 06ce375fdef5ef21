//! Plain text: LINE blocks in the service's reading order.
//!
//! The block array is already in reading order, so lines are never
//! re-sorted by geometry.

use super::{Block, BlockType};

/// Text of every LINE block, in array order. A line without text yields `""`.
pub fn extract_lines(blocks: &[Block]) -> Vec<String> {
    blocks
        .iter()
        .filter(|b| b.block_type == BlockType::Line)
        .map(|b| b.text_or_empty().to_string())
        .collect()
}

/// All lines joined with `\n`.
pub fn extract_text(blocks: &[Block]) -> String {
    extract_lines(blocks).join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_in_array_order() {
        let blocks = vec![
            Block::line("2", "second"),
            Block::word("w", "ignored"),
            Block::line("1", "first"),
        ];
        assert_eq!(extract_lines(&blocks), vec!["second", "first"]);
        assert_eq!(extract_text(&blocks), "second\nfirst");
    }

    #[test]
    fn missing_text_is_empty_line() {
        let blocks = vec![
            Block::line("1", "a"),
            Block::new("2", BlockType::Line),
            Block::line("3", "c"),
        ];
        assert_eq!(extract_text(&blocks), "a\n\nc");
    }

    #[test]
    fn empty_input_is_empty_result() {
        assert!(extract_lines(&[]).is_empty());
        assert_eq!(extract_text(&[]), "");
    }
}
