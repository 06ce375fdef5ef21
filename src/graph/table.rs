//! Table reconstruction: TABLE block → dense rectangular grid of [`Cell`]s.
//!
//! ## Algorithm
//!
//! 1. Collect the table's CELL children through the [`BlockGraph`].
//! 2. Key each cell by its 1-based `(row, column)` anchor; cells missing
//!    either index, or anchored past [`MAX_TABLE_INDEX`], are skipped and
//!    logged.
//! 3. Assemble each cell's text from its WORD children (space separated)
//!    and a literal `X` for every SELECTED selection element.
//! 4. The grid is `max_row × max_column`; positions nobody anchored hold an
//!    empty 1×1 cell, so every row has the same length.
//!
//! Spans are carried on the anchor cell only. A cell with `column_span = 3`
//! still occupies a single grid position and the two positions it covers
//! are filled with empty cells; nothing is merged.

use super::{Block, BlockGraph, BlockType, SelectionStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Marker emitted for a checked box inside a table cell.
pub const SELECTED_MARKER: &str = "X";

/// Largest row or column index accepted for a cell anchor. Cells beyond it
/// are treated as malformed, which caps a grid at `MAX_TABLE_INDEX²` cells.
pub const MAX_TABLE_INDEX: u32 = 500;

/// One grid position of a reconstructed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub text: String,
    pub row_span: u32,
    pub column_span: u32,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            row_span: 1,
            column_span: 1,
        }
    }

    /// The filler placed where no cell block was anchored.
    pub fn empty() -> Self {
        Self::new("")
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A reconstructed table: rows of equal length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell texts, row-major.
    pub fn texts(&self) -> Vec<Vec<&str>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|c| c.text.as_str()).collect())
            .collect()
    }

    /// Whether any anchor cell spans more than one row or column.
    pub fn has_spanning_cells(&self) -> bool {
        self.rows
            .iter()
            .flatten()
            .any(|c| c.row_span > 1 || c.column_span > 1)
    }
}

/// Rebuild one TABLE block into a dense grid.
///
/// A table without any well-formed cell yields an empty [`Table`].
pub fn reconstruct_table(table: &Block, graph: &BlockGraph<'_>) -> Table {
    let mut cells: HashMap<(u32, u32), Cell> = HashMap::new();
    let mut max_row = 0u32;
    let mut max_column = 0u32;

    for cell_block in graph.children_of_type(table, BlockType::Cell) {
        let (row, column) = match (cell_block.row_index, cell_block.column_index) {
            (Some(r), Some(c))
                if (1..=MAX_TABLE_INDEX).contains(&r) && (1..=MAX_TABLE_INDEX).contains(&c) =>
            {
                (r, c)
            }
            (r, c) => {
                warn!(
                    "Table {}: malformed cell {} (row {:?}, column {:?}) skipped",
                    table.id, cell_block.id, r, c
                );
                continue;
            }
        };

        max_row = max_row.max(row);
        max_column = max_column.max(column);

        let cell = Cell {
            text: cell_text(cell_block, graph),
            row_span: cell_block.row_span.unwrap_or(1).max(1),
            column_span: cell_block.column_span.unwrap_or(1).max(1),
        };
        cells.insert((row, column), cell);
    }

    let rows: Vec<Vec<Cell>> = (1..=max_row)
        .map(|row| {
            (1..=max_column)
                .map(|column| cells.remove(&(row, column)).unwrap_or_else(Cell::empty))
                .collect()
        })
        .collect();

    debug!(
        "Table {}: {} rows × {} columns",
        table.id, max_row, max_column
    );

    Table { rows }
}

/// Every non-empty table of the document, in block order.
pub fn extract_tables(graph: &BlockGraph<'_>) -> Vec<Table> {
    graph
        .blocks_of_type(BlockType::Table)
        .map(|block| reconstruct_table(block, graph))
        .filter(|table| {
            let keep = !table.is_empty();
            if !keep {
                debug!("Dropping table without cells");
            }
            keep
        })
        .collect()
}

/// Text of a CELL block assembled from its WORD and SELECTION_ELEMENT children.
pub fn cell_text(cell: &Block, graph: &BlockGraph<'_>) -> String {
    let mut text = String::new();
    for child in graph.children(cell) {
        match child.block_type {
            BlockType::Word => {
                text.push_str(child.text_or_empty());
                text.push(' ');
            }
            BlockType::SelectionElement
                if child.selection_status == Some(SelectionStatus::Selected) =>
            {
                text.push_str(SELECTED_MARKER);
                text.push(' ');
            }
            _ => {}
        }
    }
    text.trim_end().to_string()
}
