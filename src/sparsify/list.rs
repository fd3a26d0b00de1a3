//! Sequential batch sparsifier

use std::collections::HashMap;

use super::{index_column, CollapsePlan, SparseColumn, Sparsifier};
use crate::error::Result;
use crate::homology::Cell;

/// Sparsifies the whole cell list in one sequential pass
#[derive(Debug, Clone, Copy)]
pub struct ListSparsifier {
    collapse: bool,
}

impl ListSparsifier {
    pub fn new() -> Self {
        Self { collapse: true }
    }

    /// Only index the columns, keeping every cell
    pub fn without_collapse() -> Self {
        Self { collapse: false }
    }
}

impl Default for ListSparsifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Sparsifier for ListSparsifier {
    fn sparsify(&self, cells: Vec<Cell>) -> Result<Vec<SparseColumn>> {
        let plan = if self.collapse {
            CollapsePlan::sequential(&cells)
        } else {
            CollapsePlan::default()
        };

        let mut index = HashMap::with_capacity(cells.len());
        let mut columns = Vec::with_capacity(cells.len().saturating_sub(plan.len()));
        for cell in cells {
            if plan.contains(&cell.kind) {
                continue;
            }
            let column = index_column(&index, cell)?;
            index.insert(cell.kind, columns.len());
            columns.push(column);
        }
        Ok(columns)
    }
}
