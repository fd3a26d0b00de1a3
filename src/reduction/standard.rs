//! Sequential standard reduction with clearing

use std::collections::{HashMap, HashSet};

use tracing::trace;

use super::{assemble, check_column, reduce_dimension, validate, Backend, Diagram, Reducer};
use crate::error::Result;
use crate::homology::Cell;
use crate::sparsify::SparseColumn;

/// Standard column reduction, one dimension after another
///
/// Without representatives the dimensions are reduced top-down and every
/// pivot row found in dimension `d` is cleared from dimension `d - 1`: a
/// column that is some pivot must vanish, so it is never reduced.
///
/// A stream is reduced in a single left-to-right pass without clearing,
/// holding the pivot columns and one cell per column.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardReduction;

impl StandardReduction {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for StandardReduction {
    fn decompose(&self, columns: &[SparseColumn], with_representatives: bool) -> Result<Diagram> {
        validate(columns)?;
        let Some(top) = columns.iter().map(SparseColumn::dimension).max() else {
            return Ok(Diagram::new());
        };

        let mut reductions = Vec::with_capacity(top + 1);
        let mut cleared = HashSet::new();
        for dimension in (0..=top).rev() {
            let reduction = reduce_dimension(columns, dimension, &cleared, with_representatives);
            if !with_representatives {
                cleared = reduction.pairs.iter().map(|&(birth, _)| birth).collect();
            }
            trace!(dimension, pairs = reduction.pairs.len(), "reduced dimension");
            reductions.push(reduction);
        }

        Ok(assemble(columns, reductions))
    }

    fn decompose_stream(
        &self,
        columns: &mut dyn Iterator<Item = Result<SparseColumn>>,
        with_representatives: bool,
    ) -> Result<Diagram> {
        let mut cells: Vec<Cell> = Vec::new();
        let mut last_time = HashMap::new();
        let mut reducer = Reducer::default();
        for column in columns {
            let column = column?;
            check_column(&cells, &mut last_time, &column)?;
            reducer.push(cells.len(), &column.boundary, with_representatives);
            cells.push(column.cell);
        }
        trace!(columns = cells.len(), "reduced stream");
        Ok(assemble(&cells, [reducer.finish()]))
    }
}
