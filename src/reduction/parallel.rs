//! Parallel reduction: one task per dimension

use std::collections::HashSet;

use rayon::prelude::*;

use super::{assemble, reduce_dimension, validate, Backend, Diagram};
use crate::error::Result;
use crate::sparsify::SparseColumn;

/// Reduces every dimension concurrently
///
/// Pivots never cross dimensions, so the per-dimension reductions are
/// independent; they are merged in dimension order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelReduction;

impl ParallelReduction {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for ParallelReduction {
    fn decompose(&self, columns: &[SparseColumn], with_representatives: bool) -> Result<Diagram> {
        validate(columns)?;
        let Some(top) = columns.par_iter().map(SparseColumn::dimension).max() else {
            return Ok(Diagram::new());
        };

        let none_cleared = HashSet::new();
        let reductions: Vec<_> = (0..=top)
            .into_par_iter()
            .map(|dimension| {
                reduce_dimension(columns, dimension, &none_cleared, with_representatives)
            })
            .collect();

        Ok(assemble(columns, reductions))
    }
}
