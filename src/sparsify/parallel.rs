//! Parallel batch sparsifier
//!
//! Columns of one dimension only reference columns of the dimension below,
//! so each dimension is indexed in a single parallel pass once the previous
//! one has been published to a shared concurrent index.

use dashmap::DashMap;
use rayon::prelude::*;

use super::{missing_face, CollapsePlan, SparseColumn, Sparsifier};
use crate::error::Result;
use crate::homology::{Cell, CellKind};

/// Sparsifies one dimension at a time, each dimension in parallel
#[derive(Debug, Clone, Copy)]
pub struct ParallelSparsifier {
    collapse: bool,
}

impl ParallelSparsifier {
    pub fn new() -> Self {
        Self { collapse: true }
    }

    /// Only index the columns, keeping every cell
    pub fn without_collapse() -> Self {
        Self { collapse: false }
    }
}

impl Default for ParallelSparsifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Sparsifier for ParallelSparsifier {
    fn sparsify(&self, cells: Vec<Cell>) -> Result<Vec<SparseColumn>> {
        let plan = if self.collapse {
            CollapsePlan::parallel(&cells)
        } else {
            CollapsePlan::default()
        };

        // Output positions are fixed before any boundary is indexed
        let kept: Vec<(usize, Cell)> = cells
            .into_iter()
            .filter(|cell| !plan.contains(&cell.kind))
            .enumerate()
            .collect();
        let Some(top) = kept.iter().map(|(_, cell)| cell.dimension()).max() else {
            return Ok(Vec::new());
        };

        let index: DashMap<CellKind, usize> = DashMap::with_capacity(kept.len());
        let mut columns: Vec<Option<SparseColumn>> = vec![None; kept.len()];

        for dimension in 0..=top {
            let built = kept
                .par_iter()
                .filter(|(_, cell)| cell.dimension() == dimension)
                .map(|&(position, cell)| {
                    let mut boundary = cell
                        .boundary()
                        .into_iter()
                        .map(|face| {
                            index
                                .get(&face)
                                .map(|entry| *entry.value())
                                .filter(|&at| at < position)
                                .ok_or_else(|| missing_face(&cell, &face))
                        })
                        .collect::<Result<Vec<_>>>()?;
                    boundary.sort_unstable();
                    Ok((position, SparseColumn { cell, boundary }))
                })
                .collect::<Result<Vec<_>>>()?;

            kept.par_iter()
                .filter(|(_, cell)| cell.dimension() == dimension)
                .for_each(|&(position, cell)| {
                    index.insert(cell.kind, position);
                });

            for (position, column) in built {
                columns[position] = Some(column);
            }
        }

        Ok(columns.into_iter().flatten().collect())
    }
}
