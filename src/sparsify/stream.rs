//! Streaming sparsifier
//!
//! The collapse plan needs a look at the whole top dimension, so it is
//! computed up front; columns are then indexed one at a time as the consumer
//! pulls them.
//!
//! The cells stay in memory until the stream is dropped. What the stream
//! saves is the column list: a backend fed through
//! [`Backend::decompose_stream`](crate::reduction::Backend::decompose_stream)
//! keeps only what its reduction needs. [`StandardReduction`] keeps the
//! reduced pivot columns, while the default implementation collects
//! everything first.
//!
//! [`StandardReduction`]: crate::reduction::StandardReduction

use std::collections::HashMap;
use std::iter::FusedIterator;

use super::{index_column, CollapsePlan, SparseColumn, Sparsifier};
use crate::error::Result;
use crate::homology::{Cell, CellKind};

/// Produces sparse columns lazily through a [`SparseColumnStream`]
#[derive(Debug, Clone, Copy)]
pub struct StreamingSparsifier {
    collapse: bool,
}

impl StreamingSparsifier {
    pub fn new() -> Self {
        Self { collapse: true }
    }

    /// Only index the columns, keeping every cell
    pub fn without_collapse() -> Self {
        Self { collapse: false }
    }

    /// Start a stream over `cells`
    pub fn stream(&self, cells: Vec<Cell>) -> SparseColumnStream {
        let plan = if self.collapse {
            CollapsePlan::sequential(&cells)
        } else {
            CollapsePlan::default()
        };
        SparseColumnStream {
            index: HashMap::with_capacity(cells.len()),
            cells: cells.into_iter(),
            plan,
            emitted: 0,
            failed: false,
        }
    }
}

impl Default for StreamingSparsifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Sparsifier for StreamingSparsifier {
    fn sparsify(&self, cells: Vec<Cell>) -> Result<Vec<SparseColumn>> {
        self.stream(cells).collect()
    }

    fn columns(&self, cells: Vec<Cell>) -> Box<dyn Iterator<Item = Result<SparseColumn>> + '_> {
        Box::new(self.stream(cells))
    }
}

/// Lazy sequence of sparse columns
///
/// Consumes its cells as it goes: once exhausted, or after yielding an
/// error, it only returns `None`.
#[derive(Debug)]
pub struct SparseColumnStream {
    cells: std::vec::IntoIter<Cell>,
    plan: CollapsePlan,
    index: HashMap<CellKind, usize>,
    emitted: usize,
    failed: bool,
}

impl Iterator for SparseColumnStream {
    type Item = Result<SparseColumn>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let cell = self.cells.next()?;
            if self.plan.contains(&cell.kind) {
                continue;
            }
            return match index_column(&self.index, cell) {
                Ok(column) => {
                    self.index.insert(cell.kind, self.emitted);
                    self.emitted += 1;
                    Some(Ok(column))
                }
                Err(err) => {
                    self.failed = true;
                    Some(Err(err))
                }
            };
        }
    }
}

impl FusedIterator for SparseColumnStream {}
