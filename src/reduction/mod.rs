//! Reduction Module: Boundary Matrix Decomposition over GF(2)
//!
//! Implements the standard persistence algorithm on sparse boundary columns:
//!
//! 1. Columns arrive sorted by (dimension, entrance time)
//! 2. Each column is reduced left-to-right until its lowest row (pivot) is
//!    unique or the column vanishes
//! 3. A vanishing column gives birth to a class; a column with pivot `i`
//!    kills the class born at column `i`
//!
//! Pivots of a `d`-column are `(d - 1)`-columns, so the dimensions can be
//! reduced independently of each other. A single left-to-right pass over
//! all dimensions gives the same pairs, which is what lets a backend
//! consume columns as a stream.
//!
//! ## Reference
//!
//! Edelsbrunner, Letscher, Zomorodian (2002). "Topological Persistence
//! and Simplification". Discrete & Computational Geometry.

mod betti;
mod column;
mod diagram;
mod parallel;
mod standard;

pub use betti::{BettiCurve, BettiNumbers};
pub use diagram::{Diagram, PersistencePair};
pub use parallel::ParallelReduction;
pub use standard::StandardReduction;

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};

use column::Column;

use crate::error::{HomologyError, Result};
use crate::homology::Cell;
use crate::sparsify::SparseColumn;

/// A persistence decomposition algorithm
pub trait Backend: Send + Sync {
    /// Decompose sparse columns into a persistence diagram
    ///
    /// Fails with [`HomologyError::InconsistentComplex`] when a boundary
    /// index is not an earlier column of the dimension below, and with
    /// [`HomologyError::Input`] when entrance times decrease within a
    /// dimension or a column enters before one of its faces.
    fn decompose(&self, columns: &[SparseColumn], with_representatives: bool) -> Result<Diagram>;

    /// Decompose columns as they are produced
    ///
    /// The first error in `columns` is returned as is. The default collects
    /// the columns and calls [`Backend::decompose`].
    fn decompose_stream(
        &self,
        columns: &mut dyn Iterator<Item = Result<SparseColumn>>,
        with_representatives: bool,
    ) -> Result<Diagram> {
        let columns = columns.collect::<Result<Vec<_>>>()?;
        self.decompose(&columns, with_representatives)
    }
}

/// Check the ordering contract of a column sequence
pub(crate) fn validate(columns: &[SparseColumn]) -> Result<()> {
    let mut last_time = HashMap::new();
    for j in 0..columns.len() {
        check_column(&columns[..j], &mut last_time, &columns[j])?;
    }
    Ok(())
}

/// Check one column against the cells of the columns before it
///
/// `last_time` holds the latest entrance time seen per dimension.
pub(crate) fn check_column<C: Borrow<Cell>>(
    previous: &[C],
    last_time: &mut HashMap<usize, f64>,
    column: &SparseColumn,
) -> Result<()> {
    let j = previous.len();
    let dimension = column.dimension();
    let time = column.entrance_time();
    if let Some(&latest) = last_time.get(&dimension) {
        if time < latest {
            return Err(HomologyError::Input(format!(
                "column {j} ({}) enters at {time}, after a dimension {dimension} column at {latest}",
                column.cell.kind
            )));
        }
    }
    last_time.insert(dimension, time);

    let mut previous_face = None;
    for &face in &column.boundary {
        if face >= j || previous_face.is_some_and(|p| p >= face) {
            return Err(HomologyError::InconsistentComplex(format!(
                "column {j} ({}) has boundary {:?}, expected strictly increasing indices below {j}",
                column.cell.kind, column.boundary
            )));
        }
        previous_face = Some(face);

        let face_cell = cell_at(previous, face);
        if face_cell.dimension() + 1 != dimension {
            return Err(HomologyError::InconsistentComplex(format!(
                "column {j} ({}) lists {} as a face",
                column.cell.kind, face_cell.kind
            )));
        }
        if face_cell.entrance_time > time {
            return Err(HomologyError::Input(format!(
                "{} enters at {time}, before its face {} at {}",
                column.cell.kind, face_cell.kind, face_cell.entrance_time
            )));
        }
    }
    Ok(())
}

fn cell_at<C: Borrow<Cell>>(cells: &[C], j: usize) -> &Cell {
    Borrow::<Cell>::borrow(&cells[j])
}

/// Outcome of reducing a set of columns
#[derive(Debug, Default)]
pub(crate) struct DimensionReduction {
    /// `(birth column, death column)` for every column left with a pivot
    pairs: Vec<(usize, usize)>,
    /// Accumulated chains of the columns that vanished
    chains: HashMap<usize, Column>,
}

/// Left-to-right column reduction, one column at a time
///
/// Only columns left with a pivot are stored, together with their chains
/// when those are tracked.
#[derive(Debug, Default)]
pub(crate) struct Reducer {
    pivots: HashMap<usize, usize>,
    reduced: Vec<(Column, Option<Column>)>,
    outcome: DimensionReduction,
}

impl Reducer {
    /// Reduce column `j` against every pivot column pushed so far
    pub(crate) fn push(&mut self, j: usize, boundary: &[usize], with_chains: bool) {
        let mut r = Column::from_indices(boundary.iter().copied());
        let mut v = with_chains.then(|| Column::from_indices([j]));
        while let Some(low) = r.low() {
            let Some(&slot) = self.pivots.get(&low) else {
                break;
            };
            let (pivot_r, pivot_v) = &self.reduced[slot];
            r.add_assign(pivot_r);
            if let (Some(v), Some(pivot_v)) = (v.as_mut(), pivot_v) {
                v.add_assign(pivot_v);
            }
        }

        match r.low() {
            Some(low) => {
                self.pivots.insert(low, self.reduced.len());
                self.reduced.push((r, v));
                self.outcome.pairs.push((low, j));
            }
            None => {
                if let Some(v) = v {
                    self.outcome.chains.insert(j, v);
                }
            }
        }
    }

    pub(crate) fn finish(self) -> DimensionReduction {
        self.outcome
    }
}

/// Reduce the columns of one dimension
///
/// Columns in `cleared` are already known to vanish and are skipped.
/// Chains are only tracked when `with_chains` is set.
pub(crate) fn reduce_dimension(
    columns: &[SparseColumn],
    dimension: usize,
    cleared: &HashSet<usize>,
    with_chains: bool,
) -> DimensionReduction {
    let mut reducer = Reducer::default();
    for (j, column) in columns.iter().enumerate() {
        if column.dimension() != dimension || cleared.contains(&j) {
            continue;
        }
        reducer.push(j, &column.boundary, with_chains);
    }
    reducer.finish()
}

/// Turn reductions into a diagram
///
/// Births are visited in column order, so the result does not depend on
/// the order in which the reductions were produced.
pub(crate) fn assemble<C: Borrow<Cell>>(
    cells: &[C],
    reductions: impl IntoIterator<Item = DimensionReduction>,
) -> Diagram {
    let mut death_of: HashMap<usize, usize> = HashMap::new();
    let mut deaths: HashSet<usize> = HashSet::new();
    let mut chains: HashMap<usize, Column> = HashMap::new();
    for reduction in reductions {
        for (birth, death) in reduction.pairs {
            death_of.insert(birth, death);
            deaths.insert(death);
        }
        chains.extend(reduction.chains);
    }

    let pairs = (0..cells.len())
        .filter(|j| !deaths.contains(j))
        .map(|j| {
            let cell = cell_at(cells, j);
            let death = death_of.get(&j).map(|&k| cell_at(cells, k));
            PersistencePair {
                dimension: cell.dimension(),
                birth: cell.entrance_time,
                death: death.map(|c| c.entrance_time),
                birth_cell: cell.kind,
                death_cell: death.map(|c| c.kind),
                representative: chains
                    .remove(&j)
                    .map(|v| v.iter().map(|i| cell_at(cells, i).kind).collect()),
            }
        })
        .collect::<Vec<_>>();

    Diagram::from_pairs(pairs)
}
