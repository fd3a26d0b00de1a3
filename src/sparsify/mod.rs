//! Sparsify Module: From Cells to Sparse Boundary Columns
//!
//! A sparsifier turns an ordered cell list into the sparse boundary matrix
//! consumed by the reduction backends: each column stores the positions of
//! its faces among the columns emitted before it.
//!
//! ## Free-face collapse
//!
//! Before indexing, the complex is shrunk by elementary collapses in its top
//! dimension `D`. A `D`-cell τ is removed together with a face σ when σ has
//! τ as its only coface and both enter at the same time. Inside every
//! filtration step this is a collapse of a free face, so the homology of
//! every sublevel complex, and with it the persistence diagram, is unchanged.
//! Since τ is top-dimensional no remaining boundary mentions it.
//!
//! Three strategies produce identical output:
//! - [`ListSparsifier`]: sequential batch
//! - [`ParallelSparsifier`]: batch, one parallel pass per dimension
//! - [`StreamingSparsifier`]: lazy, one column at a time

mod list;
mod parallel;
mod stream;

pub use list::ListSparsifier;
pub use parallel::ParallelSparsifier;
pub use stream::{SparseColumnStream, StreamingSparsifier};

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{HomologyError, Result};
use crate::homology::{Cell, CellKind};
use crate::FiltrationTime;

/// A cell with its boundary given as positions of earlier columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseColumn {
    pub cell: Cell,
    /// Sorted positions of the faces in the column sequence
    pub boundary: Vec<usize>,
}

impl SparseColumn {
    pub fn dimension(&self) -> usize {
        self.cell.dimension()
    }

    pub fn entrance_time(&self) -> FiltrationTime {
        self.cell.entrance_time
    }
}

impl Borrow<Cell> for SparseColumn {
    fn borrow(&self) -> &Cell {
        &self.cell
    }
}

/// Strategy turning an ordered cell list into sparse columns
///
/// Cells must list every face before its cofaces. Decomposing the output
/// yields the same diagram as decomposing the unreduced complex.
pub trait Sparsifier: Send + Sync {
    fn sparsify(&self, cells: Vec<Cell>) -> Result<Vec<SparseColumn>>;

    /// Columns in emission order
    ///
    /// Batch strategies build every column first. An error ends the
    /// sequence.
    fn columns(&self, cells: Vec<Cell>) -> Box<dyn Iterator<Item = Result<SparseColumn>> + '_> {
        match self.sparsify(cells) {
            Ok(columns) => Box::new(columns.into_iter().map(Ok::<_, HomologyError>)),
            Err(err) => Box::new(std::iter::once(Err(err))),
        }
    }
}

/// Cells removed by free-face collapse
#[derive(Debug, Default)]
pub(crate) struct CollapsePlan {
    removed: HashSet<CellKind>,
}

impl CollapsePlan {
    pub(crate) fn sequential(cells: &[Cell]) -> Self {
        let Some(top) = cells.iter().map(Cell::dimension).max().filter(|&d| d > 0) else {
            return Self::default();
        };

        let face_times: HashMap<CellKind, FiltrationTime> = cells
            .iter()
            .filter(|c| c.dimension() == top - 1)
            .map(|c| (c.kind, c.entrance_time))
            .collect();

        let mut coface_counts: HashMap<CellKind, u32> = HashMap::new();
        for cell in cells.iter().filter(|c| c.dimension() == top) {
            for face in cell.boundary() {
                *coface_counts.entry(face).or_insert(0) += 1;
            }
        }

        let removed = cells
            .iter()
            .filter(|c| c.dimension() == top)
            .filter_map(|c| free_face(c, &coface_counts, &face_times).map(|f| [c.kind, f]))
            .flatten()
            .collect();

        Self { removed }
    }

    pub(crate) fn parallel(cells: &[Cell]) -> Self {
        let Some(top) = cells
            .par_iter()
            .map(Cell::dimension)
            .max()
            .filter(|&d| d > 0)
        else {
            return Self::default();
        };

        let face_times: HashMap<CellKind, FiltrationTime> = cells
            .par_iter()
            .filter(|c| c.dimension() == top - 1)
            .map(|c| (c.kind, c.entrance_time))
            .collect();

        let coface_counts: HashMap<CellKind, u32> = cells
            .par_iter()
            .filter(|c| c.dimension() == top)
            .fold(HashMap::new, |mut counts, cell| {
                for face in cell.boundary() {
                    *counts.entry(face).or_insert(0) += 1;
                }
                counts
            })
            .reduce(HashMap::new, |mut counts, other| {
                for (face, n) in other {
                    *counts.entry(face).or_insert(0) += n;
                }
                counts
            });

        let removed = cells
            .par_iter()
            .filter(|c| c.dimension() == top)
            .flat_map_iter(|c| {
                free_face(c, &coface_counts, &face_times)
                    .into_iter()
                    .flat_map(move |f| [c.kind, f])
            })
            .collect();

        Self { removed }
    }

    pub(crate) fn contains(&self, kind: &CellKind) -> bool {
        self.removed.contains(kind)
    }

    pub(crate) fn len(&self) -> usize {
        self.removed.len()
    }
}

/// First face of `cell` that only `cell` covers and that enters with it
fn free_face(
    cell: &Cell,
    coface_counts: &HashMap<CellKind, u32>,
    face_times: &HashMap<CellKind, FiltrationTime>,
) -> Option<CellKind> {
    cell.boundary().into_iter().find(|face| {
        coface_counts.get(face) == Some(&1) && face_times.get(face) == Some(&cell.entrance_time)
    })
}

/// Express a cell's boundary through the positions recorded in `index`
pub(crate) fn index_column(index: &HashMap<CellKind, usize>, cell: Cell) -> Result<SparseColumn> {
    let mut boundary = cell
        .boundary()
        .into_iter()
        .map(|face| index.get(&face).copied().ok_or_else(|| missing_face(&cell, &face)))
        .collect::<Result<Vec<_>>>()?;
    boundary.sort_unstable();
    Ok(SparseColumn { cell, boundary })
}

pub(crate) fn missing_face(cell: &Cell, face: &CellKind) -> HomologyError {
    HomologyError::InconsistentComplex(format!(
        "{} references face {face}, which does not precede it in the cell set",
        cell.kind
    ))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::homology::sort_for_decomposition;

    /// Grounded diamond complex: 0 -> 1 -> 3 (2 + 2), 0 -> 2 -> 3 (3 + 3)
    pub(crate) fn diamond_cells() -> Vec<Cell> {
        let mut cells: Vec<Cell> = (0..4).map(|i| Cell::new(CellKind::Node(i), 0.0)).collect();
        for (u, v) in [(0, 1), (0, 2), (1, 3), (2, 3)] {
            cells.push(Cell::new(CellKind::Edge(u, v), 0.0));
        }
        cells.push(Cell::new(CellKind::Edge(0, 3), 4.0));
        cells.push(Cell::new(CellKind::LongSquare(0, (1, 2), 3), 3.0));
        cells.push(Cell::new(CellKind::Triangle(0, 1, 3), 4.0));
        sort_for_decomposition(&mut cells);
        cells
    }

    fn strategies() -> Vec<Box<dyn Sparsifier>> {
        vec![
            Box::new(ListSparsifier::new()),
            Box::new(ParallelSparsifier::new()),
            Box::new(StreamingSparsifier::new()),
        ]
    }

    #[test]
    fn test_collapse_removes_free_pair() {
        let plan = CollapsePlan::sequential(&diamond_cells());
        // Edge(0,3) is covered only by the triangle, and both enter at 4
        assert_eq!(plan.len(), 2);
        assert!(plan.contains(&CellKind::Edge(0, 3)));
        assert!(plan.contains(&CellKind::Triangle(0, 1, 3)));

        let parallel = CollapsePlan::parallel(&diamond_cells());
        assert_eq!(parallel.removed, plan.removed);
    }

    #[test]
    fn test_strategies_agree() {
        let expected = ListSparsifier::new().sparsify(diamond_cells()).unwrap();
        assert_eq!(expected.len(), diamond_cells().len() - 2);
        for strategy in strategies() {
            assert_eq!(strategy.sparsify(diamond_cells()).unwrap(), expected);
        }
    }

    #[test]
    fn test_boundaries_point_backwards() {
        for strategy in strategies() {
            let columns = strategy.sparsify(diamond_cells()).unwrap();
            for (position, column) in columns.iter().enumerate() {
                for &face in &column.boundary {
                    assert!(face < position);
                    assert_eq!(columns[face].dimension() + 1, column.dimension());
                }
            }
        }
    }

    #[test]
    fn test_without_collapse_keeps_everything() {
        let columns = ListSparsifier::without_collapse()
            .sparsify(diamond_cells())
            .unwrap();
        assert_eq!(columns.len(), diamond_cells().len());
        let parallel = ParallelSparsifier::without_collapse()
            .sparsify(diamond_cells())
            .unwrap();
        assert_eq!(parallel, columns);
    }

    #[test]
    fn test_missing_face_is_inconsistent() {
        let cells = vec![
            Cell::new(CellKind::Node(0), 0.0),
            Cell::new(CellKind::Edge(0, 1), 1.0),
        ];
        for strategy in strategies() {
            assert!(matches!(
                strategy.sparsify(cells.clone()),
                Err(HomologyError::InconsistentComplex(_))
            ));
        }
    }

    #[test]
    fn test_face_after_coface_is_inconsistent() {
        let cells = vec![
            Cell::new(CellKind::Node(0), 0.0),
            Cell::new(CellKind::Edge(0, 1), 1.0),
            Cell::new(CellKind::Node(1), 0.0),
        ];
        for strategy in strategies() {
            assert!(matches!(
                strategy.sparsify(cells.clone()),
                Err(HomologyError::InconsistentComplex(_))
            ));
        }
    }
}
