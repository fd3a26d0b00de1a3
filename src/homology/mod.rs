//! Homology Module: Cell Generation for Path Complexes
//!
//! Turns a filtration into the basis cells of a filtered chain complex:
//! - 0-cells: nodes
//! - 1-cells: edges
//! - 2-cells: allowable combinations of 2-paths `u → v → w`
//!
//! Two homology theories are available. [`RegularPathHomology`] builds a
//! basis of the regular path complex (double edges, triangles and long
//! squares). [`DirectedFlagHomology`] only fills directed triangles, giving
//! the homology of the directed flag complex.
//!
//! Generation is capped at dimension 2.

mod cells;
mod directed_flag;
mod regular_path;

pub use cells::{sort_for_decomposition, Cell, CellKind};
pub use directed_flag::DirectedFlagHomology;
pub use regular_path::RegularPathHomology;

use crate::error::{HomologyError, Result};
use crate::filtration::Filtration;

/// Highest cell dimension any homology generates
pub const MAX_CELL_DIMENSION: usize = 2;

/// A homology theory that can enumerate the basis cells of a filtration
pub trait Homology: Send + Sync {
    /// One cell per node
    fn zero_cells(&self, filtration: &Filtration) -> Vec<Cell> {
        filtration
            .node_iter()
            .map(|(node, time)| Cell::new(CellKind::Node(node), time))
            .collect()
    }

    /// One cell per edge
    fn one_cells(&self, filtration: &Filtration) -> Vec<Cell> {
        filtration
            .edge_iter()
            .map(|((u, v), time)| Cell::new(CellKind::Edge(u, v), time))
            .collect()
    }

    /// Basis of the 2-chains, sorted by entrance time
    fn two_cells(&self, filtration: &Filtration) -> Vec<Cell>;

    /// Whether the homology of a wedge is the sum of its summands'
    ///
    /// Only then may a grounded pipeline prune appendages and trees.
    fn supports_wedge_pruning(&self) -> bool {
        false
    }

    /// Cells of every requested dimension, concatenated in request order
    fn cells(&self, dimensions: &[usize], filtration: &Filtration) -> Result<Vec<Cell>> {
        let mut cells = Vec::new();
        for &dimension in dimensions {
            match dimension {
                0 => cells.extend(self.zero_cells(filtration)),
                1 => cells.extend(self.one_cells(filtration)),
                2 => cells.extend(self.two_cells(filtration)),
                other => return Err(HomologyError::UnsupportedDimension(other)),
            }
        }
        Ok(cells)
    }
}

/// Cells of a possibly grounded complex, sorted for decomposition
///
/// 0- and 1-cells come from `grounded` when it is given, 2-cells always
/// from the ungrounded `filtration`.
pub fn complex_cells(
    homology: &dyn Homology,
    dimensions: &[usize],
    filtration: &Filtration,
    grounded: Option<&Filtration>,
) -> Result<Vec<Cell>> {
    let low = grounded.unwrap_or(filtration);
    let mut cells = Vec::new();
    for &dimension in dimensions {
        let source = if dimension < 2 { low } else { filtration };
        cells.extend(homology.cells(&[dimension], source)?);
    }
    sort_for_decomposition(&mut cells);
    Ok(cells)
}

/// Reject any dimension outside `0..=MAX_CELL_DIMENSION`
pub fn check_dimensions(dimensions: impl IntoIterator<Item = usize>) -> Result<()> {
    for dimension in dimensions {
        if dimension > MAX_CELL_DIMENSION {
            return Err(HomologyError::UnsupportedDimension(dimension));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_dimension() {
        let f = Filtration::new(vec![0.0], vec![]).unwrap();
        let result = RegularPathHomology.cells(&[0, 3], &f);
        assert_eq!(result, Err(HomologyError::UnsupportedDimension(3)));
        assert!(check_dimensions([0, 1, 2]).is_ok());
    }

    #[test]
    fn test_complex_cells_take_two_cells_ungrounded() {
        let f = Filtration::new(
            vec![0.0; 3],
            vec![((0, 1), 1.0), ((1, 2), 1.0), ((0, 2), 2.0)],
        )
        .unwrap();
        let g = f.ground(vec![(0, 1), (1, 2)]).unwrap();
        let cells = complex_cells(&RegularPathHomology, &[2, 1, 0], &f, Some(&g)).unwrap();
        let times: Vec<_> = cells.iter().map(|c| (c.kind, c.entrance_time)).collect();
        assert_eq!(
            times,
            vec![
                (CellKind::Node(0), 0.0),
                (CellKind::Node(1), 0.0),
                (CellKind::Node(2), 0.0),
                (CellKind::Edge(0, 1), 0.0),
                (CellKind::Edge(1, 2), 0.0),
                (CellKind::Edge(0, 2), 2.0),
                (CellKind::Triangle(0, 1, 2), 2.0),
            ]
        );
    }

    #[test]
    fn test_cells_follow_request_order() {
        let f = Filtration::new(vec![0.0, 0.0], vec![((0, 1), 1.0)]).unwrap();
        let cells = RegularPathHomology.cells(&[1, 0], &f).unwrap();
        let dims: Vec<_> = cells.iter().map(Cell::dimension).collect();
        assert_eq!(dims, vec![1, 0, 0]);
    }
}
