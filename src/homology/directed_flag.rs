//! Directed Flag Homology: 2-cells
//!
//! The directed flag complex fills a triangle `u → v → w` exactly when the
//! shortcut `u → w` is present; the triangle enters with the last of its
//! three edges.

use rayon::prelude::*;

use super::{Cell, CellKind, Homology};
use crate::filtration::Filtration;
use crate::NodeIndex;

/// Homology of the directed flag complex, truncated at dimension 2
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectedFlagHomology;

impl Homology for DirectedFlagHomology {
    fn two_cells(&self, filtration: &Filtration) -> Vec<Cell> {
        let n = filtration.n_nodes() as NodeIndex;
        let mut cells: Vec<Cell> = (0..n)
            .into_par_iter()
            .flat_map_iter(|source| {
                filtration
                    .out_edges(source)
                    .flat_map(move |(midpoint, first_hop)| {
                        filtration
                            .out_edges(midpoint)
                            .filter(move |&(endpoint, _)| endpoint != source)
                            .filter_map(move |(endpoint, second_hop)| {
                                let shortcut = filtration.try_edge_time(source, endpoint)?;
                                Some(Cell::new(
                                    CellKind::Triangle(source, midpoint, endpoint),
                                    first_hop.max(second_hop).max(shortcut),
                                ))
                            })
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        cells.sort_by(|a, b| a.entrance_time.total_cmp(&b.entrance_time));
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_triangles_only() {
        let f = Filtration::new(
            vec![0.0; 4],
            vec![
                ((0, 1), 2.0),
                ((1, 3), 2.0),
                ((0, 2), 3.0),
                ((2, 3), 3.0),
                ((0, 3), 4.0),
                ((3, 0), 1.0),
            ],
        )
        .unwrap();

        let cells = DirectedFlagHomology.two_cells(&f);
        let kinds: Vec<_> = cells.iter().map(|c| (c.kind, c.entrance_time)).collect();
        assert_eq!(
            kinds,
            vec![
                (CellKind::Triangle(0, 1, 3), 4.0),
                (CellKind::Triangle(0, 2, 3), 4.0),
            ]
        );
    }
}
