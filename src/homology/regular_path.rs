//! Regular Path Homology: 2-cells
//!
//! Every 2-path `u → v → w` of the filtration falls into one of three cases:
//!
//! - `u = w`: the double edge `u → v → u` is itself a 2-cell.
//! - `u → w` has entered by the time the path has: the path is a triangle.
//! - otherwise the path is a *bridge* between `u` and `w`. A single bridge is
//!   not a chain of the complex (its boundary needs the missing `u → w`), but
//!   the difference of two bridges is. Bridges for the same endpoints are
//!   ordered by entrance time; the first one becomes a triangle once `u → w`
//!   enters, and each later one forms a long square with the first.
//!
//! Enumeration walks the out-edges of each midpoint, so the cost is the sum
//! of in-degree × out-degree over nodes rather than a scan over all pairs of
//! edges.

use std::collections::BTreeMap;

use rayon::prelude::*;

use super::{Cell, CellKind, Homology};
use crate::filtration::Filtration;
use crate::{FiltrationTime, NodeIndex};

/// Regular path homology over GF(2)
#[derive(Debug, Clone, Copy, Default)]
pub struct RegularPathHomology;

impl Homology for RegularPathHomology {
    fn two_cells(&self, filtration: &Filtration) -> Vec<Cell> {
        let n = filtration.n_nodes() as NodeIndex;
        let mut cells: Vec<Cell> = (0..n)
            .into_par_iter()
            .flat_map_iter(|source| two_cells_from(filtration, source))
            .collect();
        cells.sort_by(|a, b| a.entrance_time.total_cmp(&b.entrance_time));
        cells
    }

    fn supports_wedge_pruning(&self) -> bool {
        true
    }
}

/// All 2-cells whose paths start at `source`
///
/// Bridges are keyed by endpoint, and every bridge of the pair
/// `(source, endpoint)` starts at `source`, so each source is self-contained.
fn two_cells_from(filtration: &Filtration, source: NodeIndex) -> Vec<Cell> {
    let mut cells = Vec::new();
    let mut bridges: BTreeMap<NodeIndex, Vec<(FiltrationTime, NodeIndex)>> = BTreeMap::new();

    for (midpoint, first_hop) in filtration.out_edges(source) {
        for (endpoint, second_hop) in filtration.out_edges(midpoint) {
            let path_time = first_hop.max(second_hop);
            if endpoint == source {
                cells.push(Cell::new(CellKind::DoubleEdge(source, midpoint), path_time));
                continue;
            }
            match filtration.try_edge_time(source, endpoint) {
                Some(shortcut) if shortcut <= path_time => cells.push(Cell::new(
                    CellKind::Triangle(source, midpoint, endpoint),
                    path_time,
                )),
                _ => bridges
                    .entry(endpoint)
                    .or_default()
                    .push((path_time, midpoint)),
            }
        }
    }

    for (endpoint, mut via) in bridges {
        via.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        let (_, base) = via[0];

        // Without the shortcut edge the base bridge never becomes a chain
        if let Some(collapse_time) = filtration.try_edge_time(source, endpoint) {
            cells.push(Cell::new(
                CellKind::Triangle(source, base, endpoint),
                collapse_time,
            ));
        }
        for &(time, midpoint) in &via[1..] {
            cells.push(Cell::new(
                CellKind::LongSquare(source, (base, midpoint), endpoint),
                time,
            ));
        }
    }

    cells
}
