//! Filtration Module: Entrance Times on a Weighted Digraph
//!
//! A filtration assigns every node and every (possibly virtual) edge an
//! entrance time. For shortest-path filtrations the edge `(u, v)` enters at
//! the distance `d(u, v)`, so the complex at scale `t` contains every pair of
//! nodes at most `t` apart.
//!
//! ## Grounding
//!
//! Grounding attaches a ground graph (usually the input digraph itself) to a
//! filtration: every ground edge enters as soon as both of its endpoints
//! exist. The original 1-cycles of the graph are then present from the start
//! and the filtration only records when they become boundaries.

mod shortest_path;

pub use shortest_path::all_pairs_distances;
pub(crate) use shortest_path::validate_weights;

use std::collections::BTreeMap;

use crate::error::{HomologyError, Result};
use crate::{FiltrationTime, NodeIndex};

/// Entrance times for the nodes and edges of a digraph
///
/// Edges are indexed by source, with targets kept in ordered maps so that
/// every iteration over the filtration is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Filtration {
    node_times: Vec<FiltrationTime>,
    out_edges: Vec<BTreeMap<NodeIndex, FiltrationTime>>,
    grounded: bool,
}

impl Filtration {
    /// Build a filtration from explicit node and edge entrance times
    ///
    /// Fails with [`HomologyError::Input`] when a time is negative, infinite
    /// or NaN, when an edge is a self loop or references an unknown node, or
    /// when an edge would enter before one of its endpoints. Repeated edges
    /// keep their earliest entrance time.
    pub fn new(
        node_times: Vec<FiltrationTime>,
        edges: impl IntoIterator<Item = ((NodeIndex, NodeIndex), FiltrationTime)>,
    ) -> Result<Self> {
        for (node, &time) in node_times.iter().enumerate() {
            check_time(time, || format!("node {node}"))?;
        }

        let mut out_edges = vec![BTreeMap::new(); node_times.len()];
        for ((u, v), time) in edges {
            check_time(time, || format!("edge ({u}, {v})"))?;
            if u == v {
                return Err(HomologyError::Input(format!("self loop at node {u}")));
            }
            let (Some(&tu), Some(&tv)) = (node_times.get(u as usize), node_times.get(v as usize))
            else {
                return Err(HomologyError::Input(format!(
                    "edge ({u}, {v}) references a node outside 0..{}",
                    node_times.len()
                )));
            };
            if time < tu.max(tv) {
                return Err(HomologyError::Input(format!(
                    "edge ({u}, {v}) enters at {time} before its endpoints ({tu}, {tv})"
                )));
            }
            let slot = out_edges[u as usize].entry(v).or_insert(time);
            *slot = slot.min(time);
        }

        Ok(Self {
            node_times,
            out_edges,
            grounded: false,
        })
    }

    /// Number of nodes
    pub fn n_nodes(&self) -> usize {
        self.node_times.len()
    }

    /// Number of edges
    pub fn n_edges(&self) -> usize {
        self.out_edges.iter().map(BTreeMap::len).sum()
    }

    /// Whether this filtration was produced by [`Filtration::ground`]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Entrance time of a node
    pub fn node_time(&self, node: NodeIndex) -> Result<FiltrationTime> {
        self.node_times
            .get(node as usize)
            .copied()
            .ok_or_else(|| HomologyError::Lookup(format!("node {node} is not in the filtration")))
    }

    /// Entrance time of an edge
    pub fn edge_time(&self, source: NodeIndex, target: NodeIndex) -> Result<FiltrationTime> {
        self.try_edge_time(source, target).ok_or_else(|| {
            HomologyError::Lookup(format!("edge ({source}, {target}) is not in the filtration"))
        })
    }

    /// Entrance time of an edge, `None` if it never enters
    pub fn try_edge_time(&self, source: NodeIndex, target: NodeIndex) -> Option<FiltrationTime> {
        self.out_edges
            .get(source as usize)
            .and_then(|targets| targets.get(&target))
            .copied()
    }

    /// All nodes with their entrance times, in index order
    pub fn node_iter(&self) -> impl Iterator<Item = (NodeIndex, FiltrationTime)> + '_ {
        self.node_times
            .iter()
            .enumerate()
            .map(|(node, &time)| (node as NodeIndex, time))
    }

    /// All edges with their entrance times, ordered by (source, target)
    pub fn edge_iter(&self) -> impl Iterator<Item = ((NodeIndex, NodeIndex), FiltrationTime)> + '_ {
        self.out_edges.iter().enumerate().flat_map(|(source, targets)| {
            targets
                .iter()
                .map(move |(&target, &time)| ((source as NodeIndex, target), time))
        })
    }

    /// Out-edges of a node, ordered by target; empty for unknown nodes
    pub fn out_edges(
        &self,
        source: NodeIndex,
    ) -> impl Iterator<Item = (NodeIndex, FiltrationTime)> + '_ {
        self.out_edges
            .get(source as usize)
            .into_iter()
            .flat_map(|targets| targets.iter().map(|(&target, &time)| (target, time)))
    }

    /// Attach a ground graph, returning a new grounded filtration
    ///
    /// Each ground edge `(u, v)` enters at `max(time(u), time(v))`, or keeps
    /// its current time if that is already earlier. Node times never change
    /// and no cell is ever postponed. Self loops in the ground graph are
    /// ignored; an unknown endpoint is a lookup failure.
    pub fn ground(
        &self,
        ground_edges: impl IntoIterator<Item = (NodeIndex, NodeIndex)>,
    ) -> Result<Self> {
        let mut grounded = self.clone();
        for (u, v) in ground_edges {
            if u == v {
                continue;
            }
            let time = self.node_time(u)?.max(self.node_time(v)?);
            let slot = grounded.out_edges[u as usize].entry(v).or_insert(time);
            *slot = slot.min(time);
        }
        grounded.grounded = true;
        Ok(grounded)
    }
}

fn check_time(time: FiltrationTime, what: impl FnOnce() -> String) -> Result<()> {
    if time.is_finite() && time >= 0.0 {
        Ok(())
    } else {
        Err(HomologyError::Input(format!(
            "{} has entrance time {time}, expected a finite non-negative value",
            what()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_filtration() -> Filtration {
        // 0 -> 1 -> 2 with a late shortcut 0 -> 2
        Filtration::new(
            vec![0.0, 0.0, 0.5],
            vec![((0, 1), 1.0), ((1, 2), 1.0), ((0, 2), 2.0)],
        )
        .unwrap()
    }

    #[test]
    fn test_lookups() {
        let f = path_filtration();
        assert_eq!(f.n_nodes(), 3);
        assert_eq!(f.n_edges(), 3);
        assert_eq!(f.node_time(2).unwrap(), 0.5);
        assert_eq!(f.edge_time(0, 2).unwrap(), 2.0);
        assert!(f.try_edge_time(2, 0).is_none());
        assert!(matches!(f.edge_time(2, 0), Err(HomologyError::Lookup(_))));
        assert!(matches!(f.node_time(7), Err(HomologyError::Lookup(_))));
    }

    #[test]
    fn test_edge_order_is_deterministic() {
        let f = path_filtration();
        let edges: Vec<_> = f.edge_iter().map(|(e, _)| e).collect();
        assert_eq!(edges, vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_rejects_malformed_input() {
        let negative = Filtration::new(vec![0.0, -1.0], vec![]);
        assert!(matches!(negative, Err(HomologyError::Input(_))));

        let nan = Filtration::new(vec![0.0, 0.0], vec![((0, 1), f64::NAN)]);
        assert!(matches!(nan, Err(HomologyError::Input(_))));

        let early = Filtration::new(vec![0.0, 2.0], vec![((0, 1), 1.0)]);
        assert!(matches!(early, Err(HomologyError::Input(_))));

        let dangling = Filtration::new(vec![0.0], vec![((0, 3), 1.0)]);
        assert!(matches!(dangling, Err(HomologyError::Input(_))));

        let looped = Filtration::new(vec![0.0], vec![((0, 0), 1.0)]);
        assert!(matches!(looped, Err(HomologyError::Input(_))));
    }

    #[test]
    fn test_grounding_never_postpones() {
        let f = path_filtration();
        let g = f.ground(vec![(0, 1), (1, 2), (2, 0)]).unwrap();

        assert!(g.is_grounded());
        assert!(!f.is_grounded());

        // Ground edges enter with their endpoints
        assert_eq!(g.edge_time(0, 1).unwrap(), 0.0);
        assert_eq!(g.edge_time(1, 2).unwrap(), 0.5);
        assert_eq!(g.edge_time(2, 0).unwrap(), 0.5);
        // Edges outside the ground graph are untouched
        assert_eq!(g.edge_time(0, 2).unwrap(), 2.0);

        for (node, time) in f.node_iter() {
            assert_eq!(g.node_time(node).unwrap(), time);
        }
        for ((u, v), time) in f.edge_iter() {
            assert!(g.edge_time(u, v).unwrap() <= time);
        }
        // The original is left untouched
        assert_eq!(f, path_filtration());
    }

    #[test]
    fn test_grounding_unknown_node() {
        let f = path_filtration();
        assert!(matches!(f.ground(vec![(0, 9)]), Err(HomologyError::Lookup(_))));
    }
}
