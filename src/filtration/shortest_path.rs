//! Shortest-Path Filtration
//!
//! The distance oracle behind the default filtration: one Dijkstra run per
//! source, collected into a dense distance matrix. Unreachable pairs are
//! `∞` and never enter the filtration.
//!
//! Externally computed distances can be supplied either as a matrix
//! ([`Filtration::from_distance_matrix`]) or as per-source rows
//! ([`Filtration::from_distances`]).

use ndarray::Array2;
use petgraph::algo::dijkstra;
use petgraph::graph::{DiGraph, NodeIndex as GraphIndex};
use petgraph::visit::EdgeRef;
use rayon::prelude::*;

use super::Filtration;
use crate::error::{HomologyError, Result};
use crate::{FiltrationTime, NodeIndex};

/// Compute the all-pairs shortest-path distance matrix of a weighted digraph
///
/// Entry `[i, j]` is `d(i, j)`, `∞` when `j` is unreachable from `i`.
/// Weights must be finite and non-negative.
pub fn all_pairs_distances<N: Sync>(graph: &DiGraph<N, f64>) -> Result<Array2<f64>> {
    validate_weights(graph)?;
    let n = graph.node_count();

    let rows: Vec<Vec<(usize, f64)>> = (0..n)
        .into_par_iter()
        .map(|source| {
            dijkstra(graph, GraphIndex::new(source), None, |edge| *edge.weight())
                .into_iter()
                .map(|(target, distance)| (target.index(), distance))
                .collect()
        })
        .collect();

    let mut distances = Array2::<f64>::from_elem((n, n), f64::INFINITY);
    for (source, row) in rows.into_iter().enumerate() {
        for (target, distance) in row {
            distances[[source, target]] = distance;
        }
    }

    Ok(distances)
}

pub(crate) fn validate_weights<N>(graph: &DiGraph<N, f64>) -> Result<()> {
    for edge in graph.edge_references() {
        let weight = *edge.weight();
        if !weight.is_finite() || weight < 0.0 {
            return Err(HomologyError::Input(format!(
                "edge ({}, {}) has weight {weight}, expected a finite non-negative value",
                edge.source().index(),
                edge.target().index()
            )));
        }
    }
    Ok(())
}

impl Filtration {
    /// Shortest-path filtration of a weighted digraph
    ///
    /// Every node enters at 0 and every ordered pair `(u, v)`, `u ≠ v`, with
    /// `v` reachable from `u` enters at `d(u, v)`.
    pub fn shortest_path<N: Sync>(graph: &DiGraph<N, f64>) -> Result<Self> {
        let distances = all_pairs_distances(graph)?;
        Self::from_distance_matrix(&distances)
    }

    /// Build a filtration from a precomputed square distance matrix
    pub fn from_distance_matrix(distances: &Array2<f64>) -> Result<Self> {
        let n = distances.nrows();
        if distances.ncols() != n {
            return Err(HomologyError::Input(format!(
                "distance matrix must be square, got {}x{}",
                n,
                distances.ncols()
            )));
        }

        let edges = distances
            .indexed_iter()
            .filter(|&((i, j), d)| i != j && !d.is_infinite())
            .map(|((i, j), &d)| ((i as NodeIndex, j as NodeIndex), d));

        Self::new(vec![0.0; n], edges)
    }

    /// Build a filtration from per-source distance rows
    ///
    /// This is the shape a distance oracle hands over: an iterable of
    /// `(node, {target: distance})`. Infinite distances and self distances
    /// are skipped.
    pub fn from_distances<I, R>(n_nodes: usize, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NodeIndex, R)>,
        R: IntoIterator<Item = (NodeIndex, FiltrationTime)>,
    {
        let edges = rows.into_iter().flat_map(|(source, targets)| {
            targets
                .into_iter()
                .filter(move |&(target, d)| target != source && !d.is_infinite())
                .map(move |(target, d)| ((source, target), d))
        });
        Self::new(vec![0.0; n_nodes], edges)
    }

    /// Ground this filtration on the edges of a digraph
    pub fn ground_on<N>(&self, graph: &DiGraph<N, f64>) -> Result<Self> {
        self.ground(graph.edge_references().map(|edge| {
            (
                edge.source().index() as NodeIndex,
                edge.target().index() as NodeIndex,
            )
        }))
    }
}
