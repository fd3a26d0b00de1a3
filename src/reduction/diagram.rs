//! Persistence Diagrams
//!
//! A persistence pair `[birth, death)` records a homology class that
//! appears when `birth_cell` enters the filtration and becomes a boundary
//! when `death_cell` enters. Classes that never die are *essential*.
//!
//! Pairs with `birth == death` carry no information and are never stored.
//! Two diagrams compare equal when they hold the same multiset of
//! `(dimension, birth, death)` intervals, whatever cells realise them.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::homology::CellKind;
use crate::{FiltrationTime, NodeIndex};

/// One interval of a persistence diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistencePair {
    pub dimension: usize,
    pub birth: FiltrationTime,
    /// `None` for essential classes
    pub death: Option<FiltrationTime>,
    pub birth_cell: CellKind,
    pub death_cell: Option<CellKind>,
    /// Cycle representing the class, when representatives were requested
    pub representative: Option<Vec<CellKind>>,
}

impl PersistencePair {
    /// Lifetime of the class, `∞` if essential
    pub fn persistence(&self) -> f64 {
        match self.death {
            Some(death) => death - self.birth,
            None => f64::INFINITY,
        }
    }

    /// Does this class live forever?
    pub fn is_essential(&self) -> bool {
        self.death.is_none()
    }

    fn death_or_infinity(&self) -> f64 {
        self.death.unwrap_or(f64::INFINITY)
    }

    fn interval_cmp(&self, other: &Self) -> Ordering {
        self.dimension
            .cmp(&other.dimension)
            .then(self.birth.total_cmp(&other.birth))
            .then(self.death_or_infinity().total_cmp(&other.death_or_infinity()))
    }
}

/// Persistence diagram: pairs ordered by (dimension, birth, death)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagram {
    pairs: Vec<PersistencePair>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a diagram, dropping zero-length pairs
    pub fn from_pairs(pairs: impl IntoIterator<Item = PersistencePair>) -> Self {
        let mut pairs: Vec<_> = pairs
            .into_iter()
            .filter(|p| p.death != Some(p.birth))
            .collect();
        pairs.sort_by(|a, b| a.interval_cmp(b).then(a.birth_cell.cmp(&b.birth_cell)));
        Self { pairs }
    }

    pub fn pairs(&self) -> &[PersistencePair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Sorted `(dimension, birth, death)` triples
    pub fn triples(&self) -> Vec<(usize, FiltrationTime, Option<FiltrationTime>)> {
        self.pairs
            .iter()
            .map(|p| (p.dimension, p.birth, p.death))
            .collect()
    }

    /// Sorted `(dimension, birth, death)` bars, `∞` for essential classes
    pub fn barcode(&self) -> Vec<(usize, FiltrationTime, FiltrationTime)> {
        self.pairs
            .iter()
            .map(|p| (p.dimension, p.birth, p.death_or_infinity()))
            .collect()
    }

    /// Pairs that carry a representative cycle, with that cycle
    pub fn representatives(&self) -> Vec<(&PersistencePair, &[CellKind])> {
        self.pairs
            .iter()
            .filter_map(|p| p.representative.as_deref().map(|rep| (p, rep)))
            .collect()
    }

    /// Get all pairs for dimension d
    pub fn dim(&self, d: usize) -> Vec<&PersistencePair> {
        self.pairs.iter().filter(|p| p.dimension == d).collect()
    }

    /// Get finite pairs for dimension d
    pub fn finite_intervals(&self, d: usize) -> Vec<&PersistencePair> {
        self.pairs
            .iter()
            .filter(|p| p.dimension == d && !p.is_essential())
            .collect()
    }

    /// Get essential pairs for dimension d
    pub fn essential(&self, d: usize) -> Vec<&PersistencePair> {
        self.pairs
            .iter()
            .filter(|p| p.dimension == d && p.is_essential())
            .collect()
    }

    /// Total persistence of the finite pairs in dimension d
    pub fn total_persistence(&self, d: usize) -> f64 {
        self.finite_intervals(d)
            .iter()
            .map(|p| p.persistence())
            .sum()
    }

    /// Shannon entropy of the finite lifetimes in dimension d
    pub fn persistence_entropy(&self, d: usize) -> f64 {
        let lifetimes: Vec<f64> = self
            .finite_intervals(d)
            .iter()
            .map(|p| p.persistence())
            .filter(|&l| l > 0.0)
            .collect();
        let total: f64 = lifetimes.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        lifetimes
            .iter()
            .map(|l| l / total)
            .map(|prob| -prob * prob.ln())
            .sum()
    }

    /// Keep only the pairs whose dimension passes `keep`
    pub fn retain_dimensions(self, keep: impl Fn(usize) -> bool) -> Self {
        Self {
            pairs: self
                .pairs
                .into_iter()
                .filter(|p| keep(p.dimension))
                .collect(),
        }
    }

    /// Cut the diagram off at `cutoff` in every dimension `>= min_dimension`
    ///
    /// Pairs born at or after the cutoff are removed, deaths beyond it
    /// (including essential classes) are clipped to it. Applying the same
    /// truncation twice changes nothing.
    pub fn truncate(self, cutoff: FiltrationTime, min_dimension: usize) -> Self {
        let pairs = self
            .pairs
            .into_iter()
            .filter_map(|mut p| {
                if p.dimension < min_dimension {
                    return Some(p);
                }
                if p.birth >= cutoff {
                    return None;
                }
                if p.death_or_infinity() > cutoff {
                    p.death = Some(cutoff);
                    p.death_cell = None;
                }
                Some(p)
            })
            .collect::<Vec<_>>();
        Self::from_pairs(pairs)
    }

    /// Relabel the vertices of every cell in the diagram
    pub fn map_vertices(self, f: impl Fn(NodeIndex) -> NodeIndex) -> Self {
        let pairs = self.pairs.into_iter().map(|p| PersistencePair {
            birth_cell: p.birth_cell.map_vertices(&f),
            death_cell: p.death_cell.map(|c| c.map_vertices(&f)),
            representative: p
                .representative
                .map(|rep| rep.into_iter().map(|c| c.map_vertices(&f)).collect()),
            ..p
        });
        Self::from_pairs(pairs)
    }

    /// Union of two diagrams
    pub fn merge(self, other: Diagram) -> Self {
        Self::from_pairs(self.pairs.into_iter().chain(other.pairs))
    }
}

impl PartialEq for Diagram {
    fn eq(&self, other: &Self) -> bool {
        self.pairs.len() == other.pairs.len()
            && self
                .pairs
                .iter()
                .zip(&other.pairs)
                .all(|(a, b)| a.interval_cmp(b) == Ordering::Equal)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn pair(dimension: usize, birth: f64, death: Option<f64>) -> PersistencePair {
        PersistencePair {
            dimension,
            birth,
            death,
            birth_cell: CellKind::Node(0),
            death_cell: None,
            representative: None,
        }
    }

    #[test]
    fn test_zero_persistence_dropped() {
        let d = Diagram::from_pairs([pair(1, 2.0, Some(2.0)), pair(1, 1.0, Some(2.0))]);
        assert_eq!(d.len(), 1);
        assert_eq!(d.triples(), vec![(1, 1.0, Some(2.0))]);
    }

    #[test]
    fn test_equality_ignores_cells_and_order() {
        let mut a = pair(0, 0.0, None);
        a.birth_cell = CellKind::Node(3);
        let d1 = Diagram::from_pairs([a, pair(1, 0.0, Some(3.0))]);
        let d2 = Diagram::from_pairs([pair(1, 0.0, Some(3.0)), pair(0, 0.0, None)]);
        assert_eq!(d1, d2);
        assert_ne!(d1, Diagram::from_pairs([pair(0, 0.0, None)]));
    }

    #[test]
    fn test_barcode_uses_infinity() {
        let d = Diagram::from_pairs([pair(0, 0.0, None), pair(0, 0.0, Some(1.0))]);
        assert_eq!(d.barcode(), vec![(0, 0.0, 1.0), (0, 0.0, f64::INFINITY)]);
        assert_eq!(d.essential(0).len(), 1);
        assert!((d.total_persistence(0) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_truncate_clips_and_drops() {
        let d = Diagram::from_pairs([
            pair(0, 0.0, None),
            pair(1, 0.0, None),
            pair(1, 1.0, Some(5.0)),
            pair(1, 4.0, Some(6.0)),
            pair(1, 0.5, Some(2.0)),
        ]);
        let t = d.truncate(4.0, 1);
        assert_eq!(
            t.triples(),
            vec![
                (0, 0.0, None),
                (1, 0.0, Some(4.0)),
                (1, 0.5, Some(2.0)),
                (1, 1.0, Some(4.0)),
            ]
        );
        assert_eq!(t.clone().truncate(4.0, 1), t);
    }

    #[test]
    fn test_entropy_of_equal_lifetimes() {
        let d = Diagram::from_pairs([pair(1, 0.0, Some(1.0)), pair(1, 1.0, Some(2.0))]);
        assert!((d.persistence_entropy(1) - 2.0_f64.ln()).abs() < 1e-10);
        assert_eq!(d.persistence_entropy(0), 0.0);
    }
}
