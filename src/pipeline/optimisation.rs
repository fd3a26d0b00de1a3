//! Graph-level optimisations
//!
//! Each strategy rewrites the input into smaller pieces whose diagrams,
//! merged, equal the diagram of the whole graph:
//!
//! - weakly connected components are independent,
//! - a vertex touching a single directed edge hangs off the rest of the
//!   graph as a wedge summand with trivial homology,
//! - a piece whose underlying graph is a tree only contributes one
//!   essential 0-class.
//!
//! The last two rely on every node and ground edge entering at 0 and on
//! regular path homology splitting over wedges. They are wedge prunings:
//! [`OptimisationChain::apply_exact`] skips them when either fails.

use std::collections::{BTreeMap, HashSet};

use petgraph::graph::DiGraph;
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;

use crate::NodeIndex;

/// A label-free piece of the input graph
///
/// `origin[v]` is the input vertex that piece-local vertex `v` stands for.
#[derive(Debug, Clone)]
pub struct Piece {
    pub graph: DiGraph<(), f64>,
    pub origin: Vec<NodeIndex>,
}

impl Piece {
    /// The whole graph as a single piece
    pub fn from_graph<L>(graph: &DiGraph<L, f64>) -> Self {
        Self {
            graph: graph.map(|_, _| (), |_, &weight| weight),
            origin: (0..graph.node_count() as NodeIndex).collect(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Subgraph induced by the given local vertices, kept in the given order
    fn induced(&self, keep: &[usize]) -> Piece {
        let mut local = vec![None; self.node_count()];
        let mut graph = DiGraph::with_capacity(keep.len(), 0);
        let mut origin = Vec::with_capacity(keep.len());
        for &v in keep {
            local[v] = Some(graph.add_node(()));
            origin.push(self.origin[v]);
        }
        for edge in self.graph.edge_references() {
            if let (Some(s), Some(t)) = (local[edge.source().index()], local[edge.target().index()])
            {
                graph.add_edge(s, t, *edge.weight());
            }
        }
        Piece { graph, origin }
    }

    /// Distinct ordered pairs `(u, v)`, `u ≠ v`, joined by some edge
    fn directed_pairs(&self) -> Vec<(usize, usize)> {
        let pairs: HashSet<(usize, usize)> = self
            .graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
            .filter(|(u, v)| u != v)
            .collect();
        let mut pairs: Vec<_> = pairs.into_iter().collect();
        pairs.sort_unstable();
        pairs
    }

    /// Local vertices grouped by weakly connected component, in vertex order
    fn components(&self) -> Vec<Vec<usize>> {
        let mut union_find = UnionFind::<usize>::new(self.node_count());
        for edge in self.graph.edge_references() {
            union_find.union(edge.source().index(), edge.target().index());
        }
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for v in 0..self.node_count() {
            groups.entry(union_find.find(v)).or_default().push(v);
        }
        let mut groups: Vec<_> = groups.into_values().collect();
        groups.sort_by_key(|group| group[0]);
        groups
    }
}

/// A rewrite of one piece into independent pieces
pub trait Optimisation: Send + Sync {
    fn apply(&self, piece: Piece) -> Vec<Piece>;

    /// Whether the rewrite deletes wedge summands
    ///
    /// Such a step is only exact for grounded filtrations under a homology
    /// that splits over wedges.
    fn prunes_wedges(&self) -> bool {
        false
    }
}

/// Split into weakly connected components
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentSplit;

impl Optimisation for ComponentSplit {
    fn apply(&self, piece: Piece) -> Vec<Piece> {
        let components = piece.components();
        match components.len() {
            0 => return Vec::new(),
            1 => return vec![piece],
            _ => {}
        }
        components
            .iter()
            .map(|component| piece.induced(component))
            .collect()
    }
}

/// Repeatedly delete vertices incident to exactly one directed edge
#[derive(Debug, Clone, Copy, Default)]
pub struct AppendagePrune;

impl Optimisation for AppendagePrune {
    fn apply(&self, piece: Piece) -> Vec<Piece> {
        let n = piece.node_count();
        let mut incident: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (u, v) in piece.directed_pairs() {
            incident[u].push(v);
            incident[v].push(u);
        }
        let mut degree: Vec<usize> = incident.iter().map(Vec::len).collect();
        let mut alive = vec![true; n];
        let mut leaves: Vec<usize> = (0..n).filter(|&v| degree[v] == 1).collect();

        while let Some(v) = leaves.pop() {
            if !alive[v] || degree[v] != 1 {
                continue;
            }
            alive[v] = false;
            for &w in &incident[v] {
                if alive[w] {
                    degree[w] -= 1;
                    if degree[w] == 1 {
                        leaves.push(w);
                    }
                }
            }
        }

        if alive.iter().all(|&a| a) {
            return vec![piece];
        }
        let keep: Vec<usize> = (0..n).filter(|&v| alive[v]).collect();
        vec![piece.induced(&keep)]
    }

    fn prunes_wedges(&self) -> bool {
        true
    }
}

/// Replace a piece whose underlying graph is a forest by isolated vertices
///
/// Opposite edges `u → v`, `v → u` count as a cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyPrune;

impl Optimisation for EmptyPrune {
    fn apply(&self, piece: Piece) -> Vec<Piece> {
        let mut union_find = UnionFind::<usize>::new(piece.node_count());
        let is_forest = piece
            .directed_pairs()
            .into_iter()
            .all(|(u, v)| union_find.union(u, v));
        if !is_forest {
            return vec![piece];
        }
        piece
            .components()
            .iter()
            .map(|tree| piece.induced(&tree[..1]))
            .collect()
    }

    fn prunes_wedges(&self) -> bool {
        true
    }
}

/// Optimisations applied one after another
pub struct OptimisationChain {
    steps: Vec<Box<dyn Optimisation>>,
}

impl OptimisationChain {
    pub fn new(steps: Vec<Box<dyn Optimisation>>) -> Self {
        Self { steps }
    }

    /// Leave the input untouched
    pub fn none() -> Self {
        Self::new(Vec::new())
    }

    /// Components, then appendages, then trivial pieces
    pub fn all() -> Self {
        Self::new(vec![
            Box::new(ComponentSplit),
            Box::new(AppendagePrune),
            Box::new(EmptyPrune),
        ])
    }

    /// Append a step to the chain
    pub fn then(mut self, step: impl Optimisation + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply the chain, skipping wedge prunings unless `wedge_pruning`
    pub fn apply_exact(&self, piece: Piece, wedge_pruning: bool) -> Vec<Piece> {
        self.steps
            .iter()
            .filter(|step| wedge_pruning || !step.prunes_wedges())
            .fold(vec![piece], |pieces, step| {
                pieces
                    .into_iter()
                    .flat_map(|piece| step.apply(piece))
                    .collect()
            })
    }
}

impl Default for OptimisationChain {
    fn default() -> Self {
        Self::all()
    }
}

impl Optimisation for OptimisationChain {
    fn apply(&self, piece: Piece) -> Vec<Piece> {
        self.apply_exact(piece, true)
    }

    fn prunes_wedges(&self) -> bool {
        self.steps.iter().any(|step| step.prunes_wedges())
    }
}
