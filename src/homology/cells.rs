//! Cells of the path complex
//!
//! A cell is identified by its kind (dimension plus supporting vertices);
//! the entrance time rides along but takes no part in equality or hashing.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::{FiltrationTime, NodeIndex};

/// Identity of a basis element of the path complex
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum CellKind {
    /// `i`
    Node(NodeIndex),
    /// `i → j`
    Edge(NodeIndex, NodeIndex),
    /// `i → j → i`
    DoubleEdge(NodeIndex, NodeIndex),
    /// `i → j → k`, entering no earlier than `i → k`
    Triangle(NodeIndex, NodeIndex, NodeIndex),
    /// `i → a → k` plus `i → b → k`, where `i → k` has not yet entered
    LongSquare(NodeIndex, (NodeIndex, NodeIndex), NodeIndex),
}

impl CellKind {
    pub fn dimension(&self) -> usize {
        match self {
            CellKind::Node(_) => 0,
            CellKind::Edge(_, _) => 1,
            CellKind::DoubleEdge(_, _)
            | CellKind::Triangle(_, _, _)
            | CellKind::LongSquare(_, _, _) => 2,
        }
    }

    /// Faces of this cell over GF(2)
    pub fn boundary(&self) -> Vec<CellKind> {
        match *self {
            CellKind::Node(_) => vec![],
            CellKind::Edge(i, j) => vec![CellKind::Node(i), CellKind::Node(j)],
            CellKind::DoubleEdge(i, j) => vec![CellKind::Edge(i, j), CellKind::Edge(j, i)],
            CellKind::Triangle(i, j, k) => vec![
                CellKind::Edge(i, j),
                CellKind::Edge(j, k),
                CellKind::Edge(i, k),
            ],
            CellKind::LongSquare(i, (a, b), k) => vec![
                CellKind::Edge(i, a),
                CellKind::Edge(i, b),
                CellKind::Edge(a, k),
                CellKind::Edge(b, k),
            ],
        }
    }

    /// Supporting vertices in path order
    pub fn vertices(&self) -> Vec<NodeIndex> {
        match *self {
            CellKind::Node(i) => vec![i],
            CellKind::Edge(i, j) => vec![i, j],
            CellKind::DoubleEdge(i, j) => vec![i, j, i],
            CellKind::Triangle(i, j, k) => vec![i, j, k],
            CellKind::LongSquare(i, (a, b), k) => vec![i, a, b, k],
        }
    }

    /// Relabel every supporting vertex
    pub fn map_vertices(self, f: impl Fn(NodeIndex) -> NodeIndex) -> CellKind {
        match self {
            CellKind::Node(i) => CellKind::Node(f(i)),
            CellKind::Edge(i, j) => CellKind::Edge(f(i), f(j)),
            CellKind::DoubleEdge(i, j) => CellKind::DoubleEdge(f(i), f(j)),
            CellKind::Triangle(i, j, k) => CellKind::Triangle(f(i), f(j), f(k)),
            CellKind::LongSquare(i, (a, b), k) => CellKind::LongSquare(f(i), (f(a), f(b)), f(k)),
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKind::Node(i) => write!(f, "Node({i})"),
            CellKind::Edge(i, j) => write!(f, "Edge({i},{j})"),
            CellKind::DoubleEdge(i, j) => write!(f, "DoubleEdge({i},{j})"),
            CellKind::Triangle(i, j, k) => write!(f, "Triangle({i},{j},{k})"),
            CellKind::LongSquare(i, (a, b), k) => write!(f, "LongSquare({i},{a},{b},{k})"),
        }
    }
}

/// A cell together with the time it enters the filtration
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    pub kind: CellKind,
    pub entrance_time: FiltrationTime,
}

impl Cell {
    pub fn new(kind: CellKind, entrance_time: FiltrationTime) -> Self {
        Self {
            kind,
            entrance_time,
        }
    }

    pub fn dimension(&self) -> usize {
        self.kind.dimension()
    }

    pub fn boundary(&self) -> Vec<CellKind> {
        self.kind.boundary()
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

/// Sort cells into decomposition order: dimension, then entrance time
///
/// The sort is stable, so cells tied on both keep their generation order.
pub fn sort_for_decomposition(cells: &mut [Cell]) {
    cells.sort_by(|a, b| {
        a.dimension()
            .cmp(&b.dimension())
            .then(a.entrance_time.total_cmp(&b.entrance_time))
    });
}
