//! Mapping Module: Chain Maps Induced by Digraph Maps
//!
//! A vertex map φ between two digraphs induces a chain map between their
//! path complexes whenever it sends edges to edges or collapses them:
//!
//! - `Node(v) ↦ Node(φv)`
//! - `Edge(u, v) ↦ Edge(φu, φv)`, or zero when `φu = φv`
//! - 2-cells map through their 2-paths, each path `x → y → z` landing on
//!   zero when an edge collapses, on `DoubleEdge(φx, φy)` when `φx = φz`,
//!   and otherwise on the codomain cells that sum to the path `φx → φy → φz`
//!
//! A codomain path that is not itself a basis cell is rewritten against the
//! base bridge `b` of its endpoints:
//! `x → y → z = LongSquare(x, (b, y), z) + (x → b → z)`. When no triangle
//! covers `x → b → z` that path must cancel within the image of the cell.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

use dashmap::DashMap;
use petgraph::graph::DiGraph;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HomologyError, Result};
use crate::filtration::Filtration;
use crate::homology::{complex_cells, Cell, CellKind, Homology};
use crate::NodeIndex;

/// Matrix of a chain map over GF(2)
///
/// `images[i]` lists, in increasing order, the codomain cells summing to
/// the image of domain cell `i`. An empty list is the zero chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainMap {
    pub images: Vec<Vec<usize>>,
}

impl ChainMap {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Image of a single domain cell
    pub fn image(&self, cell: usize) -> &[usize] {
        &self.images[cell]
    }

    /// Image of a chain given as domain cell indices
    pub fn apply(&self, chain: &[usize]) -> Vec<usize> {
        let mut sum = BTreeSet::new();
        for &cell in chain {
            for &target in &self.images[cell] {
                toggle(&mut sum, target);
            }
        }
        sum.into_iter().collect()
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, item: T) {
    if !set.remove(&item) {
        set.insert(item);
    }
}

/// Lookup tables over the codomain cells
struct Codomain {
    index: DashMap<CellKind, usize>,
    /// Base bridge of every endpoint pair that has long squares
    bases: HashMap<(NodeIndex, NodeIndex), NodeIndex>,
}

impl Codomain {
    fn new(cells: &[Cell]) -> Self {
        let index = DashMap::with_capacity(cells.len());
        cells.par_iter().enumerate().for_each(|(i, cell)| {
            index.insert(cell.kind, i);
        });
        let bases = cells
            .iter()
            .filter_map(|cell| match cell.kind {
                CellKind::LongSquare(x, (base, _), z) => Some(((x, z), base)),
                _ => None,
            })
            .collect();
        Self { index, bases }
    }

    fn find(&self, kind: CellKind) -> Option<usize> {
        self.index.get(&kind).map(|entry| *entry.value())
    }

    fn require(&self, kind: CellKind, domain: &CellKind) -> Result<usize> {
        self.find(kind).ok_or_else(|| {
            HomologyError::Lookup(format!(
                "image {kind} of {domain} is not a cell of the codomain"
            ))
        })
    }
}

/// Image of one 2-path under construction
#[derive(Default)]
struct PathSum {
    cells: BTreeSet<usize>,
    /// Paths with no covering cell, which must cancel in pairs
    uncovered: BTreeSet<(NodeIndex, NodeIndex, NodeIndex)>,
}

impl PathSum {
    fn add_path(
        &mut self,
        codomain: &Codomain,
        (x, y, z): (NodeIndex, NodeIndex, NodeIndex),
        domain: &CellKind,
    ) -> Result<()> {
        if x == y || y == z {
            return Ok(());
        }
        if x == z {
            let cell = codomain.require(CellKind::DoubleEdge(x, y), domain)?;
            toggle(&mut self.cells, cell);
            return Ok(());
        }
        if let Some(cell) = codomain.find(CellKind::Triangle(x, y, z)) {
            toggle(&mut self.cells, cell);
            return Ok(());
        }

        let base = codomain.bases.get(&(x, z)).copied().unwrap_or(y);
        if base != y {
            let square = codomain.require(CellKind::LongSquare(x, (base, y), z), domain)?;
            toggle(&mut self.cells, square);
        }
        match codomain.find(CellKind::Triangle(x, base, z)) {
            Some(triangle) => toggle(&mut self.cells, triangle),
            None => toggle(&mut self.uncovered, (x, base, z)),
        }
        Ok(())
    }

    fn finish(self, domain: &CellKind) -> Result<Vec<usize>> {
        if let Some(&(x, y, z)) = self.uncovered.iter().next() {
            return Err(HomologyError::Lookup(format!(
                "image of {domain} contains the path {x} → {y} → {z}, which no codomain cell covers"
            )));
        }
        Ok(self.cells.into_iter().collect())
    }
}

/// Lift a vertex map to a chain map between two cell complexes
///
/// Fails with [`HomologyError::Lookup`] when a domain vertex is missing
/// from `vertex_map` or a required image is not a codomain cell.
pub fn compute_map(
    domain: &[Cell],
    codomain: &[Cell],
    vertex_map: &HashMap<NodeIndex, NodeIndex>,
) -> Result<ChainMap> {
    let target = Codomain::new(codomain);
    let phi = |v: NodeIndex| {
        vertex_map
            .get(&v)
            .copied()
            .ok_or_else(|| HomologyError::Lookup(format!("vertex {v} has no image")))
    };

    let images = domain
        .par_iter()
        .map(|cell| {
            let kind = &cell.kind;
            match *kind {
                CellKind::Node(v) => Ok(vec![target.require(CellKind::Node(phi(v)?), kind)?]),
                CellKind::Edge(u, v) => {
                    let (fu, fv) = (phi(u)?, phi(v)?);
                    if fu == fv {
                        Ok(vec![])
                    } else {
                        Ok(vec![target.require(CellKind::Edge(fu, fv), kind)?])
                    }
                }
                CellKind::DoubleEdge(i, j) => {
                    let mut sum = PathSum::default();
                    sum.add_path(&target, (phi(i)?, phi(j)?, phi(i)?), kind)?;
                    sum.finish(kind)
                }
                CellKind::Triangle(i, j, k) => {
                    let mut sum = PathSum::default();
                    sum.add_path(&target, (phi(i)?, phi(j)?, phi(k)?), kind)?;
                    sum.finish(kind)
                }
                CellKind::LongSquare(i, (a, b), k) => {
                    let (fi, fk) = (phi(i)?, phi(k)?);
                    let mut sum = PathSum::default();
                    sum.add_path(&target, (fi, phi(a)?, fk), kind)?;
                    sum.add_path(&target, (fi, phi(b)?, fk), kind)?;
                    sum.finish(kind)
                }
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let zero_images = images.iter().filter(|image| image.is_empty()).count();
    debug!(cells = images.len(), zero_images, "computed chain map");
    Ok(ChainMap { images })
}

/// Vertex map sending each domain vertex to the codomain vertex with the
/// same label
///
/// Fails with [`HomologyError::Lookup`] naming a label the codomain lacks,
/// and with [`HomologyError::Input`] when codomain labels are not unique.
pub fn relabelled_inclusion<L>(
    domain: &DiGraph<L, f64>,
    codomain: &DiGraph<L, f64>,
) -> Result<HashMap<NodeIndex, NodeIndex>>
where
    L: Eq + Hash + Debug,
{
    let mut by_label: HashMap<&L, NodeIndex> = HashMap::with_capacity(codomain.node_count());
    for node in codomain.node_indices() {
        let label = &codomain[node];
        if by_label.insert(label, node.index() as NodeIndex).is_some() {
            return Err(HomologyError::Input(format!(
                "codomain label {label:?} appears more than once"
            )));
        }
    }

    domain
        .node_indices()
        .map(|node| {
            let label = &domain[node];
            by_label
                .get(label)
                .map(|&target| (node.index() as NodeIndex, target))
                .ok_or_else(|| {
                    HomologyError::Lookup(format!("label {label:?} is not in the codomain"))
                })
        })
        .collect()
}

/// Sorted cells of the grounded complex of a graph, up to dimension 2
pub fn grounded_cells<L: Sync>(
    graph: &DiGraph<L, f64>,
    homology: &dyn Homology,
) -> Result<Vec<Cell>> {
    let filtration = Filtration::shortest_path(graph)?;
    let grounded = filtration.ground_on(graph)?;
    complex_cells(homology, &[0, 1, 2], &filtration, Some(&grounded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::homology::RegularPathHomology;

    fn diamond(upper: f64, lower: f64) -> DiGraph<u32, f64> {
        let mut g = DiGraph::new();
        let n: Vec<_> = (0..4).map(|i| g.add_node(i)).collect();
        g.add_edge(n[0], n[1], upper);
        g.add_edge(n[1], n[3], upper);
        g.add_edge(n[0], n[2], lower);
        g.add_edge(n[2], n[3], lower);
        g
    }

    /// ∂ ∘ f = f ∘ ∂ over GF(2)
    fn assert_commutes(map: &ChainMap, domain: &[Cell], codomain: &[Cell]) {
        let position = |cells: &[Cell]| -> HashMap<CellKind, usize> {
            cells.iter().enumerate().map(|(i, c)| (c.kind, i)).collect()
        };
        let (dom, cod) = (position(domain), position(codomain));
        let boundary = |cells: &[Cell], index: &HashMap<CellKind, usize>, chain: &[usize]| {
            let mut sum = BTreeSet::new();
            for &i in chain {
                for face in cells[i].boundary() {
                    toggle(&mut sum, index[&face]);
                }
            }
            sum.into_iter().collect::<Vec<_>>()
        };

        for i in 0..domain.len() {
            let lhs = boundary(codomain, &cod, map.image(i));
            let rhs = map.apply(&boundary(domain, &dom, &[i]));
            assert_eq!(lhs, rhs, "chain map does not commute at {}", domain[i].kind);
        }
    }

    #[test]
    fn test_identity_on_diamond() {
        let g1 = diamond(2.0, 3.0);
        let g2 = diamond(1.0, 0.2);
        let domain = grounded_cells(&g1, &RegularPathHomology).unwrap();
        let codomain = grounded_cells(&g2, &RegularPathHomology).unwrap();
        let phi = relabelled_inclusion(&g1, &g2).unwrap();
        let map = compute_map(&domain, &codomain, &phi).unwrap();

        assert_eq!(map.len(), domain.len());
        for (i, cell) in domain.iter().enumerate() {
            let image: Vec<_> = map.image(i).iter().map(|&j| codomain[j].kind).collect();
            assert!(!image.is_empty(), "{} maps to zero", cell.kind);
            match cell.kind {
                CellKind::LongSquare(0, (1, 2), 3) => {
                    let mut image = image;
                    image.sort();
                    assert_eq!(
                        image,
                        vec![CellKind::Triangle(0, 1, 3), CellKind::Triangle(0, 2, 3)]
                    );
                }
                kind => assert_eq!(image, vec![kind]),
            }
        }
        assert_commutes(&map, &domain, &codomain);
    }

    #[test]
    fn test_collapsing_map() {
        // Fold the lower branch of the diamond onto the upper one
        let g1 = diamond(2.0, 3.0);
        let mut g2 = DiGraph::<u32, f64>::new();
        let n: Vec<_> = (0..3).map(|i| g2.add_node(i)).collect();
        g2.add_edge(n[0], n[1], 1.0);
        g2.add_edge(n[1], n[2], 1.0);

        let domain = grounded_cells(&g1, &RegularPathHomology).unwrap();
        let codomain = grounded_cells(&g2, &RegularPathHomology).unwrap();
        let phi: HashMap<NodeIndex, NodeIndex> = [(0, 0), (1, 1), (2, 1), (3, 2)].into();
        let map = compute_map(&domain, &codomain, &phi).unwrap();

        let square = domain
            .iter()
            .position(|c| c.kind == CellKind::LongSquare(0, (1, 2), 3))
            .unwrap();
        assert!(map.image(square).is_empty());
        assert_commutes(&map, &domain, &codomain);
    }

    #[test]
    fn test_degenerate_edge_maps_to_zero() {
        let domain = vec![
            Cell::new(CellKind::Node(0), 0.0),
            Cell::new(CellKind::Node(1), 0.0),
            Cell::new(CellKind::Edge(0, 1), 0.0),
        ];
        let codomain = vec![Cell::new(CellKind::Node(5), 0.0)];
        let phi: HashMap<NodeIndex, NodeIndex> = [(0, 5), (1, 5)].into();
        let map = compute_map(&domain, &codomain, &phi).unwrap();
        assert_eq!(map.images, vec![vec![0], vec![0], vec![]]);
    }

    #[test]
    fn test_missing_images() {
        let domain = vec![
            Cell::new(CellKind::Node(0), 0.0),
            Cell::new(CellKind::Node(1), 0.0),
            Cell::new(CellKind::Edge(0, 1), 0.0),
        ];
        let codomain = vec![
            Cell::new(CellKind::Node(0), 0.0),
            Cell::new(CellKind::Node(1), 0.0),
        ];
        let identity: HashMap<NodeIndex, NodeIndex> = [(0, 0), (1, 1)].into();
        assert!(matches!(
            compute_map(&domain, &codomain, &identity),
            Err(HomologyError::Lookup(_))
        ));

        let partial: HashMap<NodeIndex, NodeIndex> = [(0, 0)].into();
        assert!(matches!(
            compute_map(&domain[..2], &codomain, &partial),
            Err(HomologyError::Lookup(_))
        ));
    }

    #[test]
    fn test_relabelled_inclusion_errors() {
        let mut small = DiGraph::<&str, f64>::new();
        small.add_node("a");
        small.add_node("z");
        let mut big = DiGraph::<&str, f64>::new();
        big.add_node("z");
        big.add_node("a");
        big.add_node("b");

        let phi = relabelled_inclusion(&small, &big).unwrap();
        assert_eq!(phi[&0], 1);
        assert_eq!(phi[&1], 0);

        let err = relabelled_inclusion(&big, &small).unwrap_err();
        assert!(matches!(&err, HomologyError::Lookup(msg) if msg.contains("\"b\"")));

        big.add_node("a");
        assert!(matches!(
            relabelled_inclusion(&small, &big),
            Err(HomologyError::Input(_))
        ));
    }
}
