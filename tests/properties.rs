use std::collections::{BTreeSet, HashMap};

use petgraph::graph::DiGraph;
use proptest::prelude::*;

use tda_path_homology::{
    compute_map, grounded_cells, relabelled_inclusion, Cell, CellKind, ChainMap, Diagram,
    DirectedFlagHomology, Filtration, ListSparsifier, NodeIndex, OptimisationChain,
    ParallelReduction, ParallelSparsifier, Pipeline, PipelineConfig, PipelineResult,
    RegularPathHomology, StreamingSparsifier,
};

/// Weights are multiples of 1/4 so path lengths add up exactly
fn build(n: usize, edges: &[(usize, usize, u32)]) -> DiGraph<u32, f64> {
    let mut g = DiGraph::new();
    let nodes: Vec<_> = (0..n as u32).map(|i| g.add_node(i)).collect();
    for &(u, v, w) in edges {
        g.add_edge(nodes[u], nodes[v], f64::from(w) * 0.25);
    }
    g
}

fn digraph() -> impl Strategy<Value = (usize, Vec<(usize, usize, u32)>)> {
    (1usize..7).prop_flat_map(|n| {
        (
            Just(n),
            proptest::collection::vec((0..n, 0..n, 1u32..20), 0..(3 * n)),
        )
    })
}

fn run(config: PipelineConfig, graph: &DiGraph<u32, f64>) -> PipelineResult {
    Pipeline::new(config).unwrap().run(graph).unwrap()
}

fn boundary(cells: &[Cell], index: &HashMap<CellKind, usize>, chain: &[usize]) -> Vec<usize> {
    let mut sum = BTreeSet::new();
    for &i in chain {
        for face in cells[i].boundary() {
            let j = index[&face];
            if !sum.remove(&j) {
                sum.insert(j);
            }
        }
    }
    sum.into_iter().collect()
}

fn commutes(map: &ChainMap, domain: &[Cell], codomain: &[Cell]) -> bool {
    let position = |cells: &[Cell]| -> HashMap<CellKind, usize> {
        cells.iter().enumerate().map(|(i, c)| (c.kind, i)).collect()
    };
    let (dom, cod) = (position(domain), position(codomain));
    (0..domain.len()).all(|i| {
        boundary(codomain, &cod, map.image(i)) == map.apply(&boundary(domain, &dom, &[i]))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn diagram_independent_of_thread_count((n, edges) in digraph()) {
        let g = build(n, &edges);
        let single = run(PipelineConfig::default().with_threads(1), &g);
        let several = run(PipelineConfig::default().with_threads(3), &g);
        prop_assert_eq!(single.diagram.triples(), several.diagram.triples());
        prop_assert_eq!(single.column_count, several.column_count);
    }

    #[test]
    fn strategies_do_not_change_diagram((n, edges) in digraph()) {
        let g = build(n, &edges);
        let expected = run(PipelineConfig::default().without_truncation(), &g).diagram;
        let configs = [
            PipelineConfig::default().with_sparsifier(ListSparsifier::new()),
            PipelineConfig::default().with_sparsifier(ListSparsifier::without_collapse()),
            PipelineConfig::default().with_sparsifier(StreamingSparsifier::new()),
            PipelineConfig::default().with_sparsifier(ParallelSparsifier::without_collapse()),
            PipelineConfig::default().with_backend(ParallelReduction::new()),
            PipelineConfig::default().with_representatives(true),
        ];
        for config in configs {
            prop_assert_eq!(&run(config.without_truncation(), &g).diagram, &expected);
        }
    }

    #[test]
    fn optimisations_are_exact((n, edges) in digraph()) {
        let g = build(n, &edges);
        for grounded in [true, false] {
            for flag in [false, true] {
                let config = || {
                    let config = PipelineConfig::default()
                        .with_grounded(grounded)
                        .without_truncation();
                    if flag {
                        config.with_homology(DirectedFlagHomology)
                    } else {
                        config
                    }
                };
                let plain = config().with_optimisation(OptimisationChain::none());
                prop_assert_eq!(run(plain, &g).diagram, run(config(), &g).diagram);
            }
        }
    }

    #[test]
    fn cells_enter_after_their_faces((n, edges) in digraph()) {
        let g = build(n, &edges);
        let cells = grounded_cells(&g, &RegularPathHomology).unwrap();
        let times: HashMap<CellKind, f64> =
            cells.iter().map(|c| (c.kind, c.entrance_time)).collect();
        for cell in &cells {
            for face in cell.boundary() {
                prop_assert!(times[&face] <= cell.entrance_time);
            }
        }
    }

    #[test]
    fn grounding_never_postpones((n, edges) in digraph()) {
        let g = build(n, &edges);
        let f = Filtration::shortest_path(&g).unwrap();
        let grounded = f.ground_on(&g).unwrap();
        for (node, time) in f.node_iter() {
            prop_assert_eq!(grounded.node_time(node).unwrap(), time);
        }
        for ((u, v), time) in f.edge_iter() {
            prop_assert!(grounded.edge_time(u, v).unwrap() <= time);
        }
        prop_assert_eq!(grounded.n_edges(), f.n_edges());
    }

    #[test]
    fn identity_map_is_a_chain_map((n, edges) in digraph()) {
        let g = build(n, &edges);
        let cells = grounded_cells(&g, &RegularPathHomology).unwrap();
        let identity: HashMap<NodeIndex, NodeIndex> = (0..n as NodeIndex).map(|v| (v, v)).collect();
        let map = compute_map(&cells, &cells, &identity).unwrap();
        for i in 0..cells.len() {
            prop_assert_eq!(map.image(i), &[i][..]);
        }
        prop_assert!(commutes(&map, &cells, &cells));
    }

    #[test]
    fn subgraph_inclusion_is_a_chain_map((n, edges) in digraph(), keep in any::<u64>()) {
        let full = build(n, &edges);
        let kept: Vec<_> = edges
            .iter()
            .enumerate()
            .filter(|(i, _)| (keep >> (i % 64)) & 1 == 1)
            .map(|(_, &e)| e)
            .collect();
        let sub = build(n, &kept);

        let domain = grounded_cells(&sub, &RegularPathHomology).unwrap();
        let codomain = grounded_cells(&full, &RegularPathHomology).unwrap();
        let phi = relabelled_inclusion(&sub, &full).unwrap();
        let map = compute_map(&domain, &codomain, &phi).unwrap();
        prop_assert!(commutes(&map, &domain, &codomain));
    }

    #[test]
    fn truncation_is_idempotent((n, edges) in digraph(), cutoff in 0u32..40) {
        let g = build(n, &edges);
        let diagram = run(PipelineConfig::default().without_truncation(), &g).diagram;
        let cutoff = f64::from(cutoff) * 0.25;
        let once = diagram.truncate(cutoff, 1);
        let twice = once.clone().truncate(cutoff, 1);
        prop_assert_eq!(&once, &twice);
        for pair in once.pairs().iter().filter(|p| p.dimension >= 1) {
            prop_assert!(pair.birth < cutoff);
            prop_assert!(pair.death.is_some_and(|d| d <= cutoff));
        }
    }
}

#[test]
fn result_serializes_to_json() {
    let g = build(4, &[(0, 1, 8), (1, 3, 8), (0, 2, 12), (2, 3, 12)]);
    let result = run(PipelineConfig::default().with_representatives(true), &g);
    let json = serde_json::to_string(&result).unwrap();
    let back: PipelineResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
    assert_eq!(back.diagram.triples(), vec![(0, 0.0, None), (1, 0.0, Some(3.0))]);

    let empty: Diagram = serde_json::from_str(&serde_json::to_string(&Diagram::new()).unwrap()).unwrap();
    assert!(empty.is_empty());
}
