//! # TDA-Path-Homology
//!
//! Grounded Persistent Path Homology of Edge-Weighted Digraphs
//!
//! ## Theoretical Framework
//!
//! A weighted digraph carries a natural filtration: at scale `t` the pair
//! `(u, v)` is connected once the shortest path from `u` to `v` has length
//! at most `t`. Path homology reads the directed structure of each stage,
//! and persistence tracks how its classes appear and vanish as `t` grows.
//!
//! Grounding attaches the graph itself at time 0, so the 1-cycles of the
//! input are present from the start and the diagram records when the
//! shortest-path structure fills them in (GrPPH).
//!
//! ### Methodology
//!
//! 1. **Filtration**: all-pairs shortest paths, optionally grounded
//! 2. **Cells**: nodes, edges and the regular path complex 2-cells
//!    (double edges, triangles, long squares)
//! 3. **Sparsification**: free-face collapses, then sparse boundary columns
//! 4. **Decomposition**: GF(2) column reduction into persistence pairs
//! 5. **Orchestration**: component splitting, appendage pruning, cone-time
//!    truncation
//!
//! Digraph maps lift to chain maps between the resulting complexes
//! ([`compute_map`]).
//!
//! ## References
//!
//! - Grigor'yan, Lin, Muranov, Yau, "Homologies of path complexes and
//!   digraphs" (2012)
//! - Chowdhury & Mémoli, "Persistent path homology of directed networks"
//!   (2018)
//! - Chaplin, Harrington, Tillmann, "Grounded persistent path homology: a
//!   stable, topological descriptor for weighted digraphs" (2022)

pub mod error;
pub mod filtration;
pub mod homology;
pub mod mapping;
pub mod pipeline;
pub mod reduction;
pub mod sparsify;

/// Index of a vertex in a digraph or filtration
pub type NodeIndex = u32;

/// Time at which a cell enters the filtration
pub type FiltrationTime = f64;

pub use error::{HomologyError, Result};

pub use filtration::{all_pairs_distances, Filtration};

pub use homology::{
    complex_cells, sort_for_decomposition, Cell, CellKind, DirectedFlagHomology, Homology,
    RegularPathHomology,
};

pub use sparsify::{
    ListSparsifier, ParallelSparsifier, SparseColumn, SparseColumnStream, Sparsifier,
    StreamingSparsifier,
};

pub use reduction::{
    Backend, BettiCurve, BettiNumbers, Diagram, ParallelReduction, PersistencePair,
    StandardReduction,
};

pub use pipeline::{
    AppendagePrune, ComponentSplit, ConeTime, EmptyPrune, FixedCutoff, Optimisation,
    OptimisationChain, Piece, Pipeline, PipelineConfig, PipelineResult, Truncation,
};

pub use mapping::{compute_map, grounded_cells, relabelled_inclusion, ChainMap};
