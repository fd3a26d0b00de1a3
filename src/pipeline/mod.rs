//! Pipeline Module: Grounded Persistent Path Homology End to End
//!
//! `Pipeline::run` is a pure function of (graph, configuration):
//!
//! 1. Validate the edge weights
//! 2. Optimise: split the graph into independent pieces. Appendages and
//!    trees are only pruned for grounded regular path homology
//! 3. Per piece, in parallel:
//!    - shortest-path filtration, grounded on the piece itself if enabled
//!    - 0- and 1-cells from the (grounded) filtration, 2-cells from the
//!      ungrounded one
//!    - sort, then decompose the sparsified columns as they are emitted
//!    - keep the homology dimensions the cells can resolve, truncate
//! 4. Map piece-local vertices back to the input and merge the diagrams
//!
//! Dimension `k` is reported only when both `k` and `k + 1` are among the
//! configured cell dimensions: without `(k + 1)`-cells nothing in degree
//! `k` could ever die.

mod optimisation;
mod truncation;

pub use optimisation::{
    AppendagePrune, ComponentSplit, EmptyPrune, Optimisation, OptimisationChain, Piece,
};
pub use truncation::{ConeTime, FixedCutoff, Truncation};

use petgraph::graph::DiGraph;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{HomologyError, Result};
use crate::filtration::{validate_weights, Filtration};
use crate::homology::{check_dimensions, complex_cells, Homology, RegularPathHomology};
use crate::reduction::{Backend, Diagram, StandardReduction};
use crate::sparsify::{ParallelSparsifier, Sparsifier};

/// Configuration for a path homology pipeline
pub struct PipelineConfig {
    /// Cell dimensions to generate, each in {0, 1, 2}, closed under taking faces
    pub dimensions: Vec<usize>,
    /// Which 2-cells fill the complex
    pub homology: Box<dyn Homology>,
    /// Ground the filtration on the input graph
    pub grounded: bool,
    pub optimisation: OptimisationChain,
    /// `None` reports the raw diagram
    pub truncation: Option<Box<dyn Truncation>>,
    pub sparsifier: Box<dyn Sparsifier>,
    pub backend: Box<dyn Backend>,
    /// Attach a representative cycle to every class
    pub with_representatives: bool,
    /// Run on a dedicated pool of this many threads instead of the global one
    pub threads: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dimensions: vec![0, 1, 2],
            homology: Box::new(RegularPathHomology),
            grounded: true,
            optimisation: OptimisationChain::all(),
            truncation: Some(Box::new(ConeTime)),
            sparsifier: Box::new(ParallelSparsifier::new()),
            backend: Box::new(StandardReduction::new()),
            with_representatives: false,
            threads: None,
        }
    }
}

impl PipelineConfig {
    pub fn with_dimensions(mut self, dimensions: impl IntoIterator<Item = usize>) -> Self {
        self.dimensions = dimensions.into_iter().collect();
        self
    }

    pub fn with_homology(mut self, homology: impl Homology + 'static) -> Self {
        self.homology = Box::new(homology);
        self
    }

    pub fn with_grounded(mut self, grounded: bool) -> Self {
        self.grounded = grounded;
        self
    }

    pub fn with_optimisation(mut self, optimisation: OptimisationChain) -> Self {
        self.optimisation = optimisation;
        self
    }

    pub fn with_truncation(mut self, truncation: impl Truncation + 'static) -> Self {
        self.truncation = Some(Box::new(truncation));
        self
    }

    pub fn without_truncation(mut self) -> Self {
        self.truncation = None;
        self
    }

    pub fn with_sparsifier(mut self, sparsifier: impl Sparsifier + 'static) -> Self {
        self.sparsifier = Box::new(sparsifier);
        self
    }

    pub fn with_backend(mut self, backend: impl Backend + 'static) -> Self {
        self.backend = Box::new(backend);
        self
    }

    pub fn with_representatives(mut self, with_representatives: bool) -> Self {
        self.with_representatives = with_representatives;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
}

/// Output of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub diagram: Diagram,
    /// Cells generated over all pieces
    pub cell_count: usize,
    /// Columns left after sparsification
    pub column_count: usize,
}

/// A validated, reusable pipeline
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Validate a configuration
    ///
    /// Dimensions are deduplicated and sorted. Fails with
    /// [`HomologyError::UnsupportedDimension`] for a dimension above 2 and
    /// with [`HomologyError::Input`] for a zero thread count or a dimension
    /// set missing the faces of one of its cells.
    pub fn new(mut config: PipelineConfig) -> Result<Self> {
        check_dimensions(config.dimensions.iter().copied())?;
        config.dimensions.sort_unstable();
        config.dimensions.dedup();
        if let Some(gap) = (0..config.dimensions.len()).find(|&d| config.dimensions[d] != d) {
            return Err(HomologyError::Input(format!(
                "dimensions {:?} lack {gap}, the faces of dimension {} cells",
                config.dimensions,
                gap + 1
            )));
        }
        if config.threads == Some(0) {
            return Err(HomologyError::Input(
                "thread count must be at least 1".to_string(),
            ));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Compute the persistence diagram of a weighted digraph
    pub fn run<L: Sync>(&self, graph: &DiGraph<L, f64>) -> Result<PipelineResult> {
        match self.config.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?;
                pool.install(|| self.run_in_pool(graph))
            }
            None => self.run_in_pool(graph),
        }
    }

    fn run_in_pool<L: Sync>(&self, graph: &DiGraph<L, f64>) -> Result<PipelineResult> {
        validate_weights(graph)?;

        let wedge_pruning = self.config.grounded && self.config.homology.supports_wedge_pruning();
        let pieces = self
            .config
            .optimisation
            .apply_exact(Piece::from_graph(graph), wedge_pruning);
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            pieces = pieces.len(),
            wedge_pruning,
            "optimised input"
        );

        let results = pieces
            .par_iter()
            .map(|piece| self.run_piece(piece))
            .collect::<Result<Vec<_>>>()?;

        let result = results.into_iter().fold(
            PipelineResult {
                diagram: Diagram::new(),
                cell_count: 0,
                column_count: 0,
            },
            |acc, piece| PipelineResult {
                diagram: acc.diagram.merge(piece.diagram),
                cell_count: acc.cell_count + piece.cell_count,
                column_count: acc.column_count + piece.column_count,
            },
        );

        info!(
            pairs = result.diagram.len(),
            cells = result.cell_count,
            columns = result.column_count,
            "computed persistence diagram"
        );
        Ok(result)
    }

    fn run_piece(&self, piece: &Piece) -> Result<PipelineResult> {
        let config = &self.config;
        let filtration = Filtration::shortest_path(&piece.graph)?;
        let grounded = if config.grounded {
            Some(filtration.ground_on(&piece.graph)?)
        } else {
            None
        };
        let cells = complex_cells(
            config.homology.as_ref(),
            &config.dimensions,
            &filtration,
            grounded.as_ref(),
        )?;
        let cell_count = cells.len();
        debug!(nodes = piece.node_count(), cells = cell_count, "built cells");

        let mut column_count = 0;
        let diagram = {
            let mut columns = config.sparsifier.columns(cells).inspect(|column| {
                if column.is_ok() {
                    column_count += 1;
                }
            });
            config
                .backend
                .decompose_stream(&mut columns, config.with_representatives)?
        };
        let diagram = diagram.retain_dimensions(|k| {
            config.dimensions.contains(&k) && config.dimensions.contains(&(k + 1))
        });
        debug!(columns = column_count, pairs = diagram.len(), "decomposed");

        let diagram = match &config.truncation {
            Some(truncation) => truncation.truncate(diagram, &filtration, grounded.as_ref()),
            None => diagram,
        };
        debug!(pairs = diagram.len(), "truncated");

        Ok(PipelineResult {
            diagram: diagram.map_vertices(|v| piece.origin[v as usize]),
            cell_count,
            column_count,
        })
    }
}

impl Default for Pipeline {
    /// Grounded persistent path homology with every optimisation
    fn default() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }
}
