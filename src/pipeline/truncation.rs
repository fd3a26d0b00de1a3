//! Truncation strategies
//!
//! Past a certain time the complex is known to have trivial homology, so
//! everything after it is noise from the finite filtration. A truncation
//! drops the bars born at or after its cutoff and clips later deaths to it.

use crate::filtration::Filtration;
use crate::reduction::Diagram;
use crate::FiltrationTime;

/// Post-decomposition cutoff of a diagram
pub trait Truncation: Send + Sync {
    /// `filtration` is the ungrounded filtration of the piece, `grounded`
    /// its grounded version when grounding is enabled
    fn truncate(
        &self,
        diagram: Diagram,
        filtration: &Filtration,
        grounded: Option<&Filtration>,
    ) -> Diagram;
}

/// Cut off once the filtration has become a cone
///
/// A vertex that reaches every other vertex by time `t` (or is reached by
/// every vertex) is the apex of a cone from `t` onwards, and a cone has
/// trivial reduced homology. For grounded filtrations the cone argument
/// only applies once every ground edge sits at its ungrounded time, so the
/// cutoff is pushed past the last such edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConeTime;

impl ConeTime {
    /// Earliest time some vertex becomes an out- or in-apex, `∞` if never
    pub fn apex_time(filtration: &Filtration) -> FiltrationTime {
        let n = filtration.n_nodes();
        let mut out_reach = vec![(0usize, 0.0f64); n];
        let mut in_reach = vec![(0usize, 0.0f64); n];
        for ((u, v), time) in filtration.edge_iter() {
            let out = &mut out_reach[u as usize];
            *out = (out.0 + 1, out.1.max(time));
            let inc = &mut in_reach[v as usize];
            *inc = (inc.0 + 1, inc.1.max(time));
        }

        let apex = |(reached, latest): (usize, f64)| {
            if reached + 1 == n {
                latest
            } else {
                f64::INFINITY
            }
        };
        out_reach
            .into_iter()
            .chain(in_reach)
            .map(apex)
            .fold(f64::INFINITY, f64::min)
    }

    /// Latest ungrounded time of an edge that grounding moved earlier
    pub fn grounding_time(filtration: &Filtration, grounded: &Filtration) -> FiltrationTime {
        grounded
            .edge_iter()
            .filter_map(|((u, v), time)| {
                filtration
                    .try_edge_time(u, v)
                    .filter(|&original| original > time)
            })
            .fold(0.0, f64::max)
    }

    pub fn cutoff(filtration: &Filtration, grounded: Option<&Filtration>) -> FiltrationTime {
        let apex = Self::apex_time(filtration);
        match grounded {
            Some(grounded) => apex.max(Self::grounding_time(filtration, grounded)),
            None => apex,
        }
    }
}

impl Truncation for ConeTime {
    fn truncate(
        &self,
        diagram: Diagram,
        filtration: &Filtration,
        grounded: Option<&Filtration>,
    ) -> Diagram {
        // H0 of a cone is not trivial, only its reduced homology is
        diagram.truncate(Self::cutoff(filtration, grounded), 1)
    }
}

/// Cut off every dimension at a fixed time
#[derive(Debug, Clone, Copy)]
pub struct FixedCutoff(pub FiltrationTime);

impl Truncation for FixedCutoff {
    fn truncate(&self, diagram: Diagram, _: &Filtration, _: Option<&Filtration>) -> Diagram {
        diagram.truncate(self.0, 0)
    }
}
