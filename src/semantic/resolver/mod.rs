//! The resolution pipeline: one worker per package, driven through
//! coordinator-synchronized phases.
//!
//! Phase 0 (discovery, parsing, import wiring) runs sequentially in the
//! project loader before workers start. The three worker phases then run as
//! rayon fan-out/fan-in rounds — the join of each round is the phase
//! barrier, so no worker enters a phase before every worker has left the
//! previous one. Worker failures are carried through the fan-in as error
//! values and surface only after the join, which keeps a failing package
//! from ever deadlocking the coordinator.

mod phases;
mod worker;

pub use phases::{Phase, PhaseEvent};

use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

use crate::semantic::error::{Diagnostic, ResolveError};
use crate::semantic::package::PackageForest;
use crate::semantic::symbol_table::SymbolTable;

/// What a finished run hands back besides the populated table.
#[derive(Debug, Default)]
pub struct Resolution {
    /// References still dangling after the fixing phase.
    pub diagnostics: Vec<Diagnostic>,
    /// Per-package phase completion timestamps, in completion order.
    pub trace: Vec<PhaseEvent>,
}

/// Drive every package through the opening, globals, and fixing phases.
/// Returns once all workers have drained all phases.
pub fn resolve(
    forests: &[PackageForest],
    table: &RwLock<SymbolTable>,
) -> Result<Resolution, ResolveError> {
    let trace = Mutex::new(Vec::new());
    let diagnostics = Mutex::new(Vec::new());

    for phase in [Phase::Opening, Phase::Globals, Phase::Fixing] {
        let outcomes: Vec<Result<(), ResolveError>> = forests
            .par_iter()
            .map(|forest| {
                let started = Instant::now();
                let result = worker::run_phase(phase, forest, table, &diagnostics);
                trace.lock().push(PhaseEvent {
                    package: forest.id,
                    phase,
                    started,
                    finished: Instant::now(),
                });
                result
            })
            .collect();

        // the collect above is the barrier; only now may errors abort
        for outcome in outcomes {
            outcome?;
        }
        debug!(?phase, packages = forests.len(), "phase complete");
    }

    info!(packages = forests.len(), "resolution complete");
    Ok(Resolution {
        diagnostics: diagnostics.into_inner(),
        trace: trace.into_inner(),
    })
}
