//! Phase identities and the completion trace.

use std::time::Instant;

use crate::semantic::symbol_table::PackageId;

/// The three worker phases. Discovery/parsing is phase zero, run
/// sequentially by the coordinator before workers exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Link per-file import scopes as openable ancestors of the package
    /// scope.
    Opening,
    /// Register and type all top-level declarations.
    Globals,
    /// Heal Unresolved placeholders now that globals exist program-wide.
    Fixing,
}

/// One worker's completion record for one phase. The fixing phase of any
/// package must start after the globals phase of every package has
/// finished; the trace makes that ordering observable.
#[derive(Debug, Clone, Copy)]
pub struct PhaseEvent {
    pub package: PackageId,
    pub phase: Phase,
    pub started: Instant,
    pub finished: Instant,
}
