//! Per-package phase execution.

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::semantic::error::{Diagnostic, ResolveError};
use crate::semantic::package::PackageForest;
use crate::semantic::symbol_table::SymbolTable;
use crate::semantic::{fixer, globals};

use super::Phase;

pub(super) fn run_phase(
    phase: Phase,
    forest: &PackageForest,
    table: &RwLock<SymbolTable>,
    diagnostics: &Mutex<Vec<Diagnostic>>,
) -> Result<(), ResolveError> {
    debug!(?phase, package = %forest.path, "worker phase start");
    match phase {
        Phase::Opening => {
            open_import_scopes(forest, table);
            Ok(())
        }
        Phase::Globals => globals::parse_globals(forest, table),
        Phase::Fixing => {
            let dangling = fixer::fix_package(forest, table)?;
            diagnostics.lock().extend(dangling);
            Ok(())
        }
    }
}

/// Phase A: every file's import scope becomes an openable ancestor of the
/// package scope, after the predeclared scope attached in phase zero.
fn open_import_scopes(forest: &PackageForest, table: &RwLock<SymbolTable>) {
    let mut t = table.write();
    let top = t.package(forest.id).top;
    let scopes: Vec<_> = forest
        .files
        .iter()
        .filter_map(|file| {
            t.package(forest.id)
                .import_scopes
                .get(file.name.as_str())
                .copied()
        })
        .collect();
    for scope in scopes {
        t.open_scope(top, scope);
    }
}
