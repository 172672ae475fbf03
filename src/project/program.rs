//! The resolved program: package map, query surface, and collaborator
//! mutations.
//!
//! Once `Program::load` returns, the pipeline's concurrency has fully
//! settled and is never resumed; all access through this type is
//! single-threaded by construction (`&self`/`&mut self`).

use parking_lot::RwLock;
use thiserror::Error;
use tracing::info;

use crate::base::Position;
use crate::semantic::package::PackageForest;
use crate::semantic::resolver::{self, PhaseEvent};
use crate::semantic::symbol_table::{PackageId, SymbolId, SymbolTable};
use crate::semantic::{Diagnostic, ResolveError};
use crate::syntax::{NodeId, SourceFile};

use super::loader::{self, LoadConfig};

/// Failures of the position-based query surface.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("no identifier occupies {file}:{line}:{column}")]
    NoSymbolAtPosition {
        file: String,
        line: u32,
        column: u32,
    },
    #[error("no package contains a file named '{file}'")]
    UnknownFile { file: String },
}

/// A fully resolved program.
#[derive(Debug)]
pub struct Program {
    table: SymbolTable,
    forests: Vec<PackageForest>,
    diagnostics: Vec<Diagnostic>,
    trace: Vec<PhaseEvent>,
}

impl Program {
    /// Discover, parse, and resolve the program rooted at
    /// `config.root`. Phase zero runs sequentially, the worker phases in
    /// parallel; the call returns only after every worker has drained
    /// every phase.
    pub fn load(config: &LoadConfig) -> Result<Self, ResolveError> {
        let table = RwLock::new(SymbolTable::new());
        let loaded = loader::load(config, &table)?;
        let resolution = resolver::resolve(&loaded.forests, &table)?;

        let table = table.into_inner();
        info!(
            symbols = table.symbol_count(),
            dangling = resolution.diagnostics.len(),
            "program loaded"
        );
        Ok(Self {
            table,
            forests: loaded.forests,
            diagnostics: resolution.diagnostics,
            trace: resolution.trace,
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The symbol whose declaration or use occupies the exact source
    /// location.
    pub fn find_symbol_by_position(
        &self,
        filename: &str,
        line: u32,
        column: u32,
    ) -> Result<SymbolId, QueryError> {
        let pos = Position::new(line, column);
        self.table
            .symbols()
            .find(|(_, sym)| sym.has_position(filename, pos))
            .map(|(id, _)| id)
            .ok_or_else(|| QueryError::NoSymbolAtPosition {
                file: filename.to_owned(),
                line,
                column,
            })
    }

    /// The package and parsed file for a file base name.
    pub fn find_package_and_file(&self, filename: &str) -> Result<(PackageId, &SourceFile), QueryError> {
        for forest in &self.forests {
            for file in &forest.files {
                if file.name == filename {
                    return Ok((forest.id, file));
                }
            }
        }
        Err(QueryError::UnknownFile {
            file: filename.to_owned(),
        })
    }

    /// The symbol an identifier occurrence resolved to, for collaborators
    /// walking syntax trees.
    pub fn symbol_for_ident(&self, node: NodeId) -> Option<SymbolId> {
        self.table.symbol_for_ident(node)
    }

    /// The full symbol table (arena, scopes, packages, binding table).
    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    /// Mutable model access for collaborators (rename and friends). Only
    /// meaningful after the pipeline has returned, which this type
    /// guarantees.
    pub fn table_mut(&mut self) -> &mut SymbolTable {
        &mut self.table
    }

    pub fn forests(&self) -> &[PackageForest] {
        &self.forests
    }

    /// Dangling references left after the fixing phase.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Phase completion timestamps, for ordering checks and tooling.
    pub fn phase_trace(&self) -> &[PhaseEvent] {
        &self.trace
    }
}
