//! Error and diagnostic types for the resolution pipeline.

use smol_str::SmolStr;
use thiserror::Error;

use crate::base::Position;

use super::symbol_table::CycleError;

/// Fatal conditions that abort a resolution run.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A sidecar configuration file could not be read.
    #[error("failed to read config for package '{package}': {source}")]
    Config {
        package: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read source tree at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A source file failed to parse. Fatal for the whole run: a partially
    /// parsed package has no meaningful semantics downstream.
    #[error("parse error in {file} at {pos}: {message}")]
    Parse {
        file: String,
        pos: Position,
        message: String,
    },

    #[error("package '{path}' imported from {file} was not found")]
    ImportNotFound { path: String, file: String },

    #[error("no source files for package '{name}' in {dir}")]
    EmptyPackage { name: String, dir: String },

    #[error("symbol '{name}' already defined in this scope")]
    DuplicateSymbol { name: String },

    /// Base-type resolution revisited a named type.
    #[error("{0}")]
    Cycle(#[from] CycleError),
}

/// A reference still unresolved after the fixing phase: a genuine dangling
/// identifier, reported by source position rather than crashing the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub name: SmolStr,
    pub file: SmolStr,
    pub pos: Position,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: unresolved reference '{}'", self.file, self.pos, self.name)
    }
}
