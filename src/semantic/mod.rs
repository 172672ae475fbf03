//! # Semantic Analysis
//!
//! Builds the cross-package semantic model: symbol tables, the type graph,
//! and per-expression type inference, resolved through a phase-barriered
//! pipeline with one worker per package.

pub mod error;
pub mod expr;
pub mod fixer;
pub mod globals;
pub mod package;
pub mod resolver;
pub mod symbol_table;
pub mod universe;

pub use error::{Diagnostic, ResolveError};
pub use expr::{ExprEngine, TypedExpr};
pub use package::{Package, PackageForest};
pub use resolver::{Phase, PhaseEvent, Resolution, resolve};
pub use symbol_table::{
    ArrayLen, ChanDir, CycleError, Occurrence, PackageId, PendingRef, Scope, ScopeId, Symbol,
    SymbolId, SymbolKind, SymbolTable,
};
