//! # gofactor-base
//!
//! Core library for Go parsing, AST, and multi-package semantic resolution.
//!
//! Builds a precise, cross-package static semantic model — symbol tables,
//! type graph, and per-expression type inference — as the foundation for
//! source transformations: every identifier occurrence maps to exactly one
//! declaration with a known static type.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project   → discovery, sidecar config, Program facade and queries
//!   ↓
//! semantic  → symbol/type model, expression engine, phased resolver
//!   ↓
//! syntax    → AST types with stable identifier NodeIds
//!   ↓
//! parser    → Logos lexer, recursive-descent parser
//!   ↓
//! base      → Position, Span, LineIndex
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → semantic → project)
// ============================================================================

/// Foundation types: Position, Span, LineIndex
pub mod base;

/// Parser: Logos lexer, recursive-descent parser
pub mod parser;

/// Syntax: AST types with stable identifier ids
pub mod syntax;

/// Semantic model: symbols, scopes, type inference, phased resolution
pub mod semantic;

/// Project management: workspace loading, configuration, queries
pub mod project;

// Re-export foundation types
pub use base::{LineIndex, Position, Span};
pub use project::{LoadConfig, Program, QueryError};
pub use semantic::{
    Diagnostic, ResolveError, Symbol, SymbolId, SymbolKind, SymbolTable,
};
