//! Ordered, nestable symbol containers.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::symbol::{PackageId, ScopeId, SymbolId};

/// A scope: insertion-ordered name bindings plus zero or more "opened"
/// enclosing scopes consulted on local miss (in declaration order).
///
/// A scope with a `file` holds file-scoped bindings (imports): its entries
/// are visible only to lookups carrying the same filename.
#[derive(Debug, Default)]
pub struct Scope {
    pub package: Option<PackageId>,
    pub file: Option<SmolStr>,
    /// Name-indexed bindings; iteration order is insertion order, which is
    /// significant (struct field order, parameter order).
    pub(super) entries: IndexMap<SmolStr, SymbolId>,
    pub(super) opened: Vec<ScopeId>,
}

impl Scope {
    pub fn new(package: Option<PackageId>) -> Self {
        Self {
            package,
            ..Default::default()
        }
    }

    pub fn for_file(package: Option<PackageId>, file: SmolStr) -> Self {
        Self {
            package,
            file: Some(file),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Symbols in insertion order.
    pub fn symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.entries.values().copied()
    }

    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.entries.get(name).copied()
    }

    /// Identity membership test, used for scope-violation checks.
    pub fn contains(&self, id: SymbolId) -> bool {
        self.entries.values().any(|&v| v == id)
    }

    pub fn opened(&self) -> &[ScopeId] {
        &self.opened
    }
}
