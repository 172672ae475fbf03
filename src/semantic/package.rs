//! Package entities and their parsed sources.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::syntax::SourceFile;

use super::symbol_table::{PackageId, ScopeId, SymbolId};

/// A compilation unit: one directory of source files under one namespace.
///
/// Not a symbol itself — `SymbolKind::Package` symbols wrap it, one per
/// importing file. Lives inside the symbol table so every worker can reach
/// other packages' top scopes through the shared model.
#[derive(Debug)]
pub struct Package {
    /// Full filesystem path to the package source directory.
    pub path: String,
    pub name: SmolStr,
    /// Top-level declarations.
    pub top: ScopeId,
    /// Every scope this package owns, including nested ones; the fixing
    /// phase walks this pool.
    pub pool: Vec<ScopeId>,
    /// Per-file import table: file → imported-package symbols.
    pub imports: FxHashMap<SmolStr, Vec<SymbolId>>,
    /// Per-file import scope, linked as an openable ancestor of the package
    /// scope during the opening phase.
    pub import_scopes: FxHashMap<SmolStr, ScopeId>,
    /// True when the package came from a library root rather than the
    /// project tree.
    pub is_external: bool,
    /// Pointer interning table keyed by (base type name, depth).
    pub pointers: FxHashMap<(SmolStr, u32), SymbolId>,
    /// Unresolved placeholders allocated while parsing this package,
    /// drained by the fixing phase.
    pub unresolved: Vec<SymbolId>,
}

impl Package {
    pub fn new(path: String, name: SmolStr, top: ScopeId) -> Self {
        Self {
            path,
            name,
            top,
            pool: vec![top],
            imports: FxHashMap::default(),
            import_scopes: FxHashMap::default(),
            is_external: false,
            pointers: FxHashMap::default(),
            unresolved: Vec::new(),
        }
    }

    /// The import symbol for `imported` visible in `filename`, if any.
    pub fn import_in_file(&self, filename: &str, find: impl Fn(SymbolId) -> bool) -> Option<SymbolId> {
        self.imports
            .get(filename)?
            .iter()
            .copied()
            .find(|&id| find(id))
    }
}

/// The parsed syntax forest of one package. Immutable once the discovery
/// phase has finished; workers share it without locks.
#[derive(Debug)]
pub struct PackageForest {
    pub id: PackageId,
    pub path: String,
    pub files: Vec<SourceFile>,
}
