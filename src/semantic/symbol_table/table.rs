//! The symbol table: arena storage for symbols, scopes, and packages.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::trace;

use crate::semantic::error::ResolveError;
use crate::semantic::package::Package;
use crate::syntax::NodeId;

use super::scope::Scope;
use super::symbol::{Occurrence, PackageId, ScopeId, Symbol, SymbolId, SymbolKind};

/// Central registry of all symbols, scopes, and packages for one resolution
/// run. Arena storage is the single source of truth; everything else holds
/// ids into it. Constructed once per run (the predeclared scope included),
/// so independent runs never share state.
#[derive(Debug)]
pub struct SymbolTable {
    /// Arena storage for all symbols - single source of truth
    arena: Vec<Symbol>,
    scopes: Vec<Scope>,
    packages: Vec<Package>,
    universe: ScopeId,
    /// Predeclared basic types by name, for O(1) access from the engine.
    basics: FxHashMap<SmolStr, SymbolId>,
    /// Global identifier → symbol binding table.
    bindings: FxHashMap<NodeId, SymbolId>,
}

impl SymbolTable {
    /// A fresh table with the predeclared scope installed.
    pub fn new() -> Self {
        let mut table = Self {
            arena: Vec::new(),
            scopes: vec![Scope::new(None)],
            packages: Vec::new(),
            universe: ScopeId(0),
            basics: FxHashMap::default(),
            bindings: FxHashMap::default(),
        };
        crate::semantic::universe::install(&mut table);
        table
    }

    pub fn universe(&self) -> ScopeId {
        self.universe
    }

    // ============================================================
    // Symbol arena
    // ============================================================

    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId::new(self.arena.len());
        self.arena.push(symbol);
        id
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.arena[id.index()]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.arena[id.index()]
    }

    pub fn kind(&self, id: SymbolId) -> &SymbolKind {
        &self.arena[id.index()].kind
    }

    pub fn symbol_count(&self) -> usize {
        self.arena.len()
    }

    /// Iterate all symbols with their ids.
    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.arena
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId::new(i), s))
    }

    /// Rename a symbol in place. Scope bindings key on the old name until a
    /// collaborator re-registers them; occurrences and identifier bindings
    /// stay valid because they are keyed by id.
    pub fn set_name(&mut self, id: SymbolId, name: impl Into<SmolStr>) {
        self.symbol_mut(id).name = name.into();
    }

    // ============================================================
    // Scope arena
    // ============================================================

    pub fn new_scope(&mut self, package: Option<PackageId>) -> ScopeId {
        let id = ScopeId::new(self.scopes.len());
        self.scopes.push(Scope::new(package));
        if let Some(pkg) = package {
            self.packages[pkg.index()].pool.push(id);
        }
        id
    }

    pub fn new_file_scope(&mut self, package: PackageId, file: SmolStr) -> ScopeId {
        let id = ScopeId::new(self.scopes.len());
        self.scopes.push(Scope::for_file(Some(package), file));
        self.packages[package.index()].pool.push(id);
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Link `ancestor` as an opened enclosing scope of `scope`, consulted on
    /// local miss after earlier-opened ancestors.
    pub fn open_scope(&mut self, scope: ScopeId, ancestor: ScopeId) {
        self.scopes[scope.index()].opened.push(ancestor);
    }

    /// Register `id` under its name in `scope`. Fails on duplicate name in
    /// the same table.
    pub fn add_symbol(&mut self, scope: ScopeId, id: SymbolId) -> Result<(), ResolveError> {
        let name = self.symbol(id).name.clone();
        let entries = &mut self.scopes[scope.index()].entries;
        if entries.contains_key(&name) {
            return Err(ResolveError::DuplicateSymbol {
                name: name.to_string(),
            });
        }
        entries.insert(name, id);
        self.symbol_mut(id).scope = Some(scope);
        Ok(())
    }

    /// Allocate and register in one step.
    pub fn insert(&mut self, scope: ScopeId, symbol: Symbol) -> Result<SymbolId, ResolveError> {
        let id = self.alloc(symbol);
        self.add_symbol(scope, id)?;
        Ok(id)
    }

    /// Remove a binding by name, preserving the order of the rest.
    pub fn remove_symbol(&mut self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scopes[scope.index()].entries.shift_remove(name)
    }

    /// Identity membership test in one scope (no chain walking).
    pub fn contains(&self, scope: ScopeId, id: SymbolId) -> bool {
        self.scope(scope).contains(id)
    }

    /// Resolve `name` starting at `scope`. Local bindings win; file-scoped
    /// tables are consulted only when `filename` matches their file;
    /// opened enclosing scopes are walked in declaration order.
    pub fn lookup(&self, scope: ScopeId, name: &str, filename: Option<&str>) -> Option<SymbolId> {
        let s = self.scope(scope);
        let visible = match (&s.file, filename) {
            (Some(scope_file), Some(file)) => scope_file == file,
            (Some(_), None) => false,
            (None, _) => true,
        };
        if visible && let Some(id) = s.get(name) {
            return Some(id);
        }
        for &opened in s.opened() {
            if let Some(id) = self.lookup(opened, name, filename) {
                return Some(id);
            }
        }
        None
    }

    // ============================================================
    // Packages
    // ============================================================

    pub fn add_package(&mut self, path: String, name: SmolStr) -> PackageId {
        let id = PackageId::new(self.packages.len());
        let top = ScopeId::new(self.scopes.len());
        self.scopes.push(Scope::new(Some(id)));
        self.packages.push(Package::new(path, name, top));
        trace!(package = %self.packages[id.index()].name, ?id, "package added");
        id
    }

    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.index()]
    }

    pub fn package_mut(&mut self, id: PackageId) -> &mut Package {
        &mut self.packages[id.index()]
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn package_ids(&self) -> impl Iterator<Item = PackageId> {
        (0..self.packages.len()).map(PackageId::new)
    }

    pub fn find_package_by_path(&self, path: &str) -> Option<PackageId> {
        self.packages
            .iter()
            .position(|p| p.path == path)
            .map(PackageId::new)
    }

    // ============================================================
    // Predeclared basics
    // ============================================================

    pub(crate) fn register_basic(&mut self, name: SmolStr, id: SymbolId) {
        self.basics.insert(name, id);
    }

    /// The predeclared basic type of the given name.
    pub fn basic(&self, name: &str) -> Option<SymbolId> {
        self.basics.get(name).copied()
    }

    /// True when `name` denotes a predeclared basic type.
    pub fn is_basic_name(&self, name: &str) -> bool {
        self.basics.contains_key(name)
    }

    /// True when `name` is any predeclared identifier (type, builtin
    /// function, or constant).
    pub fn is_predeclared(&self, name: &str) -> bool {
        self.scope(self.universe).get(name).is_some()
    }

    // ============================================================
    // Identifier bindings and occurrences
    // ============================================================

    pub fn bind(&mut self, node: NodeId, sym: SymbolId) {
        self.bindings.insert(node, sym);
        self.symbol_mut(sym).idents.insert(node);
    }

    /// Move a binding from one symbol to another (placeholder healing).
    pub fn rebind(&mut self, node: NodeId, from: SymbolId, to: SymbolId) {
        self.symbol_mut(from).idents.remove(&node);
        self.bind(node, to);
    }

    pub fn symbol_for_ident(&self, node: NodeId) -> Option<SymbolId> {
        self.bindings.get(&node).copied()
    }

    pub fn bindings(&self) -> &FxHashMap<NodeId, SymbolId> {
        &self.bindings
    }

    /// Record an occurrence. Pointer types delegate to their base so a
    /// pointer never owns positions of its own.
    pub fn add_position(&mut self, id: SymbolId, occ: Occurrence) {
        let mut target = id;
        loop {
            match self.symbol(target).kind {
                SymbolKind::Pointer { base, .. } => target = base,
                _ => break,
            }
        }
        self.symbol_mut(target).positions.insert(occ);
    }

    // ============================================================
    // Methods on types
    // ============================================================

    /// The method scope of a type, creating it on first use.
    pub fn methods_mut(&mut self, id: SymbolId) -> ScopeId {
        if let SymbolKind::Package { .. } = self.symbol(id).kind {
            panic!("type operations are not valid on package symbols");
        }
        if let Some(scope) = self.symbol(id).methods {
            return scope;
        }
        let package = self.symbol(id).package;
        let scope = self.new_scope(package);
        self.symbol_mut(id).methods = Some(scope);
        scope
    }

    pub fn methods(&self, id: SymbolId) -> Option<ScopeId> {
        if let SymbolKind::Package { .. } = self.symbol(id).kind {
            panic!("type operations are not valid on package symbols");
        }
        self.symbol(id).methods
    }

    pub fn add_method(&mut self, id: SymbolId, method: SymbolId) -> Result<(), ResolveError> {
        let scope = self.methods_mut(id);
        self.add_symbol(scope, method)
    }

    pub fn set_methods(&mut self, id: SymbolId, scope: ScopeId) {
        if let SymbolKind::Package { .. } = self.symbol(id).kind {
            panic!("type operations are not valid on package symbols");
        }
        self.symbol_mut(id).methods = Some(scope);
    }

    /// The type a value-producing symbol contributes in expression position:
    /// a variable's or function's type, the symbol itself otherwise.
    pub fn value_type(&self, id: SymbolId) -> SymbolId {
        match self.symbol(id).kind {
            SymbolKind::Variable { ty, .. } => ty,
            SymbolKind::Func { ty, .. } => ty,
            _ => id,
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
