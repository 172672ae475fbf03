//! Type algebra: structural/identity equality, base-type resolution,
//! pointer interning.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::symbol::{PackageId, ScopeId, Symbol, SymbolId, SymbolKind};
use super::table::SymbolTable;

/// Raised when the Pointer/Alias chase revisits a named type. The language
/// disallows genuine alias/pointer self-reference, so this aborts the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    pub name: SmolStr,
}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cyclic type chain through '{}'", self.name)
    }
}

impl std::error::Error for CycleError {}

impl SymbolTable {
    // ============================================================
    // Base-type resolution
    // ============================================================

    /// Fully unwrap Pointer/Alias indirection. Revisits are tracked by type
    /// name; anonymous types are excluded from tracking. The chase never
    /// looks inside struct fields, so a struct holding a pointer to itself
    /// is not a cycle — only an Alias/Pointer chain returning to an earlier
    /// named node is.
    pub fn base_type(&self, id: SymbolId) -> Result<SymbolId, CycleError> {
        match self.symbol(id).kind {
            SymbolKind::Pointer { .. } | SymbolKind::Alias { .. } => {
                let mut visited = FxHashSet::default();
                self.chase(id, &mut visited)
            }
            _ => Ok(id),
        }
    }

    fn chase(&self, id: SymbolId, visited: &mut FxHashSet<SmolStr>) -> Result<SymbolId, CycleError> {
        let sym = self.symbol(id);
        if !sym.name.is_empty() {
            if visited.contains(&sym.name) {
                return Err(CycleError {
                    name: sym.name.clone(),
                });
            }
            visited.insert(sym.name.clone());
        }
        match sym.kind {
            SymbolKind::Pointer { base, .. } => self.chase(base, visited),
            SymbolKind::Alias { base } => self.chase(base, visited),
            _ => Ok(id),
        }
    }

    /// Base-chase to a struct, when the chain ends in one.
    pub fn base_struct(&self, id: SymbolId) -> Option<(SymbolId, ScopeId)> {
        let base = self.base_type(id).ok()?;
        match self.symbol(base).kind {
            SymbolKind::Struct { fields } => Some((base, fields)),
            _ => None,
        }
    }

    // ============================================================
    // Pointer interning
    // ============================================================

    /// The name a pointer chain bottoms out at, with the `*`s stripped.
    pub fn pointer_root_name(&self, id: SymbolId) -> SmolStr {
        let name = &self.symbol(id).name;
        SmolStr::new(name.trim_start_matches('*'))
    }

    /// Depth of the `*` chain under a pointer; 1 for a pointer to a
    /// non-pointer.
    pub fn pointer_depth(&self, id: SymbolId) -> u32 {
        match self.symbol(id).kind {
            SymbolKind::Pointer { depth, .. } => depth,
            _ => 0,
        }
    }

    /// Return the pointer to `base` interned in `package`, registering a
    /// fresh one when the (base name, depth) pair is new. Two pointer
    /// expressions over the same base and depth are thereby identity-equal.
    pub fn intern_pointer(&mut self, package: PackageId, base: SymbolId) -> SymbolId {
        let (root, depth) = match self.symbol(base).kind {
            SymbolKind::Pointer { depth, .. } => (self.pointer_root_name(base), depth + 1),
            _ => (self.symbol(base).name.clone(), 1),
        };
        if let Some(&existing) = self.package(package).pointers.get(&(root.clone(), depth)) {
            return existing;
        }
        let name = SmolStr::new(format!("*{}", self.symbol(base).name));
        let id = self.alloc(
            Symbol::new(name, SymbolKind::Pointer { base, depth }).with_package(Some(package)),
        );
        self.package_mut(package).pointers.insert((root, depth), id);
        id
    }

    // ============================================================
    // Equality
    // ============================================================

    /// Named types compare by identity; unnamed types structurally, with
    /// named members compared by identity — which keeps recursion finite
    /// through cyclic named types.
    pub fn equals(&self, a: SymbolId, b: SymbolId) -> bool {
        let sa = self.symbol(a);
        let sb = self.symbol(b);
        if !sa.name.is_empty() {
            return a == b;
        }
        if !sb.name.is_empty() {
            return false;
        }
        match (&sa.kind, &sb.kind) {
            (SymbolKind::Basic, _) | (SymbolKind::Alias { .. }, _) => {
                panic!("anonymous basic or alias type")
            }
            (SymbolKind::Struct { fields: fa }, SymbolKind::Struct { fields: fb }) => {
                self.equals_ordered_variables(*fa, *fb)
            }
            (
                SymbolKind::Map {
                    key: ka,
                    value: va,
                },
                SymbolKind::Map {
                    key: kb,
                    value: vb,
                },
            ) => self.equals(*ka, *kb) && self.equals(*va, *vb),
            (
                SymbolKind::Chan {
                    value: va,
                    dir: da,
                },
                SymbolKind::Chan {
                    value: vb,
                    dir: db,
                },
            ) => da == db && self.equals(*va, *vb),
            (SymbolKind::Interface, SymbolKind::Interface) => {
                match (sa.methods, sb.methods) {
                    (None, None) => true,
                    (Some(ma), Some(mb)) => self.equals_ordered_methods(ma, mb),
                    _ => {
                        // one empty scope and one absent scope are the same
                        let len = |m: Option<ScopeId>| m.map_or(0, |s| self.scope(s).len());
                        len(sa.methods) == 0 && len(sb.methods) == 0
                    }
                }
            }
            (
                SymbolKind::Array {
                    elem: ea,
                    len: la,
                },
                SymbolKind::Array {
                    elem: eb,
                    len: lb,
                },
            ) => la == lb && self.equals(*ea, *eb),
            (SymbolKind::Pointer { base: ba, .. }, SymbolKind::Pointer { base: bb, .. }) => {
                self.equals(*ba, *bb)
            }
            (
                SymbolKind::Function {
                    params: pa,
                    results: ra,
                    ..
                },
                SymbolKind::Function {
                    params: pb,
                    results: rb,
                    ..
                },
            ) => self.equals_variable_types(*pa, *pb) && self.equals_variable_types(*ra, *rb),
            _ => false,
        }
    }

    /// Ordered (name, type) pairs, the struct-field rule: reordering fields
    /// breaks equality.
    fn equals_ordered_variables(&self, a: ScopeId, b: ScopeId) -> bool {
        let sa = self.scope(a);
        let sb = self.scope(b);
        if sa.len() != sb.len() {
            return false;
        }
        sa.symbols()
            .zip(sb.symbols())
            .all(|(x, y)| self.equals_variables(x, y))
    }

    pub fn equals_variables(&self, a: SymbolId, b: SymbolId) -> bool {
        let sa = self.symbol(a);
        let sb = self.symbol(b);
        if sa.name != sb.name {
            return false;
        }
        match (&sa.kind, &sb.kind) {
            (SymbolKind::Variable { ty: ta, .. }, SymbolKind::Variable { ty: tb, .. }) => {
                self.equals(*ta, *tb)
            }
            _ => false,
        }
    }

    pub fn equals_methods(&self, a: SymbolId, b: SymbolId) -> bool {
        let sa = self.symbol(a);
        let sb = self.symbol(b);
        if sa.name != sb.name {
            return false;
        }
        match (&sa.kind, &sb.kind) {
            (SymbolKind::Func { ty: ta, .. }, SymbolKind::Func { ty: tb, .. }) => {
                self.equals(*ta, *tb)
            }
            _ => false,
        }
    }

    fn equals_ordered_methods(&self, a: ScopeId, b: ScopeId) -> bool {
        let sa = self.scope(a);
        let sb = self.scope(b);
        if sa.len() != sb.len() {
            return false;
        }
        sa.symbols()
            .zip(sb.symbols())
            .all(|(x, y)| self.equals_methods(x, y))
    }

    // ============================================================
    // Member selection
    // ============================================================

    /// Find a method named `name` on `t`, walking the Alias/Pointer chain
    /// since methods hang off the first named node of a receiver chain.
    /// Package operands resolve their top-level scope instead.
    pub fn find_method_on(&self, t: SymbolId, name: &str) -> Option<SymbolId> {
        if let SymbolKind::Package { package } = self.symbol(t).kind {
            let top = self.package(package).top;
            return self.scope(top).get(name);
        }
        let mut current = t;
        let mut guard = 0;
        loop {
            if let Some(methods) = self.symbol(current).methods
                && let Some(found) = self.scope(methods).get(name)
            {
                return Some(found);
            }
            current = match self.symbol(current).kind {
                SymbolKind::Pointer { base, .. } => base,
                SymbolKind::Alias { base } => base,
                _ => return None,
            };
            guard += 1;
            if guard > 64 {
                return None;
            }
        }
    }

    /// Resolve a member of `t` the way selectors do: method scope, then the
    /// underlying struct's field scope, then a package's top-level scope.
    pub fn select_member(&self, t: SymbolId, name: &str) -> Option<SymbolId> {
        if let Some(found) = self.find_method_on(t, name)
            && matches!(self.symbol(found).kind, SymbolKind::Func { .. })
        {
            return Some(found);
        }
        if let Some((_, fields)) = self.base_struct(t)
            && let Some(found) = self.lookup(fields, name, None)
        {
            return Some(found);
        }
        if let SymbolKind::Package { package } = self.symbol(t).kind {
            let top = self.package(package).top;
            return self.scope(top).get(name);
        }
        None
    }

    /// Parameter/result lists compare by type only, positionally.
    fn equals_variable_types(&self, a: ScopeId, b: ScopeId) -> bool {
        let sa = self.scope(a);
        let sb = self.scope(b);
        if sa.len() != sb.len() {
            return false;
        }
        sa.symbols().zip(sb.symbols()).all(|(x, y)| {
            let tx = self.value_type(x);
            let ty = self.value_type(y);
            self.equals(tx, ty)
        })
    }
}
