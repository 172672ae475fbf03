//! Symbol arena entries: the closed set of symbol and type variants.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::Position;
use crate::syntax::NodeId;

/// Unique identifier for a symbol in the arena.
/// Uses u32 for compact storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unique identifier for a scope in the scope arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unique identifier for a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackageId(pub u32);

impl PackageId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One recorded occurrence of a symbol in source, deduplicated by
/// file + line + column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Occurrence {
    pub file: SmolStr,
    pub pos: Position,
}

/// Array length in the type model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayLen {
    Fixed(i64),
    /// `[]T`
    Slice,
    /// `[...]T` whose length is still pending on its literal
    Ellipsis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Send,
    Recv,
    Both,
}

/// What an Unresolved placeholder is standing in for, carried until the
/// fixing phase can heal it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingRef {
    /// A plain identifier that missed every reachable scope.
    Ident {
        node: NodeId,
        name: SmolStr,
        file: SmolStr,
        pos: Position,
    },
    /// A selector whose member could not be found on `operand` yet.
    Member {
        operand: SymbolId,
        node: NodeId,
        name: SmolStr,
        file: SmolStr,
        pos: Position,
    },
}

impl PendingRef {
    pub fn name(&self) -> &SmolStr {
        match self {
            PendingRef::Ident { name, .. } | PendingRef::Member { name, .. } => name,
        }
    }

    pub fn occurrence(&self) -> Occurrence {
        match self {
            PendingRef::Ident { file, pos, .. } | PendingRef::Member { file, pos, .. } => {
                Occurrence {
                    file: file.clone(),
                    pos: *pos,
                }
            }
        }
    }

    pub fn node(&self) -> NodeId {
        match self {
            PendingRef::Ident { node, .. } | PendingRef::Member { node, .. } => *node,
        }
    }
}

/// The closed set of symbol variants. The variant set is fixed by the source
/// language's grammar; every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    /// Predeclared basic type (`int`, `string`, ...), identified by name.
    Basic,
    Alias {
        base: SymbolId,
    },
    Array {
        elem: SymbolId,
        len: ArrayLen,
    },
    Struct {
        fields: ScopeId,
    },
    /// Interned per (base name, depth); `depth` counts the `*` chain.
    Pointer {
        base: SymbolId,
        depth: u32,
    },
    /// Methods live in the symbol's method scope.
    Interface,
    Map {
        key: SymbolId,
        value: SymbolId,
    },
    Chan {
        value: SymbolId,
        dir: ChanDir,
    },
    Function {
        params: ScopeId,
        results: ScopeId,
        receiver: Option<ScopeId>,
    },
    /// Placeholder for a not-yet-registered reference.
    Unresolved {
        pending: PendingRef,
    },
    /// Wraps a package entity; not a type. Calling type operations on it is
    /// a programming error.
    Package {
        package: PackageId,
    },
    Variable {
        ty: SymbolId,
        is_type_switch: bool,
    },
    /// A function or method value (distinct from its Function type).
    Func {
        ty: SymbolId,
        locals: ScopeId,
        is_interface_method: bool,
    },
}

/// A named program entity. Mutated in place through the arena; never freed
/// during a resolution run because scopes, other symbols, and syntax
/// bindings all hold its id.
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Empty name marks an anonymous (structural) type.
    pub name: SmolStr,
    pub kind: SymbolKind,
    /// Scope where the symbol is declared, when any.
    pub scope: Option<ScopeId>,
    pub package: Option<PackageId>,
    /// Source occurrences, deduplicated by file + line + column.
    pub positions: FxHashSet<Occurrence>,
    /// Identifier nodes bound to this symbol.
    pub idents: FxHashSet<NodeId>,
    /// Method scope; populated lazily for types that gain methods.
    pub methods: Option<ScopeId>,
}

pub(crate) const NO_NAME: &str = "";

impl Symbol {
    pub fn new(name: impl Into<SmolStr>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            scope: None,
            package: None,
            positions: FxHashSet::default(),
            idents: FxHashSet::default(),
            methods: None,
        }
    }

    pub fn with_package(mut self, package: Option<PackageId>) -> Self {
        self.package = package;
        self
    }

    pub fn with_scope(mut self, scope: Option<ScopeId>) -> Self {
        self.scope = scope;
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.name == NO_NAME
    }

    /// True for the variants that denote types.
    pub fn is_type(&self) -> bool {
        !matches!(
            self.kind,
            SymbolKind::Package { .. } | SymbolKind::Variable { .. } | SymbolKind::Func { .. }
        )
    }

    pub fn has_position(&self, file: &str, pos: Position) -> bool {
        self.positions.contains(&Occurrence {
            file: SmolStr::new(file),
            pos,
        })
    }
}
