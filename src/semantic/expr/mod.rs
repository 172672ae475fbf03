//! Expression type engine.
//!
//! Computes the static type(s) of every expression form against the shared
//! symbol table. One engine instance is scoped to a package + file + lookup
//! scope; its mutable configuration tracks position recording (off during
//! speculative re-typing), the pinned field scope of a keyed struct
//! literal, and the ambient element type of elided composite entries.
//!
//! An identifier that misses every reachable scope yields a distinguished
//! Unresolved placeholder bound to that occurrence — never a silent
//! default. Placeholders are healed during the fixing phase.

mod call;
mod composite;
mod selector;
mod type_expr;

#[cfg(test)]
mod tests;

use parking_lot::RwLock;
use smol_str::SmolStr;
use tracing::warn;

use crate::base::Position;
use crate::semantic::error::ResolveError;
use crate::semantic::symbol_table::{
    ArrayLen, Occurrence, PackageId, PendingRef, ScopeId, Symbol, SymbolId, SymbolKind,
    SymbolTable,
};
use crate::syntax::{BinaryOp, Expr, Ident, LitKind, UnaryOp};

/// The 0..N ordered result types of an expression, plus the surfaced
/// literal integer used for ellipsis-length computation.
#[derive(Debug, Clone, Default)]
pub struct TypedExpr {
    pub types: Vec<SymbolId>,
    pub index: Option<i64>,
}

impl TypedExpr {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn one(id: SymbolId) -> Self {
        Self {
            types: vec![id],
            index: None,
        }
    }

    pub fn pair(a: SymbolId, b: SymbolId) -> Self {
        Self {
            types: vec![a, b],
            index: None,
        }
    }

    pub fn first(&self) -> Option<SymbolId> {
        self.types.first().copied()
    }
}

/// Per-package, per-file expression typing context.
pub struct ExprEngine<'a> {
    table: &'a RwLock<SymbolTable>,
    pub pkg: PackageId,
    pub file: SmolStr,
    /// Ambient scope identifiers resolve against.
    pub scope: ScopeId,
    /// Record identifier occurrences as source positions. Disabled during
    /// speculative re-typing so occurrences are not double-counted.
    pub record_positions: bool,
    /// Pinned struct-field scope, consulted instead of the ambient scope
    /// while typing keyed struct-literal elements.
    field_scope: Option<ScopeId>,
    search_in_fields: bool,
    /// Element type inherited by an elided composite-literal entry.
    ambient_elem: Option<SymbolId>,
    /// Set when the last identifier denoted a type name rather than a
    /// value; drives method-expression construction in selectors.
    type_name_used: bool,
}

impl<'a> ExprEngine<'a> {
    pub fn new(
        table: &'a RwLock<SymbolTable>,
        pkg: PackageId,
        file: SmolStr,
        scope: ScopeId,
    ) -> Self {
        Self {
            table,
            pkg,
            file,
            scope,
            record_positions: true,
            field_scope: None,
            search_in_fields: false,
            ambient_elem: None,
            type_name_used: false,
        }
    }

    pub(crate) fn table(&self) -> &'a RwLock<SymbolTable> {
        self.table
    }

    pub(crate) fn with_positions_off<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.record_positions;
        self.record_positions = false;
        let result = f(self);
        self.record_positions = saved;
        result
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    pub fn type_of(&mut self, expr: &Expr) -> Result<TypedExpr, ResolveError> {
        match expr {
            Expr::Lit { kind, text, .. } => Ok(self.type_of_lit(*kind, text)),
            Expr::Binary { op, x, y } => self.type_of_binary(*op, x, y),
            Expr::Unary { op, x, pos } => self.type_of_unary(*op, x, *pos),
            Expr::Star { x, .. } => self.type_of_star(x),
            Expr::Call { fun, args } => self.type_of_call(fun, args),
            Expr::Composite { ty, elts, .. } => self.type_of_composite(ty.as_deref(), elts),
            Expr::KeyValue { key, value } => self.type_of_key_value(key, value),
            Expr::Ident(ident) => Ok(self.type_of_ident(ident)),
            Expr::Index { x, index } => self.type_of_index(x, index),
            Expr::Selector { x, sel } => self.type_of_selector(x, sel),
            Expr::Slice { x, low, high } => self.type_of_slice(x, low.as_deref(), high.as_deref()),
            Expr::TypeAssert { x, ty } => self.type_of_type_assert(x, ty.as_deref()),
            Expr::Paren(inner) => self.type_of(inner),
            Expr::FuncLit { ty, .. } => {
                // the literal's body is typed by a later pass; its type is
                // derived without re-recording occurrences
                let ft = self.with_positions_off(|e| e.function_type(ty))?;
                Ok(TypedExpr::one(ft))
            }
            Expr::ArrayType { .. }
            | Expr::StructType { .. }
            | Expr::InterfaceType { .. }
            | Expr::MapType { .. }
            | Expr::ChanType { .. }
            | Expr::FuncType { .. } => {
                // type conversions and composite literal types
                let ty = self.type_symbol(expr)?;
                Ok(TypedExpr::one(ty))
            }
        }
    }

    // =========================================================================
    // Literals
    // =========================================================================

    fn type_of_lit(&mut self, kind: LitKind, text: &str) -> TypedExpr {
        let table = self.table.read();
        let basic = |name: &str| table.basic(name).expect("predeclared types are installed");
        let mut typed = TypedExpr::one(match kind {
            LitKind::Int => basic("int"),
            LitKind::Float => basic("float64"),
            LitKind::Char => basic("byte"),
            LitKind::Str => basic("string"),
            LitKind::Imag => basic("complex128"),
        });
        typed.index = match kind {
            LitKind::Int => int_value(text),
            LitKind::Char => char_value(text),
            _ => None,
        };
        typed
    }

    // =========================================================================
    // Binary and unary operators
    // =========================================================================

    fn type_of_binary(
        &mut self,
        op: BinaryOp,
        x: &Expr,
        y: &Expr,
    ) -> Result<TypedExpr, ResolveError> {
        let tx = self.type_of(x)?.first();
        let ty = self.type_of(y)?.first();

        if op.is_comparison() || op == BinaryOp::Send {
            let table = self.table.read();
            return Ok(TypedExpr::one(
                table.basic("bool").expect("predeclared types are installed"),
            ));
        }

        let (a, b) = match (tx, ty) {
            (Some(a), Some(b)) => (a, b),
            (Some(a), None) => return Ok(TypedExpr::one(a)),
            (None, Some(b)) => return Ok(TypedExpr::one(b)),
            (None, None) => return Ok(TypedExpr::none()),
        };

        let table = self.table.read();
        let a_default = matches!(table.symbol(a).kind, SymbolKind::Basic);
        let b_default = matches!(table.symbol(b).kind, SymbolKind::Basic);
        let unified = match (a_default, b_default) {
            (true, false) => b,
            (false, true) => a,
            _ => a,
        };
        Ok(TypedExpr::one(unified))
    }

    fn type_of_unary(
        &mut self,
        op: UnaryOp,
        x: &Expr,
        _pos: Position,
    ) -> Result<TypedExpr, ResolveError> {
        let operand = self.type_of(x)?;
        let Some(t) = operand.first() else {
            return Ok(TypedExpr::none());
        };
        match op {
            UnaryOp::Plus | UnaryOp::Minus | UnaryOp::Xor | UnaryOp::Not => Ok(TypedExpr::one(t)),
            UnaryOp::And => {
                let mut table = self.table.write();
                let ptr = table.intern_pointer(self.pkg, t);
                Ok(TypedExpr::one(ptr))
            }
            UnaryOp::Recv => {
                let table = self.table.read();
                let base = table.base_type(t)?;
                match table.symbol(base).kind {
                    SymbolKind::Chan { value, .. } => {
                        let boolean =
                            table.basic("bool").expect("predeclared types are installed");
                        Ok(TypedExpr::pair(value, boolean))
                    }
                    SymbolKind::Unresolved { .. } => Ok(TypedExpr::one(base)),
                    _ => Ok(TypedExpr::none()),
                }
            }
        }
    }

    /// `*X`: a dereference when `X` is a value, a pointer type when `X`
    /// named a type (a conversion such as `(*T)(v)`).
    fn type_of_star(&mut self, x: &Expr) -> Result<TypedExpr, ResolveError> {
        let operand = self.type_of(x)?;
        let Some(t) = operand.first() else {
            return Ok(TypedExpr::none());
        };
        if self.type_name_used {
            let mut table = self.table.write();
            let ptr = table.intern_pointer(self.pkg, t);
            return Ok(TypedExpr::one(ptr));
        }
        // unwrap aliases until the pointer shows; cycles in the chain are
        // fatal as everywhere else
        let table = self.table.read();
        table.base_type(t)?;
        let mut current = t;
        loop {
            match table.kind(current) {
                SymbolKind::Pointer { base, .. } => return Ok(TypedExpr::one(*base)),
                SymbolKind::Alias { base } => current = *base,
                SymbolKind::Unresolved { .. } => return Ok(TypedExpr::one(current)),
                _ => return Ok(TypedExpr::one(t)),
            }
        }
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    fn type_of_ident(&mut self, ident: &Ident) -> TypedExpr {
        let lookup_scope = if self.search_in_fields {
            self.field_scope.unwrap_or(self.scope)
        } else {
            self.scope
        };

        let found = {
            let table = self.table.read();
            table.lookup(lookup_scope, &ident.name, Some(&self.file))
        };

        match found {
            Some(id) => {
                let kind_is_value;
                let result;
                {
                    let mut table = self.table.write();
                    table.bind(ident.id, id);
                    if self.record_positions {
                        table.add_position(
                            id,
                            Occurrence {
                                file: self.file.clone(),
                                pos: ident.pos,
                            },
                        );
                    }
                    match table.symbol(id).kind {
                        SymbolKind::Variable { ty, .. } => {
                            kind_is_value = true;
                            result = ty;
                        }
                        SymbolKind::Func { ty, .. } => {
                            kind_is_value = true;
                            result = ty;
                        }
                        SymbolKind::Package { .. } => {
                            kind_is_value = true;
                            result = id;
                        }
                        _ => {
                            kind_is_value = false;
                            result = id;
                        }
                    }
                }
                if !kind_is_value {
                    self.type_name_used = true;
                }
                TypedExpr::one(result)
            }
            None => {
                warn!(name = %ident.name, file = %self.file, "identifier not found, deferring");
                TypedExpr::one(self.unresolved_ident(ident))
            }
        }
    }

    // =========================================================================
    // Index, slice, type assertion
    // =========================================================================

    fn type_of_index(&mut self, x: &Expr, index: &Expr) -> Result<TypedExpr, ResolveError> {
        let operand = self.type_of(x)?;
        self.type_of(index)?;
        let Some(t) = operand.first() else {
            return Ok(TypedExpr::none());
        };
        let table = self.table.read();
        let base = table.base_type(t)?;
        match table.symbol(base).kind {
            SymbolKind::Array { elem, .. } => Ok(TypedExpr::one(elem)),
            SymbolKind::Map { value, .. } => {
                let boolean = table.basic("bool").expect("predeclared types are installed");
                Ok(TypedExpr::pair(value, boolean))
            }
            SymbolKind::Basic => Ok(TypedExpr::one(
                table.basic("byte").expect("predeclared types are installed"),
            )),
            SymbolKind::Unresolved { .. } => Ok(TypedExpr::one(base)),
            _ => Ok(TypedExpr::none()),
        }
    }

    fn type_of_slice(
        &mut self,
        x: &Expr,
        low: Option<&Expr>,
        high: Option<&Expr>,
    ) -> Result<TypedExpr, ResolveError> {
        let operand = self.type_of(x)?;
        if let Some(low) = low {
            self.type_of(low)?;
        }
        if let Some(high) = high {
            self.type_of(high)?;
        }
        let Some(t) = operand.first() else {
            return Ok(TypedExpr::none());
        };

        // slicing an array yields a slice; the original array type is
        // untouched (copy-on-convert)
        let mut table = self.table.write();
        if let SymbolKind::Array { elem, len } = table.symbol(t).kind
            && len != ArrayLen::Slice
        {
            let name = table.symbol(t).name.clone();
            let package = table.symbol(t).package;
            let slice = table.alloc(
                Symbol::new(
                    name,
                    SymbolKind::Array {
                        elem,
                        len: ArrayLen::Slice,
                    },
                )
                .with_package(package),
            );
            return Ok(TypedExpr::one(slice));
        }
        Ok(TypedExpr::one(t))
    }

    fn type_of_type_assert(
        &mut self,
        x: &Expr,
        ty: Option<&Expr>,
    ) -> Result<TypedExpr, ResolveError> {
        let operand = self.type_of(x)?;
        let boolean = {
            let table = self.table.read();
            table.basic("bool").expect("predeclared types are installed")
        };
        match ty {
            Some(ty) => {
                let asserted = self.type_symbol(ty)?;
                Ok(TypedExpr::pair(asserted, boolean))
            }
            // `x.(type)` in a type switch carries the operand through
            None => match operand.first() {
                Some(t) => Ok(TypedExpr::pair(t, boolean)),
                None => Ok(TypedExpr::none()),
            },
        }
    }

    // =========================================================================
    // Unresolved placeholders
    // =========================================================================

    /// A fresh placeholder for an identifier that missed every reachable
    /// scope, bound to the occurrence and queued for the fixing phase.
    pub(crate) fn unresolved_ident(&mut self, ident: &Ident) -> SymbolId {
        let mut table = self.table.write();
        let pending = PendingRef::Ident {
            node: ident.id,
            name: ident.name.clone(),
            file: self.file.clone(),
            pos: ident.pos,
        };
        let id = table.alloc(
            Symbol::new(ident.name.clone(), SymbolKind::Unresolved { pending })
                .with_package(Some(self.pkg)),
        );
        table.bind(ident.id, id);
        table.package_mut(self.pkg).unresolved.push(id);
        id
    }

    pub(crate) fn unresolved_member(&mut self, operand: SymbolId, sel: &Ident) -> SymbolId {
        let mut table = self.table.write();
        let pending = PendingRef::Member {
            operand,
            node: sel.id,
            name: sel.name.clone(),
            file: self.file.clone(),
            pos: sel.pos,
        };
        let id = table.alloc(
            Symbol::new(sel.name.clone(), SymbolKind::Unresolved { pending })
                .with_package(Some(self.pkg)),
        );
        table.bind(sel.id, id);
        table.package_mut(self.pkg).unresolved.push(id);
        id
    }

    pub(crate) fn take_type_name_used(&mut self) -> bool {
        std::mem::take(&mut self.type_name_used)
    }

    pub(crate) fn set_type_name_used(&mut self, value: bool) {
        self.type_name_used = value;
    }

    pub(crate) fn field_pin(&self) -> (bool, Option<ScopeId>) {
        (self.search_in_fields, self.field_scope)
    }

    pub(crate) fn set_field_pin(&mut self, active: bool, scope: Option<ScopeId>) {
        self.search_in_fields = active;
        self.field_scope = scope;
    }

    pub(crate) fn ambient_elem(&self) -> Option<SymbolId> {
        self.ambient_elem
    }

    pub(crate) fn set_ambient_elem(&mut self, elem: Option<SymbolId>) {
        self.ambient_elem = elem;
    }
}

/// Parse the integer value of an int literal, honoring the `0x`/`0o`/`0b`
/// prefixes and digit separators.
pub(crate) fn int_value(text: &str) -> Option<i64> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    let (radix, digits) = match cleaned.get(..2) {
        Some("0x") | Some("0X") => (16, &cleaned[2..]),
        Some("0o") | Some("0O") => (8, &cleaned[2..]),
        Some("0b") | Some("0B") => (2, &cleaned[2..]),
        _ => (10, cleaned.as_str()),
    };
    i64::from_str_radix(digits, radix).ok()
}

/// The code point of a char literal, for index computation.
pub(crate) fn char_value(text: &str) -> Option<i64> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    match chars.next()? {
        '\\' => None,
        c if chars.next().is_none() => Some(c as i64),
        _ => None,
    }
}
