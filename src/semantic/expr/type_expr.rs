//! Type-expression lowering: builds type symbols from type syntax.

use smol_str::SmolStr;

use crate::semantic::error::ResolveError;
use crate::semantic::symbol_table::{
    ArrayLen, ChanDir, Occurrence, ScopeId, Symbol, SymbolId, SymbolKind,
};
use crate::syntax::{
    ArrayLenExpr, ChanDirExpr, Expr, FieldGroup, FuncTypeExpr, Ident, MethodSpec,
};

use super::{ExprEngine, int_value};

impl<'a> ExprEngine<'a> {
    /// Lower a type expression to a type symbol. Unregistered names become
    /// Unresolved placeholders, healed by the fixing phase.
    pub fn type_symbol(&mut self, expr: &Expr) -> Result<SymbolId, ResolveError> {
        match expr {
            Expr::Ident(ident) => Ok(self.named_type(ident)),
            Expr::Paren(inner) => self.type_symbol(inner),
            Expr::Selector { .. } => {
                let typed = self.type_of(expr)?;
                match typed.first() {
                    Some(id) => Ok(id),
                    None => Ok(self.anonymous_interface()),
                }
            }
            Expr::Star { x, .. } => {
                let base = self.type_symbol(x)?;
                let mut table = self.table().write();
                Ok(table.intern_pointer(self.pkg, base))
            }
            Expr::ArrayType { len, elem, .. } => {
                let elem = self.type_symbol(elem)?;
                let len = match len {
                    ArrayLenExpr::Slice => ArrayLen::Slice,
                    ArrayLenExpr::Ellipsis => ArrayLen::Ellipsis,
                    ArrayLenExpr::Fixed(expr) => {
                        self.type_of(expr)?;
                        ArrayLen::Fixed(const_length(expr))
                    }
                };
                let mut table = self.table().write();
                Ok(table.alloc(
                    Symbol::new("", SymbolKind::Array { elem, len })
                        .with_package(Some(self.pkg)),
                ))
            }
            Expr::StructType { fields, .. } => self.struct_type(fields),
            Expr::InterfaceType { methods, .. } => self.interface_type(methods),
            Expr::MapType { key, value, .. } => {
                let key = self.type_symbol(key)?;
                let value = self.type_symbol(value)?;
                let mut table = self.table().write();
                Ok(table.alloc(
                    Symbol::new("", SymbolKind::Map { key, value }).with_package(Some(self.pkg)),
                ))
            }
            Expr::ChanType { dir, value, .. } => {
                let value = self.type_symbol(value)?;
                let dir = match dir {
                    ChanDirExpr::Send => ChanDir::Send,
                    ChanDirExpr::Recv => ChanDir::Recv,
                    ChanDirExpr::Both => ChanDir::Both,
                };
                let mut table = self.table().write();
                Ok(table.alloc(
                    Symbol::new("", SymbolKind::Chan { value, dir }).with_package(Some(self.pkg)),
                ))
            }
            Expr::FuncType { ty, .. } => self.function_type(ty),
            // value syntax in type position: fall back to expression typing
            other => {
                let typed = self.type_of(other)?;
                match typed.first() {
                    Some(id) => Ok(id),
                    None => Ok(self.anonymous_interface()),
                }
            }
        }
    }

    /// A type name: the registered symbol, or a placeholder for a forward
    /// reference. Value symbols contribute their type (covers builtins that
    /// accept value arguments in type position).
    fn named_type(&mut self, ident: &Ident) -> SymbolId {
        let found = {
            let table = self.table().read();
            table.lookup(self.scope, &ident.name, Some(&self.file))
        };
        match found {
            Some(id) => {
                let mut table = self.table().write();
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
                table.value_type(id)
            }
            None => self.unresolved_ident(ident),
        }
    }

    fn struct_type(&mut self, groups: &[FieldGroup]) -> Result<SymbolId, ResolveError> {
        let fields = {
            let mut table = self.table().write();
            table.new_scope(Some(self.pkg))
        };
        for group in groups {
            let ty = self.type_symbol(&group.ty)?;
            if group.names.is_empty() {
                // an embedded field is named after its type's root name
                let name = {
                    let table = self.table().read();
                    table.pointer_root_name(ty)
                };
                self.add_variable(fields, name, ty, None);
            } else {
                for name in &group.names {
                    self.add_variable(fields, name.name.clone(), ty, Some(name));
                }
            }
        }
        let mut table = self.table().write();
        Ok(table.alloc(
            Symbol::new("", SymbolKind::Struct { fields }).with_package(Some(self.pkg)),
        ))
    }

    fn interface_type(&mut self, methods: &[MethodSpec]) -> Result<SymbolId, ResolveError> {
        let method_scope = {
            let mut table = self.table().write();
            table.new_scope(Some(self.pkg))
        };
        for spec in methods {
            let ty = self.signature_type(&spec.params, &spec.results, None)?;
            let mut table = self.table().write();
            let locals = table.new_scope(Some(self.pkg));
            let func = table.alloc(
                Symbol::new(
                    spec.name.name.clone(),
                    SymbolKind::Func {
                        ty,
                        locals,
                        is_interface_method: true,
                    },
                )
                .with_package(Some(self.pkg)),
            );
            table.bind(spec.name.id, func);
            if self.record_positions {
                table.add_position(
                    func,
                    Occurrence {
                        file: self.file.clone(),
                        pos: spec.name.pos,
                    },
                );
            }
            table.add_symbol(method_scope, func)?;
        }
        let mut table = self.table().write();
        let iface =
            table.alloc(Symbol::new("", SymbolKind::Interface).with_package(Some(self.pkg)));
        table.set_methods(iface, method_scope);
        Ok(iface)
    }

    pub(crate) fn function_type(&mut self, ty: &FuncTypeExpr) -> Result<SymbolId, ResolveError> {
        self.signature_type(&ty.params, &ty.results, None)
    }

    /// Build a Function type symbol from field groups; `receiver` is
    /// pre-built for methods.
    pub(crate) fn signature_type(
        &mut self,
        params: &[FieldGroup],
        results: &[FieldGroup],
        receiver: Option<ScopeId>,
    ) -> Result<SymbolId, ResolveError> {
        let params = self.field_scope_of(params)?;
        let results = self.field_scope_of(results)?;
        let mut table = self.table().write();
        Ok(table.alloc(
            Symbol::new(
                "",
                SymbolKind::Function {
                    params,
                    results,
                    receiver,
                },
            )
            .with_package(Some(self.pkg)),
        ))
    }

    /// Parameter/result scope. Unnamed and blank entries still occupy a
    /// slot (call typing iterates results positionally), so they get
    /// synthetic `$n` names that cannot collide with source identifiers.
    pub(crate) fn field_scope_of(
        &mut self,
        groups: &[FieldGroup],
    ) -> Result<ScopeId, ResolveError> {
        let scope = {
            let mut table = self.table().write();
            table.new_scope(Some(self.pkg))
        };
        for group in groups {
            let ty = self.type_symbol(&group.ty)?;
            if group.names.is_empty() {
                let name = self.unnamed_slot(scope);
                self.add_variable(scope, name, ty, None);
            } else {
                for name in &group.names {
                    let registered = if name.name == "_" {
                        self.unnamed_slot(scope)
                    } else {
                        name.name.clone()
                    };
                    self.add_variable(scope, registered, ty, Some(name));
                }
            }
        }
        Ok(scope)
    }

    fn unnamed_slot(&self, scope: ScopeId) -> SmolStr {
        let table = self.table().read();
        SmolStr::new(format!("${}", table.scope(scope).len()))
    }

    /// Register a variable in a field/parameter scope. Blank names are
    /// allocated but not bound, so repeats of `_` never collide.
    pub(crate) fn add_variable(
        &mut self,
        scope: ScopeId,
        name: SmolStr,
        ty: SymbolId,
        ident: Option<&Ident>,
    ) -> SymbolId {
        let mut table = self.table().write();
        let var = table.alloc(
            Symbol::new(
                name.clone(),
                SymbolKind::Variable {
                    ty,
                    is_type_switch: false,
                },
            )
            .with_package(Some(self.pkg)),
        );
        if let Some(ident) = ident {
            table.bind(ident.id, var);
            if self.record_positions {
                table.add_position(
                    var,
                    Occurrence {
                        file: self.file.clone(),
                        pos: ident.pos,
                    },
                );
            }
        }
        if name != "_" {
            let _ = table.add_symbol(scope, var);
        } else {
            table.symbol_mut(var).scope = Some(scope);
        }
        var
    }

    fn anonymous_interface(&mut self) -> SymbolId {
        let mut table = self.table().write();
        table.alloc(Symbol::new("", SymbolKind::Interface).with_package(Some(self.pkg)))
    }
}

/// A fixed array length: the literal's value when the length is written as
/// one, zero otherwise (constant folding is out of scope here).
fn const_length(expr: &Expr) -> i64 {
    match expr {
        Expr::Lit { text, .. } => int_value(text).unwrap_or(0),
        Expr::Paren(inner) => const_length(inner),
        _ => 0,
    }
}
