//! Selector expressions: methods, fields, package members, and
//! method-expression construction.

use smol_str::SmolStr;

use crate::semantic::error::ResolveError;
use crate::semantic::symbol_table::{
    Occurrence, ScopeId, Symbol, SymbolId, SymbolKind, SymbolTable,
};
use crate::syntax::{Expr, Ident};

use super::{ExprEngine, TypedExpr};

impl<'a> ExprEngine<'a> {
    pub(super) fn type_of_selector(
        &mut self,
        x: &Expr,
        sel: &Ident,
    ) -> Result<TypedExpr, ResolveError> {
        self.set_type_name_used(false);
        let operand = self.type_of(x)?;
        let Some(t) = operand.first() else {
            return Ok(TypedExpr::one(self.unresolved_ident(sel)));
        };

        if let Some(result) = self.method_selector(t, sel)? {
            return Ok(result);
        }
        if let Some(result) = self.field_selector(t, sel)? {
            return Ok(result);
        }
        if let Some(result) = self.package_member_selector(t, sel)? {
            return Ok(result);
        }

        // should be resolved later
        Ok(TypedExpr::one(self.unresolved_member(t, sel)))
    }

    /// (1) A method in the operand's method scope — walking the Alias and
    /// Pointer chain, since methods hang off the first named node of a
    /// receiver chain. Package operands resolve their top-level functions
    /// through the same branch.
    fn method_selector(
        &mut self,
        t: SymbolId,
        sel: &Ident,
    ) -> Result<Option<TypedExpr>, ResolveError> {
        let found = {
            let table = self.table().read();
            table.find_method_on(t, sel.name.as_str())
        };
        let Some(func) = found else {
            return Ok(None);
        };

        {
            let mut table = self.table().write();
            if !matches!(table.kind(func), SymbolKind::Func { .. }) {
                return Ok(None);
            }
            table.bind(sel.id, func);
            if self.record_positions {
                table.add_position(
                    func,
                    Occurrence {
                        file: self.file.clone(),
                        pos: sel.pos,
                    },
                );
            }
        }

        let ty = if self.take_type_name_used() {
            // a method denoted through its type name is a method
            // expression: the receiver becomes the first parameter
            self.method_expression_type(func)?
        } else {
            let table = self.table().read();
            table.value_type(func)
        };
        Ok(Some(TypedExpr::one(ty)))
    }

    /// (2) A field in the operand's underlying struct field scope (the base
    /// chase sees through pointers and aliases).
    fn field_selector(
        &mut self,
        t: SymbolId,
        sel: &Ident,
    ) -> Result<Option<TypedExpr>, ResolveError> {
        let found = {
            let table = self.table().read();
            table.base_type(t)?;
            match table.base_struct(t) {
                Some((_, fields)) => table.lookup(fields, sel.name.as_str(), None),
                None => None,
            }
        };
        let Some(field) = found else {
            return Ok(None);
        };

        let mut table = self.table().write();
        let ty = match table.kind(field) {
            SymbolKind::Variable { ty, .. } => *ty,
            _ => return Ok(None),
        };
        table.bind(sel.id, field);
        if self.record_positions {
            table.add_position(
                field,
                Occurrence {
                    file: self.file.clone(),
                    pos: sel.pos,
                },
            );
        }
        Ok(Some(TypedExpr::one(ty)))
    }

    /// (3) Any member of an imported package's top-level scope.
    fn package_member_selector(
        &mut self,
        t: SymbolId,
        sel: &Ident,
    ) -> Result<Option<TypedExpr>, ResolveError> {
        let mut table = self.table().write();
        let package = match table.kind(t) {
            SymbolKind::Package { package } => *package,
            _ => return Ok(None),
        };
        let top = table.package(package).top;
        let Some(member) = table.scope(top).get(sel.name.as_str()) else {
            return Ok(None);
        };
        table.bind(sel.id, member);
        if self.record_positions {
            table.add_position(
                member,
                Occurrence {
                    file: self.file.clone(),
                    pos: sel.pos,
                },
            );
        }
        let is_type = table.symbol(member).is_type();
        let result = table.value_type(member);
        drop(table);
        if is_type {
            self.set_type_name_used(true);
        }
        Ok(Some(TypedExpr::one(result)))
    }

    /// Build the flattened Function type of a method expression: the
    /// receiver and declared parameters become one parameter list. The
    /// original method symbol keeps the occurrence; only the type differs.
    fn method_expression_type(&mut self, func: SymbolId) -> Result<SymbolId, ResolveError> {
        let mut table = self.table().write();
        let method_ty = table.value_type(func);
        let base = table.base_type(method_ty)?;
        let (params, results, receiver) = match table.kind(base) {
            SymbolKind::Function {
                params,
                results,
                receiver,
            } => (*params, *results, *receiver),
            _ => return Ok(method_ty),
        };

        let flat_params = table.new_scope(Some(self.pkg));
        if let Some(receiver) = receiver {
            let receiver_vars: Vec<SymbolId> = table.scope(receiver).symbols().collect();
            for var in receiver_vars {
                let name = unique_in(&table, flat_params, &table.symbol(var).name);
                add_renamed(&mut table, flat_params, var, name);
            }
        }
        let param_vars: Vec<SymbolId> = table.scope(params).symbols().collect();
        for var in param_vars {
            let name = unique_in(&table, flat_params, &table.symbol(var).name);
            add_renamed(&mut table, flat_params, var, name);
        }

        let flat_results = table.new_scope(Some(self.pkg));
        let result_vars: Vec<SymbolId> = table.scope(results).symbols().collect();
        for var in result_vars {
            let name = unique_in(&table, flat_results, &table.symbol(var).name);
            add_renamed(&mut table, flat_results, var, name);
        }

        Ok(table.alloc(
            Symbol::new(
                "",
                SymbolKind::Function {
                    params: flat_params,
                    results: flat_results,
                    receiver: None,
                },
            )
            .with_package(Some(self.pkg)),
        ))
    }
}

/// Parameter names can collide when receiver and parameter lists merge;
/// suffix until unique so the scope accepts them.
fn unique_in(table: &SymbolTable, scope: ScopeId, name: &str) -> SmolStr {
    if table.scope(scope).get(name).is_none() {
        return SmolStr::new(name);
    }
    let mut n = 1;
    loop {
        let candidate = SmolStr::new(format!("{name}{n}"));
        if table.scope(scope).get(&candidate).is_none() {
            return candidate;
        }
        n += 1;
    }
}

/// Re-register a parameter variable under `name` in the flattened scope,
/// sharing the underlying type.
fn add_renamed(table: &mut SymbolTable, scope: ScopeId, var: SymbolId, name: SmolStr) {
    let ty = table.value_type(var);
    let copy = table.alloc(Symbol::new(
        name,
        SymbolKind::Variable {
            ty,
            is_type_switch: false,
        },
    ));
    let _ = table.add_symbol(scope, copy);
}
