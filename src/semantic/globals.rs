//! Phase B: registration of top-level declarations.
//!
//! Walks a package's files and registers every global type, function,
//! method, variable, and constant, inferring initializer types through the
//! expression engine. Order within the phase is types, then functions, then
//! values, so same-package forward references mostly resolve immediately;
//! whatever is left (and everything cross-package) becomes an Unresolved
//! placeholder for the fixing phase.

use parking_lot::RwLock;
use tracing::debug;

use crate::syntax::{Decl, Expr, FuncDecl, TypeSpec, ValueSpec};

use super::error::ResolveError;
use super::expr::ExprEngine;
use super::package::PackageForest;
use super::symbol_table::{
    ArrayLen, Occurrence, Symbol, SymbolId, SymbolKind, SymbolTable,
};

pub fn parse_globals(
    forest: &PackageForest,
    table: &RwLock<SymbolTable>,
) -> Result<(), ResolveError> {
    let top = table.read().package(forest.id).top;

    for file in &forest.files {
        let mut engine = ExprEngine::new(table, forest.id, file.name.clone(), top);
        for decl in &file.decls {
            if let Decl::Type(specs) = decl {
                for spec in specs {
                    register_type(&mut engine, table, spec)?;
                }
            }
        }
    }

    for file in &forest.files {
        let mut engine = ExprEngine::new(table, forest.id, file.name.clone(), top);
        for decl in &file.decls {
            if let Decl::Func(func) = decl {
                register_func(&mut engine, table, func)?;
            }
        }
    }

    for file in &forest.files {
        let mut engine = ExprEngine::new(table, forest.id, file.name.clone(), top);
        for decl in &file.decls {
            match decl {
                Decl::Const(specs) => register_values(&mut engine, table, specs, true)?,
                Decl::Var(specs) => register_values(&mut engine, table, specs, false)?,
                _ => {}
            }
        }
    }

    debug!(package = %forest.path, "globals registered");
    Ok(())
}

/// `type T ...`: composite underlying types are built fresh and take the
/// declared name (named types have singleton identity); a name or pointer
/// on the right-hand side becomes the base of an Alias.
fn register_type(
    engine: &mut ExprEngine<'_>,
    table: &RwLock<SymbolTable>,
    spec: &TypeSpec,
) -> Result<(), ResolveError> {
    let named = match underlying(&spec.ty) {
        Expr::Ident(_) | Expr::Selector { .. } | Expr::Star { .. } => {
            let base = engine.type_symbol(&spec.ty)?;
            let mut t = table.write();
            t.alloc(
                Symbol::new(spec.name.name.clone(), SymbolKind::Alias { base })
                    .with_package(Some(engine.pkg)),
            )
        }
        _ => {
            let built = engine.type_symbol(&spec.ty)?;
            let mut t = table.write();
            t.set_name(built, spec.name.name.clone());
            built
        }
    };

    let mut t = table.write();
    t.bind(spec.name.id, named);
    t.add_position(
        named,
        Occurrence {
            file: engine.file.clone(),
            pos: spec.name.pos,
        },
    );
    let top = t.package(engine.pkg).top;
    t.add_symbol(top, named)?;
    Ok(())
}

fn underlying(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(inner) => underlying(inner),
        other => other,
    }
}

/// `func f(...)` and `func (r T) m(...)`: functions land in the package
/// scope, methods in their receiver base type's method scope.
fn register_func(
    engine: &mut ExprEngine<'_>,
    table: &RwLock<SymbolTable>,
    decl: &FuncDecl,
) -> Result<(), ResolveError> {
    let receiver_scope = match &decl.recv {
        Some(group) => Some(engine.field_scope_of(std::slice::from_ref(group))?),
        None => None,
    };
    let ty = engine.signature_type(&decl.ty.params, &decl.ty.results, receiver_scope)?;

    let mut t = table.write();
    let locals = t.new_scope(Some(engine.pkg));
    let func = t.alloc(
        Symbol::new(
            decl.name.name.clone(),
            SymbolKind::Func {
                ty,
                locals,
                is_interface_method: false,
            },
        )
        .with_package(Some(engine.pkg)),
    );
    t.bind(decl.name.id, func);
    t.add_position(
        func,
        Occurrence {
            file: engine.file.clone(),
            pos: decl.name.pos,
        },
    );

    match receiver_scope {
        Some(scope) => {
            // attach to the first non-pointer node of the receiver chain
            let recv_var = t.scope(scope).symbols().next();
            if let Some(recv_var) = recv_var {
                let mut target = t.value_type(recv_var);
                while let SymbolKind::Pointer { base, .. } = t.kind(target) {
                    target = *base;
                }
                t.add_method(target, func)?;
            }
        }
        None => {
            // multiple init functions are legal; the blank name never binds
            if decl.name.name != "_" && decl.name.name != "init" {
                let top = t.package(engine.pkg).top;
                t.add_symbol(top, func)?;
            } else {
                t.symbol_mut(func).scope = Some(t.package(engine.pkg).top);
            }
        }
    }
    Ok(())
}

/// `const`/`var` groups. A const group carries an implicit auto-increment
/// pattern: a spec with neither type nor values inherits the group type
/// derived from the first spec (its declared type, or `int`).
fn register_values(
    engine: &mut ExprEngine<'_>,
    table: &RwLock<SymbolTable>,
    specs: &[ValueSpec],
    is_const: bool,
) -> Result<(), ResolveError> {
    let group_type: Option<SymbolId> = if is_const {
        match specs.first() {
            Some(first) => match &first.ty {
                Some(ty) => Some(engine.with_positions_off(|e| e.type_symbol(ty))?),
                None => table.read().basic("int"),
            },
            None => None,
        }
    } else {
        None
    };

    for spec in specs {
        let declared = match &spec.ty {
            Some(ty) => Some(engine.type_symbol(ty)?),
            None => None,
        };

        // one multi-valued initializer fans out across the names
        let fanned = if spec.values.len() == 1 && spec.names.len() > 1 {
            Some(engine.type_of(&spec.values[0])?)
        } else {
            None
        };

        for (i, name) in spec.names.iter().enumerate() {
            let initializer = match &fanned {
                Some(typed) => typed.types.get(i).copied(),
                None => match spec.values.get(i) {
                    Some(value) => engine.type_of(value)?.first(),
                    None => None,
                },
            };

            // a pending [...]T length on the declared type comes from the
            // initializer's computed length
            if let (Some(declared), Some(init)) = (declared, initializer) {
                let mut t = table.write();
                let init_len = match t.kind(init) {
                    SymbolKind::Array {
                        len: ArrayLen::Fixed(n),
                        ..
                    } => Some(*n),
                    _ => None,
                };
                if let Some(n) = init_len
                    && let SymbolKind::Array { len, .. } = &mut t.symbol_mut(declared).kind
                    && *len == ArrayLen::Ellipsis
                {
                    *len = ArrayLen::Fixed(n);
                }
            }

            let ty = declared
                .or(initializer)
                .or(if spec.values.is_empty() { group_type } else { None });
            let Some(ty) = ty else {
                continue;
            };

            let mut t = table.write();
            let var = t.alloc(
                Symbol::new(
                    name.name.clone(),
                    SymbolKind::Variable {
                        ty,
                        is_type_switch: false,
                    },
                )
                .with_package(Some(engine.pkg)),
            );
            t.bind(name.id, var);
            t.add_position(
                var,
                Occurrence {
                    file: engine.file.clone(),
                    pos: name.pos,
                },
            );
            if name.name != "_" {
                let top = t.package(engine.pkg).top;
                t.add_symbol(top, var)?;
            } else {
                t.symbol_mut(var).scope = Some(t.package(engine.pkg).top);
            }
        }
    }
    Ok(())
}
