//! Phase C: placeholder healing.
//!
//! Once every package has finished registering globals program-wide, each
//! worker revisits the Unresolved placeholders its package allocated and
//! rewrites them — in the scope graph and in every bound syntax occurrence —
//! to the now-resolvable target. Placeholders that still miss become
//! dangling-reference diagnostics, never a crash.

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::syntax::Decl;

use super::error::{Diagnostic, ResolveError};
use super::expr::ExprEngine;
use super::package::PackageForest;
use super::symbol_table::{PendingRef, SymbolId, SymbolKind, SymbolTable};

/// A healed placeholder: the type that replaces it wherever it was used as
/// one (the bound symbol itself for types, a variable's or function's type
/// otherwise).
#[derive(Debug, Clone, Copy)]
struct Healed {
    replacement: SymbolId,
}

pub fn fix_package(
    forest: &PackageForest,
    table: &RwLock<SymbolTable>,
) -> Result<Vec<Diagnostic>, ResolveError> {
    let pending: Vec<SymbolId> = {
        let t = table.read();
        t.package(forest.id).unresolved.clone()
    };

    // globals whose inferred type passed through a placeholder; their
    // initializers are re-typed once healing is done, since a placeholder
    // can stand for a callee whose result list only exists now
    let retype: FxHashSet<SymbolId> = {
        let t = table.read();
        t.symbols()
            .filter(|(_, s)| s.package == Some(forest.id))
            .filter_map(|(id, s)| match s.kind {
                SymbolKind::Variable { ty, .. } => Some((id, ty)),
                _ => None,
            })
            .filter(|(_, ty)| matches!(t.kind(*ty), SymbolKind::Unresolved { .. }))
            .map(|(id, _)| id)
            .collect()
    };

    let mut healed: FxHashMap<SymbolId, Healed> = FxHashMap::default();
    let mut diagnostics = Vec::new();

    // placeholders heal in creation order, so a selector's operand is
    // always processed before the selector itself
    for placeholder in pending {
        let pending_ref = {
            let t = table.read();
            match t.kind(placeholder) {
                SymbolKind::Unresolved { pending } => pending.clone(),
                _ => continue,
            }
        };

        match resolve_pending(forest, table, &healed, &pending_ref) {
            Some(bound) => {
                let replacement = heal(table, placeholder, bound, &pending_ref);
                healed.insert(placeholder, Healed { replacement });
                trace!(name = %pending_ref.name(), "placeholder healed");
            }
            None => {
                let occ = pending_ref.occurrence();
                diagnostics.push(Diagnostic {
                    name: pending_ref.name().clone(),
                    file: occ.file,
                    pos: occ.pos,
                });
            }
        }
    }

    patch_package_symbols(forest, table, &healed);
    retype_initializers(forest, table, &retype)?;

    debug!(
        package = %forest.path,
        healed = healed.len(),
        dangling = diagnostics.len(),
        "placeholders fixed"
    );
    Ok(diagnostics)
}

/// Re-run inference over the initializers of globals whose type was a
/// placeholder, now that every package's globals exist. Position recording
/// stays off — the registering pass already counted these occurrences.
fn retype_initializers(
    forest: &PackageForest,
    table: &RwLock<SymbolTable>,
    retype: &FxHashSet<SymbolId>,
) -> Result<(), ResolveError> {
    if retype.is_empty() {
        return Ok(());
    }
    let top = {
        let t = table.read();
        t.package(forest.id).top
    };

    for file in &forest.files {
        let mut engine = ExprEngine::new(table, forest.id, file.name.clone(), top);
        engine.record_positions = false;
        for decl in &file.decls {
            let specs = match decl {
                Decl::Var(specs) | Decl::Const(specs) => specs,
                _ => continue,
            };
            for spec in specs {
                // only initializer-derived types can need this
                if spec.ty.is_some() || spec.values.is_empty() {
                    continue;
                }
                let affected = {
                    let t = table.read();
                    spec.names
                        .iter()
                        .any(|n| t.symbol_for_ident(n.id).is_some_and(|v| retype.contains(&v)))
                };
                if !affected {
                    continue;
                }

                let fanned = if spec.values.len() == 1 && spec.names.len() > 1 {
                    Some(engine.type_of(&spec.values[0])?)
                } else {
                    None
                };
                for (i, name) in spec.names.iter().enumerate() {
                    let var = {
                        let t = table.read();
                        t.symbol_for_ident(name.id)
                    };
                    let Some(var) = var else { continue };
                    if !retype.contains(&var) {
                        continue;
                    }
                    let inferred = match &fanned {
                        Some(typed) => typed.types.get(i).copied(),
                        None => match spec.values.get(i) {
                            Some(value) => engine.type_of(value)?.first(),
                            None => None,
                        },
                    };
                    if let Some(inferred) = inferred {
                        let mut t = table.write();
                        if !matches!(t.kind(inferred), SymbolKind::Unresolved { .. })
                            && let SymbolKind::Variable { ty, .. } = &mut t.symbol_mut(var).kind
                        {
                            *ty = inferred;
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Find the symbol a pending reference now denotes, if any.
fn resolve_pending(
    forest: &PackageForest,
    table: &RwLock<SymbolTable>,
    healed: &FxHashMap<SymbolId, Healed>,
    pending: &PendingRef,
) -> Option<SymbolId> {
    let t = table.read();
    match pending {
        PendingRef::Ident { name, file, .. } => {
            // package-level names are now all registered; imports and the
            // predeclared scope stay reachable through the opened chain
            let top = t.package(forest.id).top;
            t.lookup(top, name, Some(file))
        }
        PendingRef::Member { operand, name, .. } => {
            let operand = match healed.get(operand) {
                Some(h) => h.replacement,
                None => *operand,
            };
            if matches!(t.kind(operand), SymbolKind::Unresolved { .. }) {
                return None;
            }
            t.select_member(operand, name)
        }
    }
}

/// Rebind the placeholder's identifier occurrences to `bound`, record their
/// positions, and merge any methods that accumulated on the placeholder
/// (a method registered against a forward-declared receiver).
fn heal(
    table: &RwLock<SymbolTable>,
    placeholder: SymbolId,
    bound: SymbolId,
    pending: &PendingRef,
) -> SymbolId {
    let mut t = table.write();

    let idents: Vec<_> = t.symbol(placeholder).idents.iter().copied().collect();
    for node in idents {
        t.rebind(node, placeholder, bound);
    }
    t.add_position(bound, pending.occurrence());

    let replacement = t.value_type(bound);

    if let Some(methods) = t.symbol(placeholder).methods {
        let orphans: Vec<SymbolId> = t.scope(methods).symbols().collect();
        if t.symbol(replacement).is_type() {
            for method in orphans {
                let name = t.symbol(method).name.clone();
                if t.find_method_on(replacement, &name).is_none() {
                    let _ = t.add_method(replacement, method);
                }
            }
        }
    }

    replacement
}

/// Rewrite every package-owned symbol whose children still point at healed
/// placeholders.
fn patch_package_symbols(
    forest: &PackageForest,
    table: &RwLock<SymbolTable>,
    healed: &FxHashMap<SymbolId, Healed>,
) {
    if healed.is_empty() {
        return;
    }
    let owned: Vec<SymbolId> = {
        let t = table.read();
        t.symbols()
            .filter(|(_, s)| s.package == Some(forest.id))
            .map(|(id, _)| id)
            .collect()
    };

    let replace = |id: SymbolId| healed.get(&id).map(|h| h.replacement);

    let mut t = table.write();
    for id in owned {
        match &mut t.symbol_mut(id).kind {
            SymbolKind::Alias { base } | SymbolKind::Pointer { base, .. } => {
                if let Some(to) = replace(*base) {
                    *base = to;
                }
            }
            SymbolKind::Array { elem, .. } => {
                if let Some(to) = replace(*elem) {
                    *elem = to;
                }
            }
            SymbolKind::Map { key, value } => {
                if let Some(to) = replace(*key) {
                    *key = to;
                }
                if let Some(to) = replace(*value) {
                    *value = to;
                }
            }
            SymbolKind::Chan { value, .. } => {
                if let Some(to) = replace(*value) {
                    *value = to;
                }
            }
            SymbolKind::Variable { ty, .. } | SymbolKind::Func { ty, .. } => {
                if let Some(to) = replace(*ty) {
                    *ty = to;
                }
            }
            SymbolKind::Struct { .. }
            | SymbolKind::Interface
            | SymbolKind::Function { .. }
            | SymbolKind::Basic
            | SymbolKind::Package { .. }
            | SymbolKind::Unresolved { .. } => {}
        }
    }
}
