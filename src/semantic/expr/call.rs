//! Call expressions: built-in pseudo-functions, ordinary calls, and the
//! conversion fall-through.

use crate::semantic::error::ResolveError;
use crate::semantic::symbol_table::SymbolKind;
use crate::semantic::universe;
use crate::syntax::Expr;

use super::{ExprEngine, TypedExpr};

impl<'a> ExprEngine<'a> {
    pub(super) fn type_of_call(
        &mut self,
        fun: &Expr,
        args: &[Expr],
    ) -> Result<TypedExpr, ResolveError> {
        // argument occurrences are recorded exactly once, here
        for arg in args {
            self.type_of(arg)?;
        }

        if let Expr::Ident(f) = fun
            && universe::BUILTIN_FUNCTIONS.contains(&f.name.as_str())
            && let Some(result) = self.builtin_call(f.name.as_str(), args)?
        {
            return Ok(result);
        }

        let callee = self.type_of(fun)?;
        let Some(ft) = callee.first() else {
            return Ok(TypedExpr::none());
        };

        if let Some(results) = self.regular_call(ft)? {
            return Ok(results);
        }

        let table = self.table().read();
        let base = table.base_type(ft)?;
        match table.kind(base) {
            // should be resolved later
            SymbolKind::Unresolved { .. } => Ok(TypedExpr::one(base)),
            // type conversion: propagate the original type
            _ => Ok(TypedExpr::one(ft)),
        }
    }

    /// Result types of a call through a Function type, `None` when the
    /// callee is not one.
    fn regular_call(&mut self, ft: crate::semantic::symbol_table::SymbolId) -> Result<Option<TypedExpr>, ResolveError> {
        let table = self.table().read();
        let base = table.base_type(ft)?;
        if let SymbolKind::Function { results, .. } = table.kind(base) {
            let types = table
                .scope(*results)
                .symbols()
                .map(|v| table.value_type(v))
                .collect();
            return Ok(Some(TypedExpr {
                types,
                index: None,
            }));
        }
        Ok(None)
    }

    /// The special-cased builtins. Re-derives argument types with position
    /// recording off: the argument loop above already recorded them.
    fn builtin_call(
        &mut self,
        name: &str,
        args: &[Expr],
    ) -> Result<Option<TypedExpr>, ResolveError> {
        match name {
            "new" => {
                let Some(arg) = args.first() else {
                    return Ok(Some(TypedExpr::none()));
                };
                let tt = self.with_positions_off(|e| e.type_symbol(arg))?;
                // one pointer level deeper than the argument; interning
                // handles new(*T) through the existing chain depth
                let ptr = {
                    let mut table = self.table().write();
                    table.intern_pointer(self.pkg, tt)
                };
                Ok(Some(TypedExpr::one(ptr)))
            }
            "make" => {
                let Some(arg) = args.first() else {
                    return Ok(Some(TypedExpr::none()));
                };
                let tt = self.with_positions_off(|e| e.type_symbol(arg))?;
                Ok(Some(TypedExpr::one(tt)))
            }
            "real" | "imag" => {
                let Some(arg) = args.first() else {
                    return Ok(Some(TypedExpr::none()));
                };
                let tt = self.with_positions_off(|e| e.type_symbol(arg))?;
                let table = self.table().read();
                let kind = match table.symbol(tt).name.as_str() {
                    "complex64" => "float32",
                    _ => "float64",
                };
                Ok(Some(TypedExpr::one(
                    table.basic(kind).expect("predeclared types are installed"),
                )))
            }
            "complex" => {
                if args.len() < 2 {
                    return Ok(Some(TypedExpr::none()));
                }
                let t1 = self.with_positions_off(|e| e.type_symbol(&args[0]))?;
                let t2 = self.with_positions_off(|e| e.type_symbol(&args[1]))?;
                let table = self.table().read();
                let n1 = table.symbol(t1).name.clone();
                let n2 = table.symbol(t2).name.clone();
                let kind = if n1 == "float32" || n2 == "float32" {
                    "complex64"
                } else {
                    "complex128"
                };
                Ok(Some(TypedExpr::one(
                    table.basic(kind).expect("predeclared types are installed"),
                )))
            }
            "append" => {
                let Some(arg) = args.first() else {
                    return Ok(Some(TypedExpr::none()));
                };
                let first = self.with_positions_off(|e| e.type_of(arg))?;
                Ok(Some(TypedExpr {
                    types: first.types.into_iter().take(1).collect(),
                    index: None,
                }))
            }
            // the rest resolve through their declared universe signatures
            _ => Ok(None),
        }
    }
}
