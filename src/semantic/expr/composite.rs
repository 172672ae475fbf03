//! Composite literals and their key/value elements.

use crate::semantic::error::ResolveError;
use crate::semantic::symbol_table::{ArrayLen, SymbolKind};
use crate::syntax::Expr;

use super::{ExprEngine, TypedExpr};

impl<'a> ExprEngine<'a> {
    pub(super) fn type_of_composite(
        &mut self,
        ty: Option<&Expr>,
        elts: &[Expr],
    ) -> Result<TypedExpr, ResolveError> {
        let cl_type = match ty {
            Some(ty) => self.type_of(ty)?.first(),
            // an elided literal inherits the enclosing element type
            None => self.ambient_elem(),
        };
        let Some(cl) = cl_type else {
            return Ok(TypedExpr::none());
        };

        let saved_ambient = self.ambient_elem();
        {
            let table = self.table().read();
            if let SymbolKind::Array { elem, .. } = table.kind(cl) {
                self.set_ambient_elem(Some(*elem));
            }
        }

        let real = {
            let table = self.table().read();
            table.base_type(cl)?
        };

        // keyed struct elements look identifiers up in the field scope
        let saved_pin = self.field_pin();
        {
            let table = self.table().read();
            if let SymbolKind::Struct { fields } = table.kind(real)
                && matches!(elts.first(), Some(Expr::KeyValue { .. }))
            {
                let fields = *fields;
                drop(table);
                self.set_field_pin(true, Some(fields));
            }
        }

        let mut max_index: Option<i64> = None;
        for elt in elts {
            let typed = self.type_of(elt)?;
            if let Some(i) = typed.index {
                max_index = Some(max_index.map_or(i, |m| m.max(i)));
            }
        }

        self.set_field_pin(saved_pin.0, saved_pin.1);
        self.set_ambient_elem(saved_ambient);

        // a pending [...]T length becomes max surfaced index + 1
        {
            let mut table = self.table().write();
            if let SymbolKind::Array { len, .. } = &mut table.symbol_mut(cl).kind
                && *len == ArrayLen::Ellipsis
            {
                *len = ArrayLen::Fixed(max_index.map_or(0, |m| m + 1));
            }
        }

        Ok(TypedExpr::one(cl))
    }

    /// Types both sides; surfaces the literal integer indices so the
    /// enclosing literal can track its maximum.
    pub(super) fn type_of_key_value(
        &mut self,
        key: &Expr,
        value: &Expr,
    ) -> Result<TypedExpr, ResolveError> {
        let k = self.type_of(key)?;
        let v = self.type_of(value)?;
        let index = match (k.index, v.index) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        Ok(TypedExpr {
            types: Vec::new(),
            index,
        })
    }
}
