//! Type-expression grammar: named types, composites, signatures, fields.

use smol_str::SmolStr;

use super::{Parser, Tok};
use crate::syntax::{
    ArrayLenExpr, ChanDirExpr, Expr, FieldGroup, FuncTypeExpr, Ident, MethodSpec,
};

/// Tokens that can begin a type expression.
fn starts_type(kind: Tok) -> bool {
    matches!(
        kind,
        Tok::Ident
            | Tok::Star
            | Tok::LBrack
            | Tok::Map
            | Tok::Chan
            | Tok::Arrow
            | Tok::Func
            | Tok::Struct
            | Tok::Interface
            | Tok::LParen
            | Tok::Ellipsis
    )
}

impl<'a, 'g> Parser<'a, 'g> {
    pub(crate) fn parse_type(&mut self) -> Expr {
        let pos = self.current_pos();
        match self.current_kind() {
            Tok::Ident => {
                let ident = self.ident();
                if self.eat(Tok::Dot) {
                    let sel = self.ident();
                    Expr::Selector {
                        x: Box::new(Expr::Ident(ident)),
                        sel,
                    }
                } else {
                    Expr::Ident(ident)
                }
            }
            Tok::Star => {
                self.bump();
                Expr::Star {
                    x: Box::new(self.parse_type()),
                    pos,
                }
            }
            Tok::LBrack => {
                self.bump();
                let len = if self.eat(Tok::RBrack) {
                    ArrayLenExpr::Slice
                } else if self.eat(Tok::Ellipsis) {
                    self.expect(Tok::RBrack);
                    ArrayLenExpr::Ellipsis
                } else {
                    let len = self.parse_expr();
                    self.expect(Tok::RBrack);
                    ArrayLenExpr::Fixed(Box::new(len))
                };
                Expr::ArrayType {
                    len,
                    elem: Box::new(self.parse_type()),
                    pos,
                }
            }
            // variadic parameter `...T`, a slice for typing purposes
            Tok::Ellipsis => {
                self.bump();
                Expr::ArrayType {
                    len: ArrayLenExpr::Slice,
                    elem: Box::new(self.parse_type()),
                    pos,
                }
            }
            Tok::Map => {
                self.bump();
                self.expect(Tok::LBrack);
                let key = self.parse_type();
                self.expect(Tok::RBrack);
                let value = self.parse_type();
                Expr::MapType {
                    key: Box::new(key),
                    value: Box::new(value),
                    pos,
                }
            }
            Tok::Chan => {
                self.bump();
                let dir = if self.eat(Tok::Arrow) {
                    ChanDirExpr::Send
                } else {
                    ChanDirExpr::Both
                };
                Expr::ChanType {
                    dir,
                    value: Box::new(self.parse_type()),
                    pos,
                }
            }
            Tok::Arrow => {
                self.bump();
                self.expect(Tok::Chan);
                Expr::ChanType {
                    dir: ChanDirExpr::Recv,
                    value: Box::new(self.parse_type()),
                    pos,
                }
            }
            Tok::Func => {
                self.bump();
                Expr::FuncType {
                    ty: self.parse_signature(),
                    pos,
                }
            }
            Tok::Struct => self.parse_struct_type(),
            Tok::Interface => self.parse_interface_type(),
            Tok::LParen => {
                self.bump();
                let inner = self.parse_type();
                self.expect(Tok::RParen);
                Expr::Paren(Box::new(inner))
            }
            other => {
                self.error(format!("expected type, found {:?}", other));
                self.bump();
                Expr::Ident(Ident {
                    id: self.fresh_id(),
                    name: SmolStr::new("_"),
                    pos,
                })
            }
        }
    }

    // =========================================================================
    // Signatures and field lists
    // =========================================================================

    pub(crate) fn parse_signature(&mut self) -> FuncTypeExpr {
        self.expect(Tok::LParen);
        let params = self.parse_param_list();
        self.expect(Tok::RParen);

        let results = if self.eat(Tok::LParen) {
            let list = self.parse_param_list();
            self.expect(Tok::RParen);
            list
        } else if starts_type(self.current_kind()) && !self.at(Tok::LParen) {
            vec![FieldGroup {
                names: Vec::new(),
                ty: self.parse_type(),
            }]
        } else {
            Vec::new()
        };

        FuncTypeExpr { params, results }
    }

    fn parse_param_list(&mut self) -> Vec<FieldGroup> {
        let mut groups = Vec::new();
        while !self.at(Tok::RParen) && !self.at_eof() {
            groups.push(self.parse_field_group());
            if !self.eat(Tok::Comma) {
                break;
            }
        }
        groups
    }

    /// One parameter/receiver group, disambiguating `a, b T` from bare types.
    pub(crate) fn parse_field_group(&mut self) -> FieldGroup {
        if self.at(Tok::Ident) && self.named_group_ahead() {
            let mut names = vec![self.ident()];
            while self.at(Tok::Comma) && self.nth(1) == Tok::Ident {
                self.bump();
                names.push(self.ident());
            }
            let ty = self.parse_type();
            FieldGroup { names, ty }
        } else {
            FieldGroup {
                names: Vec::new(),
                ty: self.parse_type(),
            }
        }
    }

    /// Look past `Ident (, Ident)*` and report whether a type follows,
    /// which makes the group a named one.
    fn named_group_ahead(&self) -> bool {
        let mut n = 0;
        loop {
            if self.nth(n) != Tok::Ident {
                return false;
            }
            if self.nth(n + 1) == Tok::Comma {
                n += 2;
                continue;
            }
            // `pkg.T` is a qualified type, not a name
            return self.nth(n + 1) != Tok::Dot && starts_type(self.nth(n + 1));
        }
    }

    // =========================================================================
    // Struct and interface bodies
    // =========================================================================

    fn parse_struct_type(&mut self) -> Expr {
        let pos = self.current_pos();
        self.expect(Tok::Struct);
        self.expect(Tok::LBrace);
        let mut fields = Vec::new();
        while !self.at(Tok::RBrace) && !self.at_eof() {
            if self.eat(Tok::Semi) {
                continue;
            }
            let group = self.parse_field_group();
            // struct tags carry no semantic weight here
            if self.at(Tok::Str) {
                self.bump();
            }
            fields.push(group);
            self.expect_semi();
        }
        self.expect(Tok::RBrace);
        Expr::StructType { fields, pos }
    }

    fn parse_interface_type(&mut self) -> Expr {
        let pos = self.current_pos();
        self.expect(Tok::Interface);
        self.expect(Tok::LBrace);
        let mut methods = Vec::new();
        while !self.at(Tok::RBrace) && !self.at_eof() {
            if self.eat(Tok::Semi) {
                continue;
            }
            if self.at(Tok::Ident) && self.nth(1) == Tok::LParen {
                let name = self.ident();
                let sig = self.parse_signature();
                methods.push(MethodSpec {
                    name,
                    params: sig.params,
                    results: sig.results,
                });
            } else {
                // embedded interface name, flattened away at this level
                self.parse_type();
            }
            self.expect_semi();
        }
        self.expect(Tok::RBrace);
        Expr::InterfaceType { methods, pos }
    }
}
