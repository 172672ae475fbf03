//! Expression grammar: precedence climbing plus primary-expression suffixes.

use super::{Parser, Tok};
use crate::syntax::{BinaryOp, Expr, LitKind, UnaryOp};

/// Binary operator precedence, `None` when the token is not a binary
/// operator. Higher binds tighter.
fn binary_op(kind: Tok) -> Option<(BinaryOp, u8)> {
    let entry = match kind {
        Tok::LOr => (BinaryOp::LOr, 1),
        Tok::LAnd => (BinaryOp::LAnd, 2),
        Tok::EqEq => (BinaryOp::Eql, 3),
        Tok::NotEq => (BinaryOp::Neq, 3),
        Tok::Lt => (BinaryOp::Lss, 3),
        Tok::LtEq => (BinaryOp::Leq, 3),
        Tok::Gt => (BinaryOp::Gtr, 3),
        Tok::GtEq => (BinaryOp::Geq, 3),
        Tok::Plus => (BinaryOp::Add, 4),
        Tok::Minus => (BinaryOp::Sub, 4),
        Tok::Pipe => (BinaryOp::Or, 4),
        Tok::Caret => (BinaryOp::Xor, 4),
        Tok::Star => (BinaryOp::Mul, 5),
        Tok::Slash => (BinaryOp::Quo, 5),
        Tok::Percent => (BinaryOp::Rem, 5),
        Tok::Shl => (BinaryOp::Shl, 5),
        Tok::Shr => (BinaryOp::Shr, 5),
        Tok::Amp => (BinaryOp::And, 5),
        Tok::AndNot => (BinaryOp::AndNot, 5),
        _ => return None,
    };
    Some(entry)
}

impl<'a, 'g> Parser<'a, 'g> {
    pub(crate) fn parse_expr(&mut self) -> Expr {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Expr {
        let mut lhs = self.parse_unary();
        while let Some((op, prec)) = binary_op(self.current_kind()) {
            if prec < min_prec {
                break;
            }
            self.bump();
            let rhs = self.parse_binary(prec + 1);
            lhs = Expr::Binary {
                op,
                x: Box::new(lhs),
                y: Box::new(rhs),
            };
        }
        lhs
    }

    fn parse_unary(&mut self) -> Expr {
        let pos = self.current_pos();
        let op = match self.current_kind() {
            Tok::Plus => UnaryOp::Plus,
            Tok::Minus => UnaryOp::Minus,
            Tok::Caret => UnaryOp::Xor,
            Tok::Bang => UnaryOp::Not,
            Tok::Amp => UnaryOp::And,
            Tok::Arrow => {
                // `<-chan T` is a type, `<-ch` a receive
                if self.nth(1) == Tok::Chan {
                    return self.parse_type();
                }
                UnaryOp::Recv
            }
            Tok::Star => {
                self.bump();
                return Expr::Star {
                    x: Box::new(self.parse_unary()),
                    pos,
                };
            }
            _ => return self.parse_primary(),
        };
        self.bump();
        Expr::Unary {
            op,
            x: Box::new(self.parse_unary()),
            pos,
        }
    }

    fn parse_primary(&mut self) -> Expr {
        let mut x = self.parse_operand();
        loop {
            match self.current_kind() {
                Tok::Dot => {
                    self.bump();
                    if self.eat(Tok::LParen) {
                        // type assertion; `.(type)` appears in type switches
                        let ty = if self.at(Tok::Type) {
                            self.bump();
                            None
                        } else {
                            Some(Box::new(self.parse_type()))
                        };
                        self.expect(Tok::RParen);
                        x = Expr::TypeAssert {
                            x: Box::new(x),
                            ty,
                        };
                    } else {
                        let sel = self.ident();
                        x = Expr::Selector {
                            x: Box::new(x),
                            sel,
                        };
                    }
                }
                Tok::LParen => {
                    self.bump();
                    let mut args = Vec::new();
                    while !self.at(Tok::RParen) && !self.at_eof() {
                        args.push(self.parse_expr());
                        // trailing `...` spreads a slice into a variadic call
                        self.eat(Tok::Ellipsis);
                        if !self.eat(Tok::Comma) {
                            break;
                        }
                    }
                    self.expect(Tok::RParen);
                    x = Expr::Call {
                        fun: Box::new(x),
                        args,
                    };
                }
                Tok::LBrack => {
                    self.bump();
                    if self.eat(Tok::Colon) {
                        let high = if self.at(Tok::RBrack) {
                            None
                        } else {
                            Some(Box::new(self.parse_expr()))
                        };
                        self.expect(Tok::RBrack);
                        x = Expr::Slice {
                            x: Box::new(x),
                            low: None,
                            high,
                        };
                    } else {
                        let index = self.parse_expr();
                        if self.eat(Tok::Colon) {
                            let high = if self.at(Tok::RBrack) {
                                None
                            } else {
                                Some(Box::new(self.parse_expr()))
                            };
                            self.expect(Tok::RBrack);
                            x = Expr::Slice {
                                x: Box::new(x),
                                low: Some(Box::new(index)),
                                high,
                            };
                        } else {
                            self.expect(Tok::RBrack);
                            x = Expr::Index {
                                x: Box::new(x),
                                index: Box::new(index),
                            };
                        }
                    }
                }
                Tok::LBrace if self.composite_allowed(&x) => {
                    x = self.parse_composite_body(Some(Box::new(x)));
                }
                _ => break,
            }
        }
        x
    }

    /// Whether a `{` here opens a composite literal for `x`. Inside
    /// if/for/switch headers a brace after a plain name opens the body
    /// instead.
    fn composite_allowed(&self, x: &Expr) -> bool {
        if x.is_type_syntax() {
            return true;
        }
        if self.no_composite > 0 {
            return false;
        }
        matches!(
            x,
            Expr::Ident(_) | Expr::Selector { .. } | Expr::Star { .. }
        )
    }

    fn parse_operand(&mut self) -> Expr {
        let pos = self.current_pos();
        match self.current_kind() {
            Tok::Int => self.lit(LitKind::Int),
            Tok::Float => self.lit(LitKind::Float),
            Tok::Imag => self.lit(LitKind::Imag),
            Tok::Char => self.lit(LitKind::Char),
            Tok::Str => self.lit(LitKind::Str),
            Tok::Ident => Expr::Ident(self.ident()),
            Tok::LParen => {
                self.bump();
                // composite literals never bind through parens
                let saved = self.no_composite;
                self.no_composite = 0;
                let inner = self.parse_expr();
                self.no_composite = saved;
                self.expect(Tok::RParen);
                Expr::Paren(Box::new(inner))
            }
            Tok::Func => {
                self.bump();
                let ty = self.parse_signature();
                if self.at(Tok::LBrace) {
                    let saved = self.no_composite;
                    self.no_composite = 0;
                    let body = self.parse_block();
                    self.no_composite = saved;
                    Expr::FuncLit { ty, body, pos }
                } else {
                    Expr::FuncType { ty, pos }
                }
            }
            // type syntax in operand position: conversions and literals
            Tok::LBrack | Tok::Map | Tok::Chan | Tok::Struct | Tok::Interface | Tok::Arrow => {
                self.parse_type()
            }
            other => {
                self.error(format!("expected expression, found {:?}", other));
                self.bump();
                Expr::Lit {
                    kind: LitKind::Int,
                    text: "0".into(),
                    pos,
                }
            }
        }
    }

    fn lit(&mut self, kind: LitKind) -> Expr {
        let pos = self.current_pos();
        let text = smol_str::SmolStr::new(self.current_text());
        self.bump();
        Expr::Lit { kind, text, pos }
    }

    /// The braced element list of a composite literal. `ty` is `None` for an
    /// elided nested literal.
    pub(crate) fn parse_composite_body(&mut self, ty: Option<Box<Expr>>) -> Expr {
        let pos = ty.as_ref().map(|t| t.pos()).unwrap_or(self.current_pos());
        self.expect(Tok::LBrace);
        let saved = self.no_composite;
        self.no_composite = 0;
        let mut elts = Vec::new();
        while !self.at(Tok::RBrace) && !self.at_eof() {
            let elt = self.parse_composite_element();
            elts.push(elt);
            if !self.eat(Tok::Comma) {
                self.eat(Tok::Semi);
                if !self.at(Tok::RBrace) {
                    self.error("expected ',' or '}' in composite literal");
                    break;
                }
            }
            self.eat(Tok::Semi);
        }
        self.no_composite = saved;
        self.expect(Tok::RBrace);
        Expr::Composite { ty, elts, pos }
    }

    fn parse_composite_element(&mut self) -> Expr {
        // a nested `{...}` inherits its type from the enclosing literal
        let value = if self.at(Tok::LBrace) {
            self.parse_composite_body(None)
        } else {
            self.parse_expr()
        };
        if self.eat(Tok::Colon) {
            let v = if self.at(Tok::LBrace) {
                self.parse_composite_body(None)
            } else {
                self.parse_expr()
            };
            Expr::KeyValue {
                key: Box::new(value),
                value: Box::new(v),
            }
        } else {
            value
        }
    }
}
