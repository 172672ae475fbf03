//! Statement grammar: blocks, control flow, simple statements.

use super::{Parser, Tok};
use crate::syntax::{
    BinaryOp, Block, BranchKind, CaseClause, CommClause, Expr, Stmt,
};

/// Outcome of parsing a simple statement in a `for` header, where a range
/// clause can appear.
enum Simple {
    Stmt(Stmt),
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        x: Expr,
    },
}

fn assign_op(kind: Tok) -> Option<BinaryOp> {
    let op = match kind {
        Tok::AddAssign => BinaryOp::Add,
        Tok::SubAssign => BinaryOp::Sub,
        Tok::MulAssign => BinaryOp::Mul,
        Tok::QuoAssign => BinaryOp::Quo,
        Tok::RemAssign => BinaryOp::Rem,
        Tok::AndAssign => BinaryOp::And,
        Tok::OrAssign => BinaryOp::Or,
        Tok::XorAssign => BinaryOp::Xor,
        Tok::ShlAssign => BinaryOp::Shl,
        Tok::ShrAssign => BinaryOp::Shr,
        Tok::AndNotAssign => BinaryOp::AndNot,
        _ => return None,
    };
    Some(op)
}

impl<'a, 'g> Parser<'a, 'g> {
    pub(crate) fn parse_block(&mut self) -> Block {
        self.expect(Tok::LBrace);
        let mut stmts = Vec::new();
        while !self.at(Tok::RBrace) && !self.at_eof() {
            if self.eat(Tok::Semi) {
                continue;
            }
            stmts.push(self.parse_stmt());
            self.expect_semi();
        }
        self.expect(Tok::RBrace);
        Block { stmts }
    }

    fn parse_stmt(&mut self) -> Stmt {
        match self.current_kind() {
            Tok::Const | Tok::Var | Tok::Type => match self.parse_decl() {
                Some(decl) => Stmt::Decl(decl),
                None => Stmt::Empty,
            },
            Tok::LBrace => Stmt::Block(self.parse_block()),
            Tok::If => self.parse_if_stmt(),
            Tok::For => self.parse_for_stmt(),
            Tok::Switch => self.parse_switch_stmt(),
            Tok::Select => self.parse_select_stmt(),
            Tok::Go => {
                self.bump();
                Stmt::Go(self.parse_expr())
            }
            Tok::Defer => {
                self.bump();
                Stmt::Defer(self.parse_expr())
            }
            Tok::Return => {
                self.bump();
                let mut results = Vec::new();
                if !self.at(Tok::Semi) && !self.at(Tok::RBrace) && !self.at_eof() {
                    results.push(self.parse_expr());
                    while self.eat(Tok::Comma) {
                        results.push(self.parse_expr());
                    }
                }
                Stmt::Return(results)
            }
            Tok::Break | Tok::Continue | Tok::Goto | Tok::Fallthrough => {
                let kind = match self.current_kind() {
                    Tok::Break => BranchKind::Break,
                    Tok::Continue => BranchKind::Continue,
                    Tok::Goto => BranchKind::Goto,
                    _ => BranchKind::Fallthrough,
                };
                self.bump();
                let label = if self.at(Tok::Ident) {
                    Some(self.ident())
                } else {
                    None
                };
                Stmt::Branch { kind, label }
            }
            Tok::Ident if self.nth(1) == Tok::Colon => {
                let label = self.ident();
                self.bump(); // ':'
                Stmt::Labeled {
                    label,
                    stmt: Box::new(self.parse_stmt()),
                }
            }
            Tok::Semi => Stmt::Empty,
            _ => match self.parse_simple_stmt() {
                Simple::Stmt(stmt) => stmt,
                Simple::Range { .. } => {
                    self.error("range clause outside for statement");
                    Stmt::Empty
                }
            },
        }
    }

    fn parse_simple_stmt(&mut self) -> Simple {
        let mut lhs = vec![self.parse_expr()];
        while self.eat(Tok::Comma) {
            lhs.push(self.parse_expr());
        }

        match self.current_kind() {
            Tok::Define | Tok::Assign => {
                let define = self.at(Tok::Define);
                self.bump();
                if self.eat(Tok::Range) {
                    let x = self.parse_expr();
                    let mut it = lhs.into_iter();
                    return Simple::Range {
                        key: it.next(),
                        value: it.next(),
                        define,
                        x,
                    };
                }
                let mut rhs = vec![self.parse_expr()];
                while self.eat(Tok::Comma) {
                    rhs.push(self.parse_expr());
                }
                Simple::Stmt(Stmt::Assign {
                    lhs,
                    rhs,
                    define,
                    op: None,
                })
            }
            Tok::Arrow => {
                self.bump();
                let value = self.parse_expr();
                Simple::Stmt(Stmt::Send {
                    chan: lhs.swap_remove(0),
                    value,
                })
            }
            Tok::IncOp => {
                self.bump();
                Simple::Stmt(Stmt::IncDec {
                    x: lhs.swap_remove(0),
                    inc: true,
                })
            }
            Tok::DecOp => {
                self.bump();
                Simple::Stmt(Stmt::IncDec {
                    x: lhs.swap_remove(0),
                    inc: false,
                })
            }
            kind => {
                if let Some(op) = assign_op(kind) {
                    self.bump();
                    let rhs = vec![self.parse_expr()];
                    Simple::Stmt(Stmt::Assign {
                        lhs,
                        rhs,
                        define: false,
                        op: Some(op),
                    })
                } else {
                    Simple::Stmt(Stmt::Expr(lhs.swap_remove(0)))
                }
            }
        }
    }

    fn parse_if_stmt(&mut self) -> Stmt {
        self.expect(Tok::If);
        self.no_composite += 1;
        let mut init = None;
        let mut cond = match self.parse_simple_stmt() {
            Simple::Stmt(stmt) => stmt,
            Simple::Range { .. } => {
                self.error("range clause in if header");
                Stmt::Empty
            }
        };
        if self.eat(Tok::Semi) {
            init = Some(Box::new(cond));
            cond = match self.parse_simple_stmt() {
                Simple::Stmt(stmt) => stmt,
                Simple::Range { .. } => {
                    self.error("range clause in if header");
                    Stmt::Empty
                }
            };
        }
        self.no_composite -= 1;

        let cond = match cond {
            Stmt::Expr(e) => e,
            _ => {
                self.error("expected condition expression in if statement");
                Expr::Ident(crate::syntax::Ident {
                    id: self.fresh_id(),
                    name: "false".into(),
                    pos: self.current_pos(),
                })
            }
        };
        let then = self.parse_block();
        let els = if self.eat(Tok::Else) {
            if self.at(Tok::If) {
                Some(Box::new(self.parse_if_stmt()))
            } else {
                Some(Box::new(Stmt::Block(self.parse_block())))
            }
        } else {
            None
        };
        Stmt::If {
            init,
            cond,
            then,
            els,
        }
    }

    fn parse_for_stmt(&mut self) -> Stmt {
        self.expect(Tok::For);
        self.no_composite += 1;

        if self.at(Tok::LBrace) {
            self.no_composite -= 1;
            return Stmt::For {
                init: None,
                cond: None,
                post: None,
                body: self.parse_block(),
            };
        }

        // `for range x` without bindings
        if self.eat(Tok::Range) {
            let x = self.parse_expr();
            self.no_composite -= 1;
            return Stmt::Range {
                key: None,
                value: None,
                define: false,
                x,
                body: self.parse_block(),
            };
        }

        // `for cond {}`, `for init; cond; post {}` or a range clause
        let first = if self.at(Tok::Semi) {
            None
        } else {
            Some(self.parse_simple_stmt())
        };

        if let Some(Simple::Range {
            key,
            value,
            define,
            x,
        }) = first
        {
            self.no_composite -= 1;
            return Stmt::Range {
                key,
                value,
                define,
                x,
                body: self.parse_block(),
            };
        }
        let first = first.map(|s| match s {
            Simple::Stmt(stmt) => stmt,
            Simple::Range { .. } => unreachable!("range handled above"),
        });

        if self.eat(Tok::Semi) {
            let cond = if self.at(Tok::Semi) {
                None
            } else {
                Some(self.parse_expr())
            };
            self.expect(Tok::Semi);
            let post = if self.at(Tok::LBrace) {
                None
            } else {
                match self.parse_simple_stmt() {
                    Simple::Stmt(stmt) => Some(Box::new(stmt)),
                    Simple::Range { .. } => {
                        self.error("range clause in for post statement");
                        None
                    }
                }
            };
            self.no_composite -= 1;
            return Stmt::For {
                init: first.map(Box::new),
                cond,
                post,
                body: self.parse_block(),
            };
        }

        self.no_composite -= 1;
        let cond = match first {
            Some(Stmt::Expr(e)) => Some(e),
            None => None,
            Some(_) => {
                self.error("expected condition expression in for statement");
                None
            }
        };
        Stmt::For {
            init: None,
            cond,
            post: None,
            body: self.parse_block(),
        }
    }

    fn parse_switch_stmt(&mut self) -> Stmt {
        self.expect(Tok::Switch);
        self.no_composite += 1;

        let mut init = None;
        let mut guard = None;
        if !self.at(Tok::LBrace) {
            let first = match self.parse_simple_stmt() {
                Simple::Stmt(stmt) => stmt,
                Simple::Range { .. } => {
                    self.error("range clause in switch header");
                    Stmt::Empty
                }
            };
            if self.eat(Tok::Semi) {
                init = Some(Box::new(first));
                if !self.at(Tok::LBrace) {
                    guard = Some(match self.parse_simple_stmt() {
                        Simple::Stmt(stmt) => stmt,
                        Simple::Range { .. } => {
                            self.error("range clause in switch header");
                            Stmt::Empty
                        }
                    });
                }
            } else {
                guard = Some(first);
            }
        }
        self.no_composite -= 1;

        // `v := x.(type)` or a bare `x.(type)` selects the type-switch form
        let type_switch = match &guard {
            Some(Stmt::Expr(Expr::TypeAssert { ty: None, .. })) => true,
            Some(Stmt::Assign { rhs, .. }) => {
                matches!(rhs.first(), Some(Expr::TypeAssert { ty: None, .. }))
            }
            _ => false,
        };

        let cases = self.parse_case_clauses();

        if type_switch {
            let (bind, x) = match guard {
                Some(Stmt::Expr(Expr::TypeAssert { x, .. })) => (None, *x),
                Some(Stmt::Assign { lhs, mut rhs, .. }) => {
                    let bind = match lhs.into_iter().next() {
                        Some(Expr::Ident(id)) => Some(id),
                        _ => None,
                    };
                    match rhs.swap_remove(0) {
                        Expr::TypeAssert { x, .. } => (bind, *x),
                        other => (bind, other),
                    }
                }
                _ => unreachable!("guard shape checked above"),
            };
            return Stmt::TypeSwitch {
                init,
                bind,
                x,
                cases,
            };
        }

        let tag = match guard {
            Some(Stmt::Expr(e)) => Some(e),
            None => None,
            Some(_) => {
                self.error("expected expression as switch tag");
                None
            }
        };
        Stmt::Switch { init, tag, cases }
    }

    fn parse_case_clauses(&mut self) -> Vec<CaseClause> {
        self.expect(Tok::LBrace);
        let mut cases = Vec::new();
        while !self.at(Tok::RBrace) && !self.at_eof() {
            if self.eat(Tok::Semi) {
                continue;
            }
            let mut exprs = Vec::new();
            if self.eat(Tok::Case) {
                exprs.push(self.parse_expr());
                while self.eat(Tok::Comma) {
                    exprs.push(self.parse_expr());
                }
            } else if !self.eat(Tok::Default) {
                self.error("expected 'case' or 'default'");
                self.bump();
                continue;
            }
            self.expect(Tok::Colon);
            cases.push(CaseClause {
                exprs,
                body: self.parse_case_body(),
            });
        }
        self.expect(Tok::RBrace);
        cases
    }

    fn parse_case_body(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        while !self.at(Tok::Case) && !self.at(Tok::Default) && !self.at(Tok::RBrace) && !self.at_eof()
        {
            if self.eat(Tok::Semi) {
                continue;
            }
            stmts.push(self.parse_stmt());
            self.expect_semi();
        }
        stmts
    }

    fn parse_select_stmt(&mut self) -> Stmt {
        self.expect(Tok::Select);
        self.expect(Tok::LBrace);
        let mut cases = Vec::new();
        while !self.at(Tok::RBrace) && !self.at_eof() {
            if self.eat(Tok::Semi) {
                continue;
            }
            let comm = if self.eat(Tok::Case) {
                match self.parse_simple_stmt() {
                    Simple::Stmt(stmt) => Some(Box::new(stmt)),
                    Simple::Range { .. } => {
                        self.error("range clause in select case");
                        None
                    }
                }
            } else if self.eat(Tok::Default) {
                None
            } else {
                self.error("expected 'case' or 'default'");
                self.bump();
                continue;
            };
            self.expect(Tok::Colon);
            cases.push(CommClause {
                comm,
                body: self.parse_case_body(),
            });
        }
        self.expect(Tok::RBrace);
        Stmt::Select { cases }
    }
}
