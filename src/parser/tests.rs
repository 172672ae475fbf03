#![allow(clippy::unwrap_used)]
use crate::syntax::{
    ArrayLenExpr, BinaryOp, Decl, Expr, NodeIdGen, Stmt, UnaryOp,
};

use super::{Tok, parse_expression, parse_file, tokenize};

fn parse_ok(src: &str) -> crate::syntax::SourceFile {
    let mut ids = NodeIdGen::new();
    let parse = parse_file("test.go", src, &mut ids);
    assert!(parse.ok(), "unexpected errors: {:?}", parse.errors);
    parse.file
}

fn expr(src: &str) -> Expr {
    let mut ids = NodeIdGen::new();
    parse_expression(src, &mut ids).unwrap()
}

// =========================================================================
// Lexer
// =========================================================================

#[test]
fn tokenizes_operators_longest_first() {
    let kinds: Vec<Tok> = tokenize("a <<= b &^ c <- d")
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            Tok::Ident,
            Tok::ShlAssign,
            Tok::Ident,
            Tok::AndNot,
            Tok::Ident,
            Tok::Arrow,
            Tok::Ident,
            Tok::Semi,
        ]
    );
}

#[test]
fn newline_terminates_a_statementlike_token() {
    let kinds: Vec<Tok> = tokenize("x\ny").into_iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![Tok::Ident, Tok::Semi, Tok::Ident, Tok::Semi]);
}

#[test]
fn newline_after_an_operator_continues_the_statement() {
    let kinds: Vec<Tok> = tokenize("x +\ny").into_iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![Tok::Ident, Tok::Plus, Tok::Ident, Tok::Semi]);
}

#[test]
fn comments_are_skipped() {
    let kinds: Vec<Tok> = tokenize("x // trailing\n/* block */ y")
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(kinds, vec![Tok::Ident, Tok::Semi, Tok::Ident, Tok::Semi]);
}

#[test]
fn numeric_literal_kinds() {
    let kinds: Vec<Tok> = tokenize("1 0x1F 1.5 2e3 3i")
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![Tok::Int, Tok::Int, Tok::Float, Tok::Float, Tok::Imag, Tok::Semi]
    );
}

// =========================================================================
// Expressions
// =========================================================================

#[test]
fn binary_precedence_binds_multiplication_tighter() {
    match expr("a + b*c") {
        Expr::Binary { op: BinaryOp::Add, y, .. } => {
            assert!(matches!(*y, Expr::Binary { op: BinaryOp::Mul, .. }));
        }
        other => panic!("unexpected shape: {other:?}"),
    }
}

#[test]
fn unary_address_and_receive() {
    assert!(matches!(expr("&x"), Expr::Unary { op: UnaryOp::And, .. }));
    assert!(matches!(expr("<-ch"), Expr::Unary { op: UnaryOp::Recv, .. }));
    assert!(matches!(expr("*p"), Expr::Star { .. }));
}

#[test]
fn selector_call_index_chain() {
    match expr("a.b(1)[2]") {
        Expr::Index { x, .. } => match *x {
            Expr::Call { fun, .. } => assert!(matches!(*fun, Expr::Selector { .. })),
            other => panic!("unexpected shape: {other:?}"),
        },
        other => panic!("unexpected shape: {other:?}"),
    }
}

#[test]
fn composite_literal_with_keys_and_ellipsis_length() {
    match expr("[...]int{1, 2, 5: 9}") {
        Expr::Composite { ty, elts, .. } => {
            assert!(matches!(
                ty.as_deref(),
                Some(Expr::ArrayType {
                    len: ArrayLenExpr::Ellipsis,
                    ..
                })
            ));
            assert_eq!(elts.len(), 3);
            assert!(matches!(elts[2], Expr::KeyValue { .. }));
        }
        other => panic!("unexpected shape: {other:?}"),
    }
}

#[test]
fn nested_elided_composite_literals() {
    match expr("[][]int{{1}, {2, 3}}") {
        Expr::Composite { elts, .. } => {
            assert_eq!(elts.len(), 2);
            assert!(matches!(&elts[0], Expr::Composite { ty: None, .. }));
        }
        other => panic!("unexpected shape: {other:?}"),
    }
}

#[test]
fn type_assertion_and_slices() {
    assert!(matches!(expr("x.(int)"), Expr::TypeAssert { ty: Some(_), .. }));
    assert!(matches!(
        expr("xs[1:2]"),
        Expr::Slice {
            low: Some(_),
            high: Some(_),
            ..
        }
    ));
    assert!(matches!(
        expr("xs[:2]"),
        Expr::Slice { low: None, .. }
    ));
}

// =========================================================================
// Files and declarations
// =========================================================================

#[test]
fn parses_a_file_with_all_declaration_kinds() {
    let file = parse_ok(
        r#"package demo

import (
	"fmt"
	alias "strings"
)

const (
	A = iota
	B
)

var count int = 3

type Point struct {
	X, Y int
}

type Stringer interface {
	String() string
}

func (p *Point) Move(dx int) {
	p.X += dx
}

func main() {
	fmt.Println(count)
}
"#,
    );

    assert_eq!(file.package.name, "demo");
    assert_eq!(file.imports().count(), 2);
    assert_eq!(
        file.imports().filter(|i| i.alias.is_some()).count(),
        1
    );

    let kinds: Vec<&str> = file
        .decls
        .iter()
        .map(|d| match d {
            Decl::Import(_) => "import",
            Decl::Const(_) => "const",
            Decl::Var(_) => "var",
            Decl::Type(_) => "type",
            Decl::Func(_) => "func",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["import", "const", "var", "type", "type", "func", "func"]
    );
}

#[test]
fn const_group_records_specs_without_values() {
    let file = parse_ok("package demo\nconst (\n\tA = iota\n\tB\n\tC\n)\n");
    let Decl::Const(specs) = &file.decls[0] else {
        panic!("expected const decl");
    };
    assert_eq!(specs.len(), 3);
    assert!(specs[1].ty.is_none() && specs[1].values.is_empty());
}

#[test]
fn method_declarations_carry_their_receiver() {
    let file = parse_ok("package demo\nfunc (s *Server) Close() error { return nil }\n");
    let Decl::Func(func) = &file.decls[0] else {
        panic!("expected func decl");
    };
    let recv = func.recv.as_ref().unwrap();
    assert_eq!(recv.names[0].name, "s");
    assert!(matches!(recv.ty, Expr::Star { .. }));
    assert_eq!(func.ty.results.len(), 1);
}

#[test]
fn statement_forms_parse_inside_bodies() {
    let file = parse_ok(
        r#"package demo

func run(ch chan int, xs []int) int {
	total := 0
	for i, x := range xs {
		if x > 2 {
			total += x
		} else {
			continue
		}
		_ = i
	}
	for total < 100 {
		total++
	}
	switch v := any(total).(type) {
	case int:
		return v
	default:
	}
	select {
	case ch <- total:
	default:
	}
	go func() { ch <- 1 }()
	defer close(ch)
	return total
}
"#,
    );
    let Decl::Func(func) = &file.decls[0] else {
        panic!("expected func decl");
    };
    let body = func.body.as_ref().unwrap();
    assert!(body.stmts.len() >= 7);
    assert!(matches!(body.stmts[1], Stmt::Range { .. }));
    assert!(matches!(body.stmts.last(), Some(Stmt::Return(_))));
}

#[test]
fn brace_in_if_header_opens_the_body_not_a_literal() {
    let file = parse_ok("package demo\nfunc f(x Flags) {\n\tif x {\n\t\treturn\n\t}\n}\n");
    let Decl::Func(func) = &file.decls[0] else {
        panic!("expected func decl");
    };
    let body = func.body.as_ref().unwrap();
    assert!(matches!(body.stmts[0], Stmt::If { .. }));
}

#[test]
fn syntax_errors_are_reported_with_positions() {
    let mut ids = NodeIdGen::new();
    let parse = parse_file("bad.go", "package demo\nfunc f( {\n", &mut ids);
    assert!(!parse.ok());
    assert!(parse.errors[0].pos.line >= 2);
}
