//! Syntax: Go AST types produced by the parser.
//!
//! Every identifier node carries a stable [`NodeId`] so the semantic layer
//! can bind occurrences to symbols and rewrite those bindings during
//! placeholder healing without holding references into the tree.

pub mod ast;

pub use ast::{
    ArrayLenExpr, BinaryOp, Block, BranchKind, CaseClause, ChanDirExpr, CommClause, Decl, Expr,
    FieldGroup, FuncDecl, FuncTypeExpr, Ident, ImportSpec, LitKind, MethodSpec, NodeId,
    NodeIdGen, SourceFile, Stmt, TypeSpec, UnaryOp, ValueSpec,
};
