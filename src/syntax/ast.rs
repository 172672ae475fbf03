//! Abstract syntax tree for Go source files.
//!
//! The tree is fully owned; cross-references out of the tree go through
//! [`NodeId`]s handed out by a per-program [`NodeIdGen`], never raw pointers.
//! Type expressions are ordinary [`Expr`] variants (a call and a conversion
//! are syntactically identical, so the distinction is semantic, not
//! syntactic).

use smol_str::SmolStr;

use crate::base::Position;

/// Stable identity of an identifier occurrence in some syntax tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Hands out program-unique [`NodeId`]s during parsing.
#[derive(Debug, Default)]
pub struct NodeIdGen {
    next: u32,
}

impl NodeIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn count(&self) -> u32 {
        self.next
    }
}

/// An identifier occurrence with its stable id and source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub id: NodeId,
    pub name: SmolStr,
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    Str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `^`
    Xor,
    /// `!`
    Not,
    /// `&`
    And,
    /// `<-`
    Recv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    AndNot,
    Shl,
    Shr,
    LAnd,
    LOr,
    Eql,
    Neq,
    Lss,
    Leq,
    Gtr,
    Geq,
    /// `ch <- v` in expression position
    Send,
}

impl BinaryOp {
    /// True for `== != < <= > >=`.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eql
                | BinaryOp::Neq
                | BinaryOp::Lss
                | BinaryOp::Leq
                | BinaryOp::Gtr
                | BinaryOp::Geq
        )
    }
}

/// Array length position in an array type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayLenExpr {
    /// `[N]T`
    Fixed(Box<Expr>),
    /// `[]T`
    Slice,
    /// `[...]T`, length determined by the literal
    Ellipsis,
}

/// Channel direction as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDirExpr {
    Send,
    Recv,
    Both,
}

/// One `names Type` group inside a struct or parameter list.
/// An embedded field has no names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldGroup {
    pub names: Vec<Ident>,
    pub ty: Expr,
}

/// A method signature inside an interface type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: Ident,
    pub params: Vec<FieldGroup>,
    pub results: Vec<FieldGroup>,
}

/// A function signature: parameter and result field groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncTypeExpr {
    pub params: Vec<FieldGroup>,
    pub results: Vec<FieldGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Ident(Ident),
    Lit {
        kind: LitKind,
        text: SmolStr,
        pos: Position,
    },
    Paren(Box<Expr>),
    Unary {
        op: UnaryOp,
        x: Box<Expr>,
        pos: Position,
    },
    Binary {
        op: BinaryOp,
        x: Box<Expr>,
        y: Box<Expr>,
    },
    /// `*X`: a dereference in value position, a pointer type in type position.
    Star {
        x: Box<Expr>,
        pos: Position,
    },
    Call {
        fun: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        x: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        x: Box<Expr>,
        low: Option<Box<Expr>>,
        high: Option<Box<Expr>>,
    },
    Selector {
        x: Box<Expr>,
        sel: Ident,
    },
    /// `x.(T)`; `ty` is `None` for the `x.(type)` form in type switches.
    TypeAssert {
        x: Box<Expr>,
        ty: Option<Box<Expr>>,
    },
    /// `T{...}`; `ty` is `None` for an elided nested literal.
    Composite {
        ty: Option<Box<Expr>>,
        elts: Vec<Expr>,
        pos: Position,
    },
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    FuncLit {
        ty: FuncTypeExpr,
        body: Block,
        pos: Position,
    },
    ArrayType {
        len: ArrayLenExpr,
        elem: Box<Expr>,
        pos: Position,
    },
    StructType {
        fields: Vec<FieldGroup>,
        pos: Position,
    },
    InterfaceType {
        methods: Vec<MethodSpec>,
        pos: Position,
    },
    MapType {
        key: Box<Expr>,
        value: Box<Expr>,
        pos: Position,
    },
    ChanType {
        dir: ChanDirExpr,
        value: Box<Expr>,
        pos: Position,
    },
    FuncType {
        ty: FuncTypeExpr,
        pos: Position,
    },
}

impl Expr {
    /// Source position of the leftmost token of this expression.
    pub fn pos(&self) -> Position {
        match self {
            Expr::Ident(id) => id.pos,
            Expr::Lit { pos, .. }
            | Expr::Unary { pos, .. }
            | Expr::Star { pos, .. }
            | Expr::Composite { pos, .. }
            | Expr::FuncLit { pos, .. }
            | Expr::ArrayType { pos, .. }
            | Expr::StructType { pos, .. }
            | Expr::InterfaceType { pos, .. }
            | Expr::MapType { pos, .. }
            | Expr::ChanType { pos, .. }
            | Expr::FuncType { pos, .. } => *pos,
            Expr::Paren(x) => x.pos(),
            Expr::Binary { x, .. }
            | Expr::Call { fun: x, .. }
            | Expr::Index { x, .. }
            | Expr::Slice { x, .. }
            | Expr::Selector { x, .. }
            | Expr::TypeAssert { x, .. }
            | Expr::KeyValue { key: x, .. } => x.pos(),
        }
    }

    /// True for the expression forms that are type syntax.
    pub fn is_type_syntax(&self) -> bool {
        matches!(
            self,
            Expr::ArrayType { .. }
                | Expr::StructType { .. }
                | Expr::InterfaceType { .. }
                | Expr::MapType { .. }
                | Expr::ChanType { .. }
                | Expr::FuncType { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub alias: Option<Ident>,
    pub path: SmolStr,
    pub pos: Position,
}

/// One `name, name Type = values` line of a const or var declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub ty: Option<Expr>,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: Ident,
    pub ty: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    /// Receiver field for methods, absent for plain functions.
    pub recv: Option<FieldGroup>,
    pub name: Ident,
    pub ty: FuncTypeExpr,
    pub body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Import(Vec<ImportSpec>),
    Const(Vec<ValueSpec>),
    Var(Vec<ValueSpec>),
    Type(Vec<TypeSpec>),
    Func(FuncDecl),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseClause {
    /// Empty for `default:`.
    pub exprs: Vec<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommClause {
    /// The send or receive statement; `None` for `default:`.
    pub comm: Option<Box<Stmt>>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Decl(Decl),
    Expr(Expr),
    Send {
        chan: Expr,
        value: Expr,
    },
    IncDec {
        x: Expr,
        inc: bool,
    },
    Assign {
        lhs: Vec<Expr>,
        rhs: Vec<Expr>,
        /// `:=` short declaration
        define: bool,
        /// Set for compound assignment such as `+=`.
        op: Option<BinaryOp>,
    },
    Go(Expr),
    Defer(Expr),
    Return(Vec<Expr>),
    Branch {
        kind: BranchKind,
        label: Option<Ident>,
    },
    Block(Block),
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        then: Block,
        els: Option<Box<Stmt>>,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Block,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        x: Expr,
        body: Block,
    },
    Switch {
        init: Option<Box<Stmt>>,
        tag: Option<Expr>,
        cases: Vec<CaseClause>,
    },
    TypeSwitch {
        init: Option<Box<Stmt>>,
        /// `v := x.(type)` binding, when present.
        bind: Option<Ident>,
        x: Expr,
        cases: Vec<CaseClause>,
    },
    Select {
        cases: Vec<CommClause>,
    },
    Labeled {
        label: Ident,
        stmt: Box<Stmt>,
    },
    Empty,
}

/// A parsed source file: package clause plus top-level declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// File name (base name, the key used for file-scoped visibility).
    pub name: SmolStr,
    pub package: Ident,
    pub decls: Vec<Decl>,
}

impl SourceFile {
    pub fn imports(&self) -> impl Iterator<Item = &ImportSpec> {
        self.decls.iter().flat_map(|d| match d {
            Decl::Import(specs) => specs.as_slice(),
            _ => &[],
        })
    }
}
