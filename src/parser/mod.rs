//! Parser: logos lexer and recursive-descent parser for Go source files.
//!
//! The parser produces the owned AST in [`crate::syntax`], collecting
//! syntax errors instead of bailing on the first problem. Callers decide
//! whether errors are fatal (the resolution pipeline treats any parse error
//! in a package as fatal for the run).

mod expressions;
mod lexer;
mod statements;
mod types;

#[cfg(test)]
mod tests;

pub use lexer::{Lexer, Tok, Token, tokenize};

use smol_str::SmolStr;
use tracing::debug;

use crate::base::{LineIndex, Position};
use crate::syntax::{
    Decl, Expr, FuncDecl, Ident, ImportSpec, NodeIdGen, SourceFile, TypeSpec, ValueSpec,
};

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub pos: Position,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, pos: Position) -> Self {
        Self {
            message: message.into(),
            pos,
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.pos, self.message)
    }
}

/// Parse result: the file (present even when errors were recovered) plus
/// any syntax errors encountered.
#[derive(Debug)]
pub struct Parse {
    pub file: SourceFile,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse one source file. `file_name` is the base name recorded on the AST
/// and used later for file-scoped visibility.
pub fn parse_file(file_name: &str, text: &str, ids: &mut NodeIdGen) -> Parse {
    let index = LineIndex::new(text);
    let tokens = tokenize(text);
    let mut parser = Parser::new(file_name, &tokens, &index, ids);
    let file = parser.parse_source_file();
    debug!(file = file_name, errors = parser.errors.len(), "parsed");
    Parse {
        file,
        errors: parser.errors,
    }
}

/// Parse a single expression, primarily for tests and tooling.
pub fn parse_expression(text: &str, ids: &mut NodeIdGen) -> Result<Expr, SyntaxError> {
    let index = LineIndex::new(text);
    let tokens = tokenize(text);
    let mut parser = Parser::new("<expr>", &tokens, &index, ids);
    let expr = parser.parse_expr();
    match parser.errors.into_iter().next() {
        Some(err) => Err(err),
        None => Ok(expr),
    }
}

/// The parser state
pub(crate) struct Parser<'a, 'g> {
    tokens: &'a [Token<'a>],
    pos: usize,
    file: SmolStr,
    index: &'a LineIndex,
    ids: &'g mut NodeIdGen,
    errors: Vec<SyntaxError>,
    /// Nonzero while parsing an if/for/switch header, where a `{` opens the
    /// body rather than a composite literal.
    pub(crate) no_composite: u32,
}

impl<'a, 'g> Parser<'a, 'g> {
    fn new(
        file: &str,
        tokens: &'a [Token<'a>],
        index: &'a LineIndex,
        ids: &'g mut NodeIdGen,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            file: SmolStr::new(file),
            index,
            ids,
            errors: Vec::new(),
            no_composite: 0,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    pub(crate) fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn current_kind(&self) -> Tok {
        self.current().map(|t| t.kind).unwrap_or(Tok::Error)
    }

    pub(crate) fn current_text(&self) -> &'a str {
        self.current().map(|t| t.text).unwrap_or("")
    }

    pub(crate) fn at(&self, kind: Tok) -> bool {
        self.current_kind() == kind
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn nth(&self, n: usize) -> Tok {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(Tok::Error)
    }

    pub(crate) fn current_pos(&self) -> Position {
        match self.current() {
            Some(t) => self.index.position(t.offset),
            None => {
                let last = self
                    .tokens
                    .last()
                    .map(|t| t.offset)
                    .unwrap_or_else(|| text_size::TextSize::new(0));
                self.index.position(last)
            }
        }
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    pub(crate) fn bump(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub(crate) fn eat(&mut self, kind: Tok) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: Tok) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!(
                "expected {:?}, found {:?}",
                kind,
                self.current_kind()
            ));
            false
        }
    }

    /// Statement terminator: an inserted or explicit `;`, or a closer.
    pub(crate) fn expect_semi(&mut self) {
        if self.eat(Tok::Semi) {
            return;
        }
        if self.at(Tok::RBrace) || self.at(Tok::RParen) || self.at_eof() {
            return;
        }
        self.error(format!("expected ';', found {:?}", self.current_kind()));
        self.bump();
    }

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        let pos = self.current_pos();
        self.errors.push(SyntaxError::new(message, pos));
    }

    /// Expect an identifier, synthesizing a placeholder one on failure so
    /// parsing can continue.
    pub(crate) fn ident(&mut self) -> Ident {
        if self.at(Tok::Ident) {
            let pos = self.current_pos();
            let name = SmolStr::new(self.current_text());
            self.bump();
            Ident {
                id: self.ids.fresh(),
                name,
                pos,
            }
        } else {
            self.error(format!("expected identifier, found {:?}", self.current_kind()));
            let pos = self.current_pos();
            Ident {
                id: self.ids.fresh(),
                name: SmolStr::new("_"),
                pos,
            }
        }
    }

    pub(crate) fn fresh_id(&mut self) -> crate::syntax::NodeId {
        self.ids.fresh()
    }

    // =========================================================================
    // File and declarations
    // =========================================================================

    fn parse_source_file(&mut self) -> SourceFile {
        // leading terminators from blank lines
        while self.eat(Tok::Semi) {}
        self.expect(Tok::Package);
        let package = self.ident();
        self.expect_semi();

        let mut decls = Vec::new();
        while !self.at_eof() {
            if self.eat(Tok::Semi) {
                continue;
            }
            match self.parse_decl() {
                Some(decl) => decls.push(decl),
                None => self.recover_top_level(),
            }
        }

        SourceFile {
            name: self.file.clone(),
            package,
            decls,
        }
    }

    /// Skip to the next plausible top-level declaration start.
    fn recover_top_level(&mut self) {
        while !self.at_eof() {
            match self.current_kind() {
                Tok::Semi => {
                    self.bump();
                    return;
                }
                Tok::Import | Tok::Const | Tok::Var | Tok::Type | Tok::Func => return,
                _ => self.bump(),
            }
        }
    }

    pub(crate) fn parse_decl(&mut self) -> Option<Decl> {
        match self.current_kind() {
            Tok::Import => {
                self.bump();
                Some(Decl::Import(self.parse_import_specs()))
            }
            Tok::Const => {
                self.bump();
                Some(Decl::Const(self.parse_value_specs()))
            }
            Tok::Var => {
                self.bump();
                Some(Decl::Var(self.parse_value_specs()))
            }
            Tok::Type => {
                self.bump();
                Some(Decl::Type(self.parse_type_specs()))
            }
            Tok::Func => {
                self.bump();
                Some(Decl::Func(self.parse_func_decl()))
            }
            _ => {
                self.error(format!(
                    "expected declaration, found {:?}",
                    self.current_kind()
                ));
                None
            }
        }
    }

    fn parse_import_specs(&mut self) -> Vec<ImportSpec> {
        let mut specs = Vec::new();
        if self.eat(Tok::LParen) {
            while !self.at(Tok::RParen) && !self.at_eof() {
                if self.eat(Tok::Semi) {
                    continue;
                }
                specs.push(self.parse_import_spec());
                self.expect_semi();
            }
            self.expect(Tok::RParen);
        } else {
            specs.push(self.parse_import_spec());
        }
        specs
    }

    fn parse_import_spec(&mut self) -> ImportSpec {
        let pos = self.current_pos();
        let alias = if self.at(Tok::Ident) {
            Some(self.ident())
        } else if self.at(Tok::Dot) {
            // dot imports are accepted but not given an alias binding
            self.bump();
            None
        } else {
            None
        };
        let path = if self.at(Tok::Str) {
            let raw = self.current_text();
            self.bump();
            SmolStr::new(raw.trim_matches(|c| c == '"' || c == '`'))
        } else {
            self.error("expected import path string");
            SmolStr::default()
        };
        ImportSpec { alias, path, pos }
    }

    fn parse_value_specs(&mut self) -> Vec<ValueSpec> {
        let mut specs = Vec::new();
        if self.eat(Tok::LParen) {
            while !self.at(Tok::RParen) && !self.at_eof() {
                if self.eat(Tok::Semi) {
                    continue;
                }
                specs.push(self.parse_value_spec());
                self.expect_semi();
            }
            self.expect(Tok::RParen);
        } else {
            specs.push(self.parse_value_spec());
        }
        specs
    }

    fn parse_value_spec(&mut self) -> ValueSpec {
        let mut names = vec![self.ident()];
        while self.eat(Tok::Comma) {
            names.push(self.ident());
        }
        let ty = if !self.at(Tok::Assign) && !self.at(Tok::Semi) && !self.at(Tok::RParen) {
            Some(self.parse_type())
        } else {
            None
        };
        let mut values = Vec::new();
        if self.eat(Tok::Assign) {
            values.push(self.parse_expr());
            while self.eat(Tok::Comma) {
                values.push(self.parse_expr());
            }
        }
        ValueSpec { names, ty, values }
    }

    fn parse_type_specs(&mut self) -> Vec<TypeSpec> {
        let mut specs = Vec::new();
        if self.eat(Tok::LParen) {
            while !self.at(Tok::RParen) && !self.at_eof() {
                if self.eat(Tok::Semi) {
                    continue;
                }
                specs.push(self.parse_type_spec());
                self.expect_semi();
            }
            self.expect(Tok::RParen);
        } else {
            specs.push(self.parse_type_spec());
        }
        specs
    }

    fn parse_type_spec(&mut self) -> TypeSpec {
        let name = self.ident();
        // `type T = U` alias form shares the representation of `type T U`
        self.eat(Tok::Assign);
        let ty = self.parse_type();
        TypeSpec { name, ty }
    }

    fn parse_func_decl(&mut self) -> FuncDecl {
        let recv = if self.eat(Tok::LParen) {
            let group = self.parse_field_group();
            self.expect(Tok::RParen);
            Some(group)
        } else {
            None
        };
        let name = self.ident();
        let ty = self.parse_signature();
        let body = if self.at(Tok::LBrace) {
            Some(self.parse_block())
        } else {
            None
        };
        FuncDecl {
            recv,
            name,
            ty,
            body,
        }
    }
}
