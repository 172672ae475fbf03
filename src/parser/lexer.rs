//! Logos-based lexer for Go source
//!
//! Fast tokenization using the logos crate. The iterator wrapper performs
//! automatic terminator insertion: a newline becomes a `Semi` token when the
//! previous significant token can end a statement.

use logos::Logos;
use text_size::TextSize;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: Tok,
    pub text: &'a str,
    pub offset: TextSize,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, Tok>,
    /// Kind of the last significant (non-newline) token produced.
    last: Option<Tok>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: Tok::lexer(input),
            last: None,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = self.inner.next()?;
            let text = self.inner.slice();
            let offset = TextSize::new(self.inner.span().start as u32);
            let kind = match raw {
                Ok(t) => t,
                Err(()) => Tok::Error,
            };

            if kind == Tok::Newline {
                if self.last.take().is_some_and(ends_statement) {
                    return Some(Token {
                        kind: Tok::Semi,
                        text: ";",
                        offset,
                    });
                }
                continue;
            }

            self.last = Some(kind);
            return Some(Token { kind, text, offset });
        }
    }
}

/// Tokenize a whole file, appending a final terminator when the last
/// significant token needs one (a file rarely ends in an explicit `;`).
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens: Vec<Token<'_>> = Lexer::new(input).collect();
    if let Some(last) = tokens.last()
        && last.kind != Tok::Semi
        && ends_statement(last.kind)
    {
        tokens.push(Token {
            kind: Tok::Semi,
            text: ";",
            offset: TextSize::new(input.len() as u32),
        });
    }
    tokens
}

/// True when a newline after this token terminates a statement.
fn ends_statement(kind: Tok) -> bool {
    matches!(
        kind,
        Tok::Ident
            | Tok::Int
            | Tok::Float
            | Tok::Imag
            | Tok::Char
            | Tok::Str
            | Tok::Break
            | Tok::Continue
            | Tok::Fallthrough
            | Tok::Return
            | Tok::IncOp
            | Tok::DecOp
            | Tok::RParen
            | Tok::RBrack
            | Tok::RBrace
    )
}

/// Logos token enum for the Go lexical grammar
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*[^/])*\*/")]
pub enum Tok {
    #[token("\n")]
    Newline,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[0-9](_?[0-9])*\.[0-9_]*([eE][+-]?[0-9]+)?i", priority = 6)]
    #[regex(r"[0-9](_?[0-9])*([eE][+-]?[0-9]+)?i", priority = 5)]
    Imag,

    #[regex(r"[0-9](_?[0-9])*\.[0-9_]*([eE][+-]?[0-9]+)?", priority = 4)]
    #[regex(r"\.[0-9](_?[0-9])*([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9](_?[0-9])*[eE][+-]?[0-9]+", priority = 4)]
    Float,

    #[regex(r"0[xX](_?[0-9a-fA-F])+")]
    #[regex(r"0[oO](_?[0-7])+")]
    #[regex(r"0[bB](_?[01])+")]
    #[regex(r"[0-9](_?[0-9])*", priority = 3)]
    Int,

    #[regex(r"'([^'\\\n]|\\.)*'")]
    Char,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"`[^`]*`")]
    Str,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("break")]
    Break,
    #[token("case")]
    Case,
    #[token("chan")]
    Chan,
    #[token("const")]
    Const,
    #[token("continue")]
    Continue,
    #[token("default")]
    Default,
    #[token("defer")]
    Defer,
    #[token("else")]
    Else,
    #[token("fallthrough")]
    Fallthrough,
    #[token("for")]
    For,
    #[token("func")]
    Func,
    #[token("go")]
    Go,
    #[token("goto")]
    Goto,
    #[token("if")]
    If,
    #[token("import")]
    Import,
    #[token("interface")]
    Interface,
    #[token("map")]
    Map,
    #[token("package")]
    Package,
    #[token("range")]
    Range,
    #[token("return")]
    Return,
    #[token("select")]
    Select,
    #[token("struct")]
    Struct,
    #[token("switch")]
    Switch,
    #[token("type")]
    Type,
    #[token("var")]
    Var,

    #[regex(r"[\p{XID_Start}_][\p{XID_Continue}]*", priority = 2)]
    Ident,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION (longest first)
    // =========================================================================
    #[token("<<=")]
    ShlAssign,
    #[token(">>=")]
    ShrAssign,
    #[token("&^=")]
    AndNotAssign,
    #[token("...")]
    Ellipsis,
    #[token("&&")]
    LAnd,
    #[token("||")]
    LOr,
    #[token("<-")]
    Arrow,
    #[token("++")]
    IncOp,
    #[token("--")]
    DecOp,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token(":=")]
    Define,
    #[token("+=")]
    AddAssign,
    #[token("-=")]
    SubAssign,
    #[token("*=")]
    MulAssign,
    #[token("/=")]
    QuoAssign,
    #[token("%=")]
    RemAssign,
    #[token("&=")]
    AndAssign,
    #[token("|=")]
    OrAssign,
    #[token("^=")]
    XorAssign,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("&^")]
    AndNot,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Assign,
    #[token("!")]
    Bang,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBrack,
    #[token("]")]
    RBrack,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,

    /// Any character the grammar has no token for; loses to every real
    /// token by priority. Also the parser's end-of-input sentinel.
    #[regex(r".", priority = 0)]
    Error,
}
