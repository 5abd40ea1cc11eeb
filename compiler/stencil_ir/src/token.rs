//! Tokens produced by the lexer.
//!
//! `TokenKind` is a fieldless tag: literal values are re-read from the source
//! through the token's span, so every token is a small `Copy` value and the
//! kind fits in a `u8` discriminant (used by the parser's bitset recovery).

use std::fmt;
use std::ops::{Deref, Index};

use bitflags::bitflags;

use crate::Span;

/// Token kinds shared by both dialects.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum TokenKind {
    // Template structure
    /// Literal template text between code spans.
    Text,
    /// Escaped raw block (`{%{ … }%}` or `{% raw %}…{% endraw %}`), delimiters included.
    Raw,
    /// `{{` or `{{-`.
    CodeEnter,
    /// `}}` or `-}}`.
    CodeExit,
    /// Liquid `{%` or `{%-`.
    TagEnter,
    /// Liquid `%}` or `-%}`.
    TagExit,
    /// `+++` line opening or closing front matter.
    FrontMatterMarker,

    // Separators and trivia
    Newline,
    Semicolon,
    Whitespace,
    Comment,

    // Literals
    Ident,
    Int,
    Float,
    String,

    // Keywords
    If,
    Else,
    End,
    For,
    In,
    While,
    With,
    Case,
    When,
    Func,
    Ret,
    Break,
    Continue,
    Import,
    Include,
    Capture,
    True,
    False,
    Null,
    And,
    Or,
    Not,
    Contains,
    Fn,

    // Punctuation and operators
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    DotDot,
    DotDotLt,
    Colon,
    Eq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    SlashSlash,
    Percent,
    Bang,
    AmpAmp,
    PipePipe,
    Pipe,
    FatArrow,

    /// A character the lexer could not classify.
    Error,
    Eof,
}

impl TokenKind {
    /// Discriminant index, used for bitset membership.
    #[inline]
    pub const fn discriminant_index(self) -> u8 {
        self as u8
    }

    /// Whitespace and comments, only present with trivia retention.
    #[inline]
    pub const fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// Keywords shared by both dialects.
    pub const fn is_keyword(self) -> bool {
        (self as u8) >= (TokenKind::If as u8) && (self as u8) <= (TokenKind::Fn as u8)
    }

    /// Look up a keyword by its source spelling.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "end" => TokenKind::End,
            "for" => TokenKind::For,
            "in" => TokenKind::In,
            "while" => TokenKind::While,
            "with" => TokenKind::With,
            "case" => TokenKind::Case,
            "when" => TokenKind::When,
            "func" => TokenKind::Func,
            "ret" => TokenKind::Ret,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "import" => TokenKind::Import,
            "include" => TokenKind::Include,
            "capture" => TokenKind::Capture,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" | "nil" => TokenKind::Null,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "contains" => TokenKind::Contains,
            "fn" => TokenKind::Fn,
            _ => return None,
        };
        Some(kind)
    }

    /// Human-readable name for diagnostics.
    pub const fn display_name(self) -> &'static str {
        match self {
            TokenKind::Text => "text",
            TokenKind::Raw => "raw block",
            TokenKind::CodeEnter => "`{{`",
            TokenKind::CodeExit => "`}}`",
            TokenKind::TagEnter => "`{%`",
            TokenKind::TagExit => "`%}`",
            TokenKind::FrontMatterMarker => "`+++`",
            TokenKind::Newline => "newline",
            TokenKind::Semicolon => "`;`",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Comment => "comment",
            TokenKind::Ident => "identifier",
            TokenKind::Int => "integer",
            TokenKind::Float => "float",
            TokenKind::String => "string",
            TokenKind::If => "`if`",
            TokenKind::Else => "`else`",
            TokenKind::End => "`end`",
            TokenKind::For => "`for`",
            TokenKind::In => "`in`",
            TokenKind::While => "`while`",
            TokenKind::With => "`with`",
            TokenKind::Case => "`case`",
            TokenKind::When => "`when`",
            TokenKind::Func => "`func`",
            TokenKind::Ret => "`ret`",
            TokenKind::Break => "`break`",
            TokenKind::Continue => "`continue`",
            TokenKind::Import => "`import`",
            TokenKind::Include => "`include`",
            TokenKind::Capture => "`capture`",
            TokenKind::True => "`true`",
            TokenKind::False => "`false`",
            TokenKind::Null => "`null`",
            TokenKind::And => "`and`",
            TokenKind::Or => "`or`",
            TokenKind::Not => "`not`",
            TokenKind::Contains => "`contains`",
            TokenKind::Fn => "`fn`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::DotDot => "`..`",
            TokenKind::DotDotLt => "`..<`",
            TokenKind::Colon => "`:`",
            TokenKind::Eq => "`=`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`!=`",
            TokenKind::Lt => "`<`",
            TokenKind::LtEq => "`<=`",
            TokenKind::Gt => "`>`",
            TokenKind::GtEq => "`>=`",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::SlashSlash => "`//`",
            TokenKind::Percent => "`%`",
            TokenKind::Bang => "`!`",
            TokenKind::AmpAmp => "`&&`",
            TokenKind::PipePipe => "`||`",
            TokenKind::Pipe => "`|`",
            TokenKind::FatArrow => "`=>`",
            TokenKind::Error => "invalid character",
            TokenKind::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

bitflags! {
    /// Per-token lexical facts the parser needs but the kind doesn't carry.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TokenFlags: u8 {
        /// Trim whitespace from the text before this token (`{{-`, `{%-`).
        const TRIM_LEFT = 1 << 0;
        /// Trim whitespace from the text after this token (`-}}`, `-%}`).
        const TRIM_RIGHT = 1 << 1;
        /// Whitespace or a comment immediately precedes this token.
        const SPACE_BEFORE = 1 << 2;
    }
}

/// A lexed token with its exact source location.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// 1-based line of the first character.
    pub line: u32,
    /// 1-based column (in characters) of the first character.
    pub column: u32,
    pub flags: TokenFlags,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, line: u32, column: u32) -> Self {
        Token {
            kind,
            span,
            line,
            column,
            flags: TokenFlags::empty(),
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: TokenFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Raw source text of this token.
    #[inline]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        self.span.text(source).unwrap_or("")
    }

    #[inline]
    pub fn trims_left(&self) -> bool {
        self.flags.contains(TokenFlags::TRIM_LEFT)
    }

    #[inline]
    pub fn trims_right(&self) -> bool {
        self.flags.contains(TokenFlags::TRIM_RIGHT)
    }

    #[inline]
    pub fn has_space_before(&self) -> bool {
        self.flags.contains(TokenFlags::SPACE_BEFORE)
    }
}

/// Lexer output: a token vector always terminated by an `Eof` token.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new() -> Self {
        TokenList { tokens: Vec::new() }
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    /// Token kinds only, for compact assertions.
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind).collect()
    }
}

impl Deref for TokenList {
    type Target = [Token];

    fn deref(&self) -> &[Token] {
        &self.tokens
    }
}

impl Index<usize> for TokenList {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

impl FromIterator<Token> for TokenList {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        TokenList {
            tokens: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup() {
        assert_eq!(TokenKind::keyword("end"), Some(TokenKind::End));
        assert_eq!(TokenKind::keyword("nil"), Some(TokenKind::Null));
        assert_eq!(TokenKind::keyword("endfor"), None);
        assert!(TokenKind::Fn.is_keyword());
        assert!(TokenKind::If.is_keyword());
        assert!(!TokenKind::Ident.is_keyword());
        assert!(!TokenKind::LParen.is_keyword());
    }

    #[test]
    fn discriminants_fit_in_bitset() {
        assert!(TokenKind::Eof.discriminant_index() < 128);
    }

    #[test]
    fn token_text_and_flags() {
        let source = "{{- x }}";
        let token = Token::new(TokenKind::CodeEnter, Span::new(0, 3), 1, 1)
            .with_flags(TokenFlags::TRIM_LEFT);
        assert_eq!(token.text(source), "{{-");
        assert!(token.trims_left());
        assert!(!token.trims_right());
        assert!(!token.has_space_before());
    }
}
