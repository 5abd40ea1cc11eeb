//! Code-token recognition.
//!
//! `RawToken` covers everything inside a code span except whitespace,
//! comments, strings and delimiters, which the mode machine in `lib.rs`
//! handles by hand. Keywords come out as `Ident` and are resolved by
//! [`TokenKind::keyword`].

use logos::Logos;
use stencil_ir::TokenKind;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawToken {
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+")]
    Int,

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Float,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token("..<")]
    DotDotLt,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("//")]
    SlashSlash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("|")]
    Pipe,
    #[token("=>")]
    FatArrow,
}

impl RawToken {
    /// Final token kind; `slice` resolves identifiers to keywords.
    pub(crate) fn to_kind(self, slice: &str) -> TokenKind {
        match self {
            RawToken::Ident => TokenKind::keyword(slice).unwrap_or(TokenKind::Ident),
            RawToken::Int => TokenKind::Int,
            RawToken::Float => TokenKind::Float,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Dot => TokenKind::Dot,
            RawToken::DotDot => TokenKind::DotDot,
            RawToken::DotDotLt => TokenKind::DotDotLt,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Eq => TokenKind::Eq,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::Gt => TokenKind::Gt,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::SlashSlash => TokenKind::SlashSlash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Bang => TokenKind::Bang,
            RawToken::AmpAmp => TokenKind::AmpAmp,
            RawToken::PipePipe => TokenKind::PipePipe,
            RawToken::Pipe => TokenKind::Pipe,
            RawToken::FatArrow => TokenKind::FatArrow,
        }
    }
}

/// Recognize the single code token at the start of `rest`.
///
/// Returns the kind and byte length, or `None` when nothing matches.
pub(crate) fn next_code_token(rest: &str) -> Option<(TokenKind, usize)> {
    let mut lexer = RawToken::lexer(rest);
    match lexer.next()? {
        Ok(raw) if lexer.span().start == 0 => {
            let len = lexer.span().end;
            Some((raw.to_kind(lexer.slice()), len))
        }
        _ => None,
    }
}
