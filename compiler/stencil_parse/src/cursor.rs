//! Token cursor for navigating the token stream.
//!
//! Provides low-level token access, lookahead, and consumption methods.

use stencil_ir::{Span, Token, TokenKind};

use crate::ParseError;

/// Cursor over a lexed template.
///
/// The token slice always ends with `Eof`; reads past the end keep returning
/// that final token so lookahead never has to bounds-check.
pub struct Cursor<'a> {
    tokens: &'a [Token],
    source: &'a str,
    eof: Token,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Token], source: &'a str) -> Self {
        let end = Span::from_range(source.len()..source.len());
        let eof = tokens
            .last()
            .copied()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, end, 1, 1));
        Cursor {
            tokens,
            source,
            eof,
            pos: 0,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Current position in the token stream.
    ///
    /// Used for progress tracking: compare positions before and after
    /// parsing to determine if tokens were consumed.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Token at an absolute position, if any.
    pub fn token_at(&self, index: usize) -> Option<&'a Token> {
        self.tokens.get(index)
    }

    #[inline]
    pub fn current(&self) -> Token {
        self.peek(0)
    }

    #[inline]
    pub fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Source text of the current token.
    pub fn current_text(&self) -> &'a str {
        self.current().text(self.source)
    }

    /// Look `offset` tokens ahead of the current one.
    pub fn peek(&self, offset: usize) -> Token {
        self.tokens.get(self.pos + offset).copied().unwrap_or(self.eof)
    }

    pub fn peek_kind(&self, offset: usize) -> TokenKind {
        self.peek(offset).kind
    }

    /// Span of the most recently consumed token.
    pub fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(Span::point(self.current_span().start), |t| t.span)
    }

    pub fn text(&self, token: &Token) -> &'a str {
        token.text(self.source)
    }

    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Current token is an identifier spelled `word`.
    pub fn check_word(&self, word: &str) -> bool {
        self.check(TokenKind::Ident) && self.current_text() == word
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Consume the current token. `Eof` is never consumed.
    pub fn advance(&mut self) -> Token {
        let token = self.current();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it has the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of the given kind or report what was found instead.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(
                self.current(),
                kind.display_name(),
                self.source,
            ))
        }
    }
}
