//! Primary expressions and postfix operations.

use smallvec::SmallVec;
use stencil_diagnostic::ErrorCode;
use stencil_ir::{CallStyle, ExprId, ExprKind, Name, NameRange, ObjectEntry, Span, TokenKind};
use stencil_lexer::{cook_float, cook_int, cook_string, IntLiteral};

use crate::{ErrorContext, ParseError, Parser};

impl Parser<'_> {
    /// Primary followed by `.name`, `[index]` and adjacent `(args)`.
    pub(crate) fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let primary = self.parse_primary()?;
        self.parse_postfix_ops(primary, true)
    }

    /// Callee of a native pipe: postfix without the call suffix, which the
    /// pipe turns into extra arguments.
    pub(super) fn parse_pipe_callee(&mut self) -> Result<ExprId, ParseError> {
        let primary = self.parse_primary()?;
        self.parse_postfix_ops(primary, false)
    }

    /// Liquid filter name: `name` or `name.member`.
    pub(super) fn parse_filter_name(&mut self) -> Result<ExprId, ParseError> {
        let token = self.cursor.expect(TokenKind::Ident)?;
        let name = self.arena.intern(self.cursor.text(&token));
        let mut callee = self.alloc_expr(ExprKind::Ident(name), token.span);
        while self.cursor.eat(TokenKind::Dot) {
            let name = self.parse_member_name()?;
            let span = self.span_from(self.expr_span(callee));
            callee = self.alloc_expr(
                ExprKind::Member {
                    receiver: callee,
                    name,
                },
                span,
            );
        }
        Ok(callee)
    }

    /// Index and call suffixes must touch what they apply to: `f (x)` and
    /// `a [0]` are not postfix operations.
    fn parse_postfix_ops(&mut self, mut expr: ExprId, allow_call: bool) -> Result<ExprId, ParseError> {
        loop {
            let token = self.cursor.current();
            match token.kind {
                TokenKind::Dot => {
                    self.cursor.advance();
                    let name = self.parse_member_name()?;
                    let span = self.span_from(self.expr_span(expr));
                    expr = self.alloc_expr(
                        ExprKind::Member {
                            receiver: expr,
                            name,
                        },
                        span,
                    );
                }
                TokenKind::LBracket if !token.has_space_before() => {
                    self.cursor.advance();
                    self.skip_newlines();
                    let index = self.parse_expr()?;
                    self.skip_newlines();
                    if !self.cursor.eat(TokenKind::RBracket) {
                        return Err(ParseError::unclosed(
                            token.span,
                            self.cursor.current_span(),
                            '[',
                            ']',
                        ));
                    }
                    let span = self.span_from(self.expr_span(expr));
                    expr = self.alloc_expr(
                        ExprKind::Index {
                            receiver: expr,
                            index,
                        },
                        span,
                    );
                }
                TokenKind::LParen if allow_call && !token.has_space_before() => {
                    let mut args: SmallVec<[ExprId; 4]> = SmallVec::new();
                    self.parse_call_args(&mut args)?;
                    let args = self.arena.alloc_expr_list(args);
                    let span = self.span_from(self.expr_span(expr));
                    expr = self.alloc_expr(
                        ExprKind::Call {
                            callee: expr,
                            args,
                            style: CallStyle::Paren,
                        },
                        span,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    /// `( expr, ... )` appended to `args`.
    pub(super) fn parse_call_args(
        &mut self,
        args: &mut SmallVec<[ExprId; 4]>,
    ) -> Result<(), ParseError> {
        let open = self.cursor.expect(TokenKind::LParen)?.span;
        self.parse_delimited(open, TokenKind::RParen, ('(', ')'), |p| {
            args.push(p.parse_expr()?);
            Ok(())
        })
        .map_err(|e| e.with_context(ErrorContext::CallArguments))
    }

    /// Comma-separated items up to `close`; newlines inside the delimiters
    /// are insignificant. A trailing comma is allowed.
    fn parse_delimited(
        &mut self,
        open: Span,
        close: TokenKind,
        delimiters: (char, char),
        mut item: impl FnMut(&mut Self) -> Result<(), ParseError>,
    ) -> Result<(), ParseError> {
        loop {
            self.skip_newlines();
            if self.cursor.eat(close) {
                return Ok(());
            }
            if matches!(
                self.cursor.current_kind(),
                TokenKind::Eof | TokenKind::CodeExit | TokenKind::TagExit
            ) {
                return Err(ParseError::unclosed(
                    open,
                    self.cursor.current_span(),
                    delimiters.0,
                    delimiters.1,
                ));
            }
            item(self)?;
            self.skip_newlines();
            if self.cursor.eat(TokenKind::Comma) {
                continue;
            }
            if self.cursor.eat(close) {
                return Ok(());
            }
            return Err(ParseError::unclosed(
                open,
                self.cursor.current_span(),
                delimiters.0,
                delimiters.1,
            ));
        }
    }

    fn skip_newlines(&mut self) {
        while self.cursor.eat(TokenKind::Newline) {}
    }

    fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let token = self.cursor.current();
        let span = token.span;
        match token.kind {
            TokenKind::Int => {
                self.cursor.advance();
                let kind = match cook_int(self.cursor.text(&token)) {
                    Some(IntLiteral::Small(value)) => ExprKind::Int(value),
                    Some(IntLiteral::Wide(value)) => ExprKind::BigInt(value),
                    Some(IntLiteral::Float(value)) if value.is_finite() => {
                        ExprKind::Float(value.to_bits())
                    }
                    Some(IntLiteral::Float(_)) | None => return Err(self.invalid_number(span)),
                };
                Ok(self.alloc_expr(kind, span))
            }
            TokenKind::Float => {
                self.cursor.advance();
                match cook_float(self.cursor.text(&token)) {
                    Some(value) => Ok(self.alloc_expr(ExprKind::Float(value.to_bits()), span)),
                    None => Err(self.invalid_number(span)),
                }
            }
            TokenKind::String => {
                self.cursor.advance();
                let name = self.cook_string_token(span)?;
                Ok(self.alloc_expr(ExprKind::String(name), span))
            }
            TokenKind::True | TokenKind::False => {
                self.cursor.advance();
                Ok(self.alloc_expr(ExprKind::Bool(token.kind == TokenKind::True), span))
            }
            TokenKind::Null => {
                self.cursor.advance();
                Ok(self.alloc_expr(ExprKind::Null, span))
            }
            TokenKind::Ident => {
                self.cursor.advance();
                let name = self.arena.intern(self.cursor.text(&token));
                Ok(self.alloc_expr(ExprKind::Ident(name), span))
            }
            // `for.index` inside a loop body
            TokenKind::For if self.cursor.peek_kind(1) == TokenKind::Dot => {
                self.cursor.advance();
                let name = self.arena.intern("for");
                Ok(self.alloc_expr(ExprKind::Ident(name), span))
            }
            TokenKind::LParen => {
                self.cursor.advance();
                self.skip_newlines();
                let inner = self.parse_expr()?;
                self.skip_newlines();
                if !self.cursor.eat(TokenKind::RParen) {
                    return Err(ParseError::unclosed(
                        span,
                        self.cursor.current_span(),
                        '(',
                        ')',
                    ));
                }
                Ok(inner)
            }
            TokenKind::LBracket => self.parse_array(),
            TokenKind::LBrace => self.parse_object(),
            TokenKind::Fn => self.parse_lambda(),
            TokenKind::Error => {
                self.cursor.advance();
                Err(self.unexpected_char(token.span))
            }
            _ => Err(ParseError::expected_expression(token, self.cursor.source())),
        }
    }

    fn parse_array(&mut self) -> Result<ExprId, ParseError> {
        let open = self.cursor.advance().span;
        let mut items: SmallVec<[ExprId; 8]> = SmallVec::new();
        self.parse_delimited(open, TokenKind::RBracket, ('[', ']'), |p| {
            items.push(p.parse_expr()?);
            Ok(())
        })
        .map_err(|e| e.with_context(ErrorContext::ArrayLiteral))?;
        let items = self.arena.alloc_expr_list(items);
        let span = self.span_from(open);
        Ok(self.alloc_expr(ExprKind::Array(items), span))
    }

    /// `{ key: value, "quoted key": value }`
    fn parse_object(&mut self) -> Result<ExprId, ParseError> {
        let open = self.cursor.advance().span;
        let mut entries: Vec<ObjectEntry> = Vec::new();
        self.parse_delimited(open, TokenKind::RBrace, ('{', '}'), |p| {
            let key_token = p.cursor.current();
            let key = match key_token.kind {
                TokenKind::String => {
                    p.cursor.advance();
                    p.cook_string_token(key_token.span)?
                }
                kind if kind == TokenKind::Ident || kind.is_keyword() => {
                    p.cursor.advance();
                    p.arena.intern(p.cursor.text(&key_token))
                }
                _ => return Err(p.unexpected("object key")),
            };
            p.cursor.expect(TokenKind::Colon)?;
            p.skip_newlines();
            let value = p.parse_expr()?;
            entries.push(ObjectEntry {
                key,
                value,
                span: p.span_from(key_token.span),
            });
            Ok(())
        })
        .map_err(|e| e.with_context(ErrorContext::ObjectLiteral))?;
        let entries = self.arena.alloc_entries(entries);
        let span = self.span_from(open);
        Ok(self.alloc_expr(ExprKind::Object(entries), span))
    }

    /// `fn(a, b) => body`
    fn parse_lambda(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.advance().span;
        let params = self
            .parse_params()
            .map_err(|e| e.with_context(ErrorContext::Lambda))?;
        self.cursor
            .expect(TokenKind::FatArrow)
            .map_err(|e| e.with_context(ErrorContext::Lambda))?;
        let body = self
            .parse_expr()
            .map_err(|e| e.with_context(ErrorContext::Lambda))?;
        let span = self.span_from(start);
        Ok(self.alloc_expr(ExprKind::Lambda { params, body }, span))
    }

    /// `(a, b, c)` parameter names.
    pub(crate) fn parse_params(&mut self) -> Result<NameRange, ParseError> {
        let open = self.cursor.expect(TokenKind::LParen)?.span;
        let mut names: SmallVec<[Name; 4]> = SmallVec::new();
        self.parse_delimited(open, TokenKind::RParen, ('(', ')'), |p| {
            names.push(p.expect_name("parameter name")?);
            Ok(())
        })?;
        Ok(self.arena.alloc_name_list(names))
    }

    /// A plain identifier, interned.
    pub(crate) fn expect_name(&mut self, what: &str) -> Result<Name, ParseError> {
        let token = self.cursor.current();
        if token.kind != TokenKind::Ident {
            let err = self.unexpected(what);
            return Err(if err.code == ErrorCode::E1001 {
                ParseError {
                    code: ErrorCode::E1004,
                    ..err
                }
            } else {
                err
            });
        }
        self.cursor.advance();
        Ok(self.arena.intern(self.cursor.text(&token)))
    }

    /// Member names may be keywords: `page.end`, `for.first`.
    fn parse_member_name(&mut self) -> Result<Name, ParseError> {
        let token = self.cursor.current();
        if token.kind == TokenKind::Ident || token.kind.is_keyword() {
            self.cursor.advance();
            return Ok(self.arena.intern(self.cursor.text(&token)));
        }
        let err = self.unexpected("member name");
        Err(ParseError {
            code: ErrorCode::E1004,
            ..err
        })
    }

    fn cook_string_token(&mut self, span: Span) -> Result<Name, ParseError> {
        let text = span.text(self.cursor.source()).unwrap_or("");
        match cook_string(text) {
            Ok(cooked) => Ok(self.arena.intern(&cooked)),
            Err(err) => Err(ParseError::new(
                ErrorCode::E0005,
                format!("invalid escape sequence `\\{}`", err.escape),
                span,
            )),
        }
    }

    fn invalid_number(&self, span: Span) -> ParseError {
        let text = span.text(self.cursor.source()).unwrap_or("");
        ParseError::new(
            ErrorCode::E1010,
            format!("invalid number literal `{text}`"),
            span,
        )
        .with_label("not a representable number")
    }

    fn unexpected_char(&self, span: Span) -> ParseError {
        let text = span.text(self.cursor.source()).unwrap_or("");
        ParseError::new(
            ErrorCode::E1009,
            format!("invalid character `{text}`"),
            span,
        )
    }
}
