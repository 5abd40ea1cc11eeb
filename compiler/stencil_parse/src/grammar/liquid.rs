//! Liquid surface syntax: `{{ expr }}` outputs and `{% tag %}` statements.
//!
//! Besides the standard tags (`if`/`elsif`/`unless`, `for`, `case`/`when`,
//! `assign`, `capture`, `break`, `continue`, `include`, `echo`) the dialect
//! accepts extension tags for constructs Liquid has no spelling for
//! (`while`, `with`, `func`, `ret`, `import`), so every statement can be
//! written in either dialect.

use stencil_diagnostic::ErrorCode;
use stencil_ir::{Span, StmtId, StmtKind, TokenKind};

use crate::{ErrorContext, ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn parse_liquid_item(&mut self, items: &mut Vec<StmtId>) {
        let item = match self.cursor.current_kind() {
            TokenKind::CodeEnter => self.parse_liquid_output(),
            TokenKind::TagEnter => self.parse_liquid_tag(),
            _ => {
                self.cursor.advance();
                None
            }
        };
        items.extend(item);
    }

    /// `{{ expr }}`
    fn parse_liquid_output(&mut self) -> Option<StmtId> {
        self.cursor.advance();
        if self.cursor.eat(TokenKind::CodeExit) {
            return None;
        }
        let start = self.cursor.current_span();
        match self.parse_expr() {
            Ok(expr) => {
                let span = self.span_from(start);
                if !self.cursor.eat(TokenKind::CodeExit) {
                    let err = self
                        .unexpected("`}}`")
                        .with_context(ErrorContext::Output);
                    self.report(err);
                    self.recover_tag();
                }
                Some(self.alloc_stmt(StmtKind::Output(expr), span))
            }
            Err(err) => {
                self.report(err.with_context(ErrorContext::Output));
                self.recover_tag();
                Some(self.error_stmt(start))
            }
        }
    }

    /// `{% tag ... %}`
    fn parse_liquid_tag(&mut self) -> Option<StmtId> {
        let open = self.cursor.advance().span;
        if self.cursor.eat(TokenKind::TagExit) {
            return None;
        }
        match self.parse_tag_body(open) {
            Ok(id) => Some(id),
            Err(err) => {
                self.report(err.with_context(ErrorContext::LiquidTag));
                self.recover_tag();
                Some(self.error_stmt(open))
            }
        }
    }

    fn parse_tag_body(&mut self, start: Span) -> Result<StmtId, ParseError> {
        let tag = self.cursor.current();
        match tag.kind {
            TokenKind::If => {
                self.cursor.advance();
                Ok(self.parse_if(start, "if", false))
            }
            TokenKind::For if self.cursor.peek_kind(1) != TokenKind::Dot => {
                self.cursor.advance();
                self.parse_for(start)
            }
            TokenKind::While => {
                self.cursor.advance();
                Ok(self.parse_while(start))
            }
            TokenKind::With => {
                self.cursor.advance();
                Ok(self.parse_with(start))
            }
            TokenKind::Case => {
                self.cursor.advance();
                Ok(self.parse_case(start))
            }
            TokenKind::Capture => {
                self.cursor.advance();
                self.parse_capture(start)
            }
            TokenKind::Func => {
                self.cursor.advance();
                self.parse_func(start)
            }
            TokenKind::Break | TokenKind::Continue => {
                self.cursor.advance();
                let kind = if tag.kind == TokenKind::Break {
                    StmtKind::Break
                } else {
                    StmtKind::Continue
                };
                let id = self.alloc_stmt(kind, self.span_from(start));
                self.finish_header();
                Ok(id)
            }
            TokenKind::Ret => {
                self.cursor.advance();
                let id = self.parse_ret(start)?;
                self.finish_header();
                Ok(id)
            }
            TokenKind::Import | TokenKind::Include => {
                self.cursor.advance();
                let value = self.parse_expr()?;
                let kind = if tag.kind == TokenKind::Import {
                    StmtKind::Import(value)
                } else {
                    StmtKind::Include(value)
                };
                let id = self.alloc_stmt(kind, self.span_from(start));
                self.finish_header();
                Ok(id)
            }
            TokenKind::Ident => match self.cursor.current_text() {
                "unless" => {
                    self.cursor.advance();
                    Ok(self.parse_if(start, "unless", true))
                }
                "assign" => {
                    self.cursor.advance();
                    self.parse_assign_tag(start)
                }
                "echo" => {
                    self.cursor.advance();
                    let value = self.parse_expr()?;
                    let id = self.alloc_stmt(StmtKind::Output(value), self.span_from(start));
                    self.finish_header();
                    Ok(id)
                }
                name => Err(ParseError::new(
                    ErrorCode::E1008,
                    format!("unknown tag `{name}`"),
                    tag.span,
                )
                .with_label("not a known tag")),
            },
            _ => Err(self.unexpected("tag name")),
        }
    }

    /// `assign target = value`
    fn parse_assign_tag(&mut self, start: Span) -> Result<StmtId, ParseError> {
        let target = self
            .parse_postfix()
            .map_err(|e| e.with_context(ErrorContext::Assignment))?;
        self.check_assign_target(target)?;
        self.cursor
            .expect(TokenKind::Eq)
            .map_err(|e| e.with_context(ErrorContext::Assignment))?;
        let value = self
            .parse_expr()
            .map_err(|e| e.with_context(ErrorContext::Assignment))?;
        let id = self.alloc_stmt(StmtKind::Assign { target, value }, self.span_from(start));
        self.finish_header();
        Ok(id)
    }
}
