//! Statements: the native statement grammar and the block constructs both
//! dialects share.

use smallvec::SmallVec;
use stencil_diagnostic::ErrorCode;
use stencil_ir::{
    ElseBranch, ExprId, ExprKind, ExprRange, ForLoop, NameRange, Span, StmtId, StmtKind,
    StmtRange, TokenKind, UnaryOp, WhenClause,
};
use stencil_stack::ensure_sufficient_stack;

use super::BlockWord;
use crate::recovery::{synchronize, CODE_EXIT, STMT_END, STMT_RECOVERY};
use crate::{ErrorContext, ParseError, Parser};

impl Parser<'_> {
    /// One item of native code: a separator or a full statement.
    pub(crate) fn parse_native_item(&mut self, items: &mut Vec<StmtId>) {
        if matches!(
            self.cursor.current_kind(),
            TokenKind::CodeEnter
                | TokenKind::CodeExit
                | TokenKind::TagEnter
                | TokenKind::TagExit
                | TokenKind::Newline
                | TokenKind::Semicolon
        ) {
            self.cursor.advance();
            return;
        }

        let start = self.cursor.current_span();
        match self.parse_statement() {
            Ok(id) => {
                items.push(id);
                self.expect_statement_end();
            }
            Err(err) => {
                self.report(err);
                synchronize(&mut self.cursor, STMT_RECOVERY);
                items.push(self.error_stmt(start));
            }
        }
    }

    fn parse_statement(&mut self) -> Result<StmtId, ParseError> {
        let start = self.cursor.current_span();
        match self.cursor.current_kind() {
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
            TokenKind::Break => {
                self.cursor.advance();
                Ok(self.alloc_stmt(StmtKind::Break, start))
            }
            TokenKind::Continue => {
                self.cursor.advance();
                Ok(self.alloc_stmt(StmtKind::Continue, start))
            }
            TokenKind::Ret => {
                self.cursor.advance();
                self.parse_ret(start)
            }
            TokenKind::Import => {
                self.cursor.advance();
                let source = self.parse_expr()?;
                Ok(self.alloc_stmt(StmtKind::Import(source), self.span_from(start)))
            }
            TokenKind::Include => {
                self.cursor.advance();
                let name = self.parse_expr()?;
                Ok(self.alloc_stmt(StmtKind::Include(name), self.span_from(start)))
            }
            _ => self.parse_expr_statement(),
        }
    }

    /// `expr` or `target = expr`.
    fn parse_expr_statement(&mut self) -> Result<StmtId, ParseError> {
        let start = self.cursor.current_span();
        let expr = self.parse_expr()?;
        if !self.cursor.check(TokenKind::Eq) {
            return Ok(self.alloc_stmt(StmtKind::Output(expr), self.span_from(start)));
        }
        self.check_assign_target(expr)?;
        self.cursor.advance();
        let value = self
            .parse_expr()
            .map_err(|e| e.with_context(ErrorContext::Assignment))?;
        Ok(self.alloc_stmt(
            StmtKind::Assign {
                target: expr,
                value,
            },
            self.span_from(start),
        ))
    }

    pub(crate) fn check_assign_target(&self, target: ExprId) -> Result<(), ParseError> {
        let expr = self.arena.expr(target);
        match expr.kind {
            ExprKind::Ident(_) | ExprKind::Member { .. } | ExprKind::Index { .. } => Ok(()),
            _ => Err(ParseError::new(
                ErrorCode::E1006,
                "invalid assignment target",
                expr.span,
            )
            .with_label("only variables, members and indexes can be assigned")),
        }
    }

    pub(crate) fn parse_ret(&mut self, start: Span) -> Result<StmtId, ParseError> {
        let at_end = STMT_END.contains(self.cursor.current_kind())
            || self.block_word().is_some()
            || (!self.native_rules() && self.cursor.check(TokenKind::TagExit));
        let value = if at_end { None } else { Some(self.parse_expr()?) };
        Ok(self.alloc_stmt(StmtKind::Return(value), self.span_from(start)))
    }

    /// `if`/`unless` with its `else if`/`elsif` chain, `else` and `end`.
    /// The keyword has been consumed.
    pub(crate) fn parse_if(&mut self, start: Span, keyword: &'static str, negate: bool) -> StmtId {
        let (cond, then_block, else_branch) = self.parse_if_parts(negate);
        self.expect_block_end(keyword, start);
        self.alloc_stmt(
            StmtKind::If {
                cond,
                then_block,
                else_branch,
            },
            self.span_from(start),
        )
    }

    fn parse_if_parts(&mut self, negate: bool) -> (ExprId, StmtRange, ElseBranch) {
        let mut cond = self.parse_header_expr(ErrorContext::IfBlock);
        if negate {
            let span = self.expr_span(cond);
            cond = self.alloc_expr(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: cond,
                },
                span,
            );
        }
        self.finish_header();
        let then_block = self.parse_block();

        let else_branch = match self.block_word() {
            Some(BlockWord::ElseIf) => {
                let start = self.cursor.current_span();
                self.eat_block_word(BlockWord::ElseIf);
                let (cond, then_block, else_branch) =
                    ensure_sufficient_stack(|| self.parse_if_parts(false));
                let nested = self.alloc_stmt(
                    StmtKind::If {
                        cond,
                        then_block,
                        else_branch,
                    },
                    self.span_from(start),
                );
                ElseBranch::ElseIf(nested)
            }
            Some(BlockWord::Else) => {
                self.eat_block_word(BlockWord::Else);
                self.finish_header();
                ElseBranch::Block(self.parse_block())
            }
            _ => ElseBranch::None,
        };
        (cond, then_block, else_branch)
    }

    /// `for x in items limit: n offset: n reversed ... else ... end`.
    pub(crate) fn parse_for(&mut self, start: Span) -> Result<StmtId, ParseError> {
        let var = self
            .expect_name("loop variable")
            .map_err(|e| e.with_context(ErrorContext::ForLoop))?;
        self.cursor
            .expect(TokenKind::In)
            .map_err(|e| e.with_context(ErrorContext::ForLoop))?;
        let iterable = self.parse_header_expr(ErrorContext::ForLoop);

        let mut limit = None;
        let mut offset = None;
        let mut reversed = false;
        loop {
            if self.cursor.check_word("reversed") {
                self.cursor.advance();
                reversed = true;
                continue;
            }
            let named = self.cursor.check_word("limit") || self.cursor.check_word("offset");
            if named && self.cursor.peek_kind(1) == TokenKind::Colon {
                let is_limit = self.cursor.current_text() == "limit";
                self.cursor.advance();
                self.cursor.advance();
                let value = self
                    .parse_or()
                    .map_err(|e| e.with_context(ErrorContext::ForLoop))?;
                if is_limit {
                    limit = Some(value);
                } else {
                    offset = Some(value);
                }
                continue;
            }
            break;
        }

        self.finish_header();
        let body = self.parse_block();
        let else_block = self.parse_else_block();
        self.expect_block_end("for", start);
        Ok(self.alloc_stmt(
            StmtKind::For(ForLoop {
                var,
                iterable,
                limit,
                offset,
                reversed,
                body,
                else_block,
            }),
            self.span_from(start),
        ))
    }

    fn parse_else_block(&mut self) -> Option<StmtRange> {
        if self.block_word() != Some(BlockWord::Else) {
            return None;
        }
        self.eat_block_word(BlockWord::Else);
        self.finish_header();
        Some(self.parse_block())
    }

    pub(crate) fn parse_while(&mut self, start: Span) -> StmtId {
        let cond = self.parse_header_expr(ErrorContext::WhileLoop);
        self.finish_header();
        let body = self.parse_block();
        self.expect_block_end("while", start);
        self.alloc_stmt(StmtKind::While { cond, body }, self.span_from(start))
    }

    pub(crate) fn parse_with(&mut self, start: Span) -> StmtId {
        let target = self.parse_header_expr(ErrorContext::WithBlock);
        self.finish_header();
        let body = self.parse_block();
        self.expect_block_end("with", start);
        self.alloc_stmt(StmtKind::With { target, body }, self.span_from(start))
    }

    /// `case subject` followed by `when` clauses, an optional `else` and the end.
    pub(crate) fn parse_case(&mut self, start: Span) -> StmtId {
        let subject = self.parse_header_expr(ErrorContext::CaseBlock);
        self.finish_header();
        self.skip_case_filler();

        if self.block_word().is_none() && !self.cursor.is_at_end() {
            let err = self
                .unexpected("`when`")
                .with_context(ErrorContext::CaseBlock);
            self.report(err);
            let _ignored = self.parse_block();
        }

        let mut whens = Vec::new();
        while self.block_word() == Some(BlockWord::When) {
            let when_start = self.cursor.current_span();
            self.eat_block_word(BlockWord::When);
            let values = self.parse_when_values();
            self.finish_header();
            let body = self.parse_block();
            whens.push(WhenClause {
                values,
                body,
                span: self.span_from(when_start),
            });
        }
        let whens = self.arena.alloc_whens(whens);
        let else_block = self.parse_else_block();
        self.expect_block_end("case", start);
        self.alloc_stmt(
            StmtKind::Case {
                subject,
                whens,
                else_block,
            },
            self.span_from(start),
        )
    }

    /// Whitespace text and separators between `case` and its first `when`.
    fn skip_case_filler(&mut self) {
        loop {
            let token = self.cursor.current();
            let skip = match token.kind {
                TokenKind::Text => self.cursor.text(&token).trim().is_empty(),
                TokenKind::Comment => true,
                TokenKind::CodeEnter
                | TokenKind::CodeExit
                | TokenKind::Newline
                | TokenKind::Semicolon => self.native_rules(),
                _ => false,
            };
            if !skip {
                return;
            }
            self.cursor.advance();
        }
    }

    /// `when a, b` (also `a or b`): each value is matched on its own, so
    /// values are parsed below the `or` level.
    fn parse_when_values(&mut self) -> ExprRange {
        let mut values: SmallVec<[ExprId; 4]> = SmallVec::new();
        loop {
            let start = self.cursor.current_span();
            match self.parse_and() {
                Ok(value) => values.push(value),
                Err(err) => {
                    self.report(err.with_context(ErrorContext::CaseBlock));
                    let recovery = if self.native_rules() { STMT_RECOVERY } else { CODE_EXIT };
                    synchronize(&mut self.cursor, recovery);
                    let span = self.span_from(start);
                    values.push(self.alloc_expr(ExprKind::Error, span));
                    break;
                }
            }
            let separated = self.cursor.eat(TokenKind::Comma)
                || self.cursor.eat(TokenKind::Or)
                || self.cursor.eat(TokenKind::PipePipe);
            if !separated {
                break;
            }
        }
        self.arena.alloc_expr_list(values)
    }

    /// `capture target ... end`.
    pub(crate) fn parse_capture(&mut self, start: Span) -> Result<StmtId, ParseError> {
        let target = self
            .parse_postfix()
            .map_err(|e| e.with_context(ErrorContext::Capture))?;
        self.check_assign_target(target)?;
        self.finish_header();
        let body = self.parse_block();
        self.expect_block_end("capture", start);
        Ok(self.alloc_stmt(StmtKind::Capture { target, body }, self.span_from(start)))
    }

    /// `func name(params) ... end`. The parameter list is optional.
    pub(crate) fn parse_func(&mut self, start: Span) -> Result<StmtId, ParseError> {
        let name = self
            .expect_name("function name")
            .map_err(|e| e.with_context(ErrorContext::FunctionDef))?;
        let params = if self.cursor.check(TokenKind::LParen) {
            self.parse_params()
                .map_err(|e| e.with_context(ErrorContext::FunctionDef))?
        } else {
            NameRange::EMPTY
        };
        self.finish_header();
        let body = self.parse_block();
        self.expect_block_end("func", start);
        Ok(self.alloc_stmt(StmtKind::FuncDef { name, params, body }, self.span_from(start)))
    }
}
