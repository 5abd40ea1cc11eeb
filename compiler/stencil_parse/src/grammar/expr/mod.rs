//! Expression parsing.
//!
//! Binary operators use one function per precedence level, lowest first:
//!
//! | level | operators |
//! |---|---|
//! | pipe | `\|` |
//! | or | `\|\|` `or` |
//! | and | `&&` `and` |
//! | comparison | `==` `!=` `<` `<=` `>` `>=` `contains` |
//! | range | `..` `..<` (non-associative) |
//! | additive | `+` `-` |
//! | multiplicative | `*` `/` `//` `%` |
//! | unary | `-` `+` `!` `not` |

mod primary;

use smallvec::SmallVec;
use stencil_ir::{BinaryOp, CallStyle, ExprId, ExprKind, TokenKind, UnaryOp};
use stencil_stack::ensure_sufficient_stack;

use crate::{ErrorContext, ParseError, Parser};

fn or_op(kind: TokenKind) -> Option<BinaryOp> {
    matches!(kind, TokenKind::PipePipe | TokenKind::Or).then_some(BinaryOp::Or)
}

fn and_op(kind: TokenKind) -> Option<BinaryOp> {
    matches!(kind, TokenKind::AmpAmp | TokenKind::And).then_some(BinaryOp::And)
}

fn comparison_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::EqEq => Some(BinaryOp::Eq),
        TokenKind::NotEq => Some(BinaryOp::NotEq),
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::LtEq => Some(BinaryOp::LtEq),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::GtEq => Some(BinaryOp::GtEq),
        TokenKind::Contains => Some(BinaryOp::Contains),
        _ => None,
    }
}

fn additive_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        _ => None,
    }
}

fn multiplicative_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::SlashSlash => Some(BinaryOp::FloorDiv),
        TokenKind::Percent => Some(BinaryOp::Mod),
        _ => None,
    }
}

fn unary_op(kind: TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Minus => Some(UnaryOp::Neg),
        TokenKind::Plus => Some(UnaryOp::Plus),
        TokenKind::Bang | TokenKind::Not => Some(UnaryOp::Not),
        _ => None,
    }
}

impl Parser<'_> {
    /// Parse a full expression, pipes included.
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_pipe())
    }

    fn parse_pipe(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_or()?;
        while self.cursor.eat(TokenKind::Pipe) {
            left = self
                .parse_pipe_call(left)
                .map_err(|e| e.with_context(ErrorContext::Pipe))?;
        }
        Ok(left)
    }

    /// Right-hand side of `|`; the piped value becomes the first argument.
    ///
    /// Native: `value | callee arg arg`, where an adjacent `(...)` after the
    /// callee also supplies arguments. Liquid: `value | name: arg, arg`.
    fn parse_pipe_call(&mut self, piped: ExprId) -> Result<ExprId, ParseError> {
        let start = self.expr_span(piped);
        let mut args: SmallVec<[ExprId; 4]> = SmallVec::new();
        args.push(piped);

        let callee = if self.native_rules() {
            let callee = self.parse_pipe_callee()?;
            if self.cursor.check(TokenKind::LParen) && !self.cursor.current().has_space_before() {
                self.parse_call_args(&mut args)?;
            }
            while self.starts_pipe_arg() {
                args.push(self.parse_or()?);
            }
            callee
        } else {
            let callee = self.parse_filter_name()?;
            if self.cursor.eat(TokenKind::Colon) {
                loop {
                    args.push(self.parse_or()?);
                    if !self.cursor.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            callee
        };

        let args = self.arena.alloc_expr_list(args);
        let span = self.span_from(start);
        Ok(self.alloc_expr(
            ExprKind::Call {
                callee,
                args,
                style: CallStyle::Pipe,
            },
            span,
        ))
    }

    /// Whether the current token can begin a space-separated pipe argument.
    /// `name:` is a named parameter of the enclosing statement, not an argument.
    fn starts_pipe_arg(&self) -> bool {
        match self.cursor.current_kind() {
            TokenKind::Ident => self.cursor.peek_kind(1) != TokenKind::Colon,
            TokenKind::For => self.cursor.peek_kind(1) == TokenKind::Dot,
            TokenKind::Int
            | TokenKind::Float
            | TokenKind::String
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
            | TokenKind::Minus
            | TokenKind::Plus
            | TokenKind::Bang
            | TokenKind::Not
            | TokenKind::Fn => true,
            _ => false,
        }
    }

    pub(crate) fn parse_or(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_and()?;
        while let Some(op) = or_op(self.cursor.current_kind()) {
            self.cursor.advance();
            let right = self.parse_and()?;
            left = self.alloc_binary(op, left, right);
        }
        Ok(left)
    }

    pub(crate) fn parse_and(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_comparison()?;
        while let Some(op) = and_op(self.cursor.current_kind()) {
            self.cursor.advance();
            let right = self.parse_comparison()?;
            left = self.alloc_binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_range()?;
        while let Some(op) = comparison_op(self.cursor.current_kind()) {
            self.cursor.advance();
            let right = self.parse_range()?;
            left = self.alloc_binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_range(&mut self) -> Result<ExprId, ParseError> {
        let start = self.parse_additive()?;
        let inclusive = match self.cursor.current_kind() {
            TokenKind::DotDot => true,
            TokenKind::DotDotLt => false,
            _ => return Ok(start),
        };
        self.cursor.advance();
        let end = self.parse_additive()?;
        let span = self.expr_span(start).merge(self.expr_span(end));
        Ok(self.alloc_expr(
            ExprKind::Range {
                start,
                end,
                inclusive,
            },
            span,
        ))
    }

    fn parse_additive(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_multiplicative()?;
        while let Some(op) = additive_op(self.cursor.current_kind()) {
            self.cursor.advance();
            let right = self.parse_multiplicative()?;
            left = self.alloc_binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_unary()?;
        while let Some(op) = multiplicative_op(self.cursor.current_kind()) {
            self.cursor.advance();
            let right = self.parse_unary()?;
            left = self.alloc_binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        let Some(op) = unary_op(self.cursor.current_kind()) else {
            return self.parse_postfix();
        };
        let start = self.cursor.advance().span;
        let operand = ensure_sufficient_stack(|| self.parse_unary())?;
        let span = start.merge(self.expr_span(operand));
        Ok(self.alloc_expr(ExprKind::Unary { op, operand }, span))
    }

    fn alloc_binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        let span = self.expr_span(left).merge(self.expr_span(right));
        self.alloc_expr(ExprKind::Binary { op, left, right }, span)
    }
}
