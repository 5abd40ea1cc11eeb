//! Expression rendering.
//!
//! Each node has a binding level. An operand whose level is below what its
//! position requires is wrapped in parentheses, so the re-parsed tree has
//! the same shape as the original.

use stencil_ir::{CallStyle, ExprId, ExprKind, Name, UnaryOp};
use stencil_stack::ensure_sufficient_stack;

use super::TemplateFormatter;
use crate::emitter::Emitter;
use crate::text::{is_identifier, quote_string};

/// Binding levels, loosest first.
pub(super) mod prec {
    use stencil_ir::{BinaryOp, RANGE_PRECEDENCE, UNARY_PRECEDENCE};

    /// `fn(x) => body` extends as far right as possible.
    pub const LAMBDA: u8 = 0;
    pub const PIPE: u8 = 1;
    pub const OR: u8 = binary(BinaryOp::Or);
    pub const AND: u8 = binary(BinaryOp::And);
    pub const RANGE: u8 = RANGE_PRECEDENCE + 1;
    pub const ADDITIVE: u8 = binary(BinaryOp::Add);
    pub const UNARY: u8 = UNARY_PRECEDENCE + 1;
    pub const POSTFIX: u8 = UNARY + 1;
    pub const ATOM: u8 = POSTFIX + 1;

    pub const fn binary(op: BinaryOp) -> u8 {
        op.precedence() + 1
    }
}

impl<E: Emitter> TemplateFormatter<'_, E> {
    /// Write an expression in any position.
    pub fn expr(&mut self, id: ExprId) {
        self.expr_at(id, prec::LAMBDA);
    }

    pub(super) fn expr_at(&mut self, id: ExprId, min: u8) {
        ensure_sufficient_stack(|| {
            if self.level(id) < min {
                self.emitter.emit("(");
                self.write_expr(id);
                self.emitter.emit(")");
            } else {
                self.write_expr(id);
            }
        });
    }

    fn level(&self, id: ExprId) -> u8 {
        match self.arena.expr(id).kind {
            ExprKind::Int(v) if v < 0 => prec::UNARY,
            ExprKind::BigInt(v) if v < 0 => prec::UNARY,
            ExprKind::Float(bits) if f64::from_bits(bits).is_sign_negative() => prec::UNARY,
            ExprKind::Null
            | ExprKind::Bool(_)
            | ExprKind::Int(_)
            | ExprKind::BigInt(_)
            | ExprKind::Float(_)
            | ExprKind::String(_)
            | ExprKind::Ident(_)
            | ExprKind::Array(_)
            | ExprKind::Object(_)
            | ExprKind::Error => prec::ATOM,
            ExprKind::Member { .. } | ExprKind::Index { .. } => prec::POSTFIX,
            ExprKind::Call {
                callee,
                args,
                style: CallStyle::Pipe,
            } if !args.is_empty() && (self.native() || self.is_filter_name(callee)) => {
                prec::PIPE
            }
            ExprKind::Call { .. } => prec::POSTFIX,
            ExprKind::Unary { .. } => prec::UNARY,
            ExprKind::Binary { op, .. } => prec::binary(op),
            ExprKind::Range { .. } => prec::RANGE,
            ExprKind::Lambda { .. } => prec::LAMBDA,
        }
    }

    fn write_expr(&mut self, id: ExprId) {
        let arena = self.arena;
        match arena.expr(id).kind {
            ExprKind::Null | ExprKind::Error => {
                let null = if self.native() { "null" } else { "nil" };
                self.emitter.emit(null);
            }
            ExprKind::Bool(value) => self.emitter.emit(if value { "true" } else { "false" }),
            ExprKind::Int(value) => self.emitter.emit(&value.to_string()),
            ExprKind::BigInt(value) => self.emitter.emit(&value.to_string()),
            // Non-finite floats never come out of the parser.
            ExprKind::Float(bits) => self.emitter.emit(&format!("{:?}", f64::from_bits(bits))),
            ExprKind::String(value) => self.emitter.emit(&quote_string(arena.name(value))),
            ExprKind::Ident(name) => self.emitter.emit(arena.name(name)),
            ExprKind::Member { receiver, name } => {
                self.expr_at(receiver, prec::POSTFIX);
                self.member_name(name);
            }
            ExprKind::Index { receiver, index } => {
                self.expr_at(receiver, prec::POSTFIX);
                self.emitter.emit("[");
                self.expr(index);
                self.emitter.emit("]");
            }
            ExprKind::Call {
                callee,
                args,
                style: CallStyle::Paren,
            } => self.paren_call(callee, arena.expr_list(args)),
            ExprKind::Call {
                callee,
                args,
                style: CallStyle::Pipe,
            } => self.pipe_call(callee, arena.expr_list(args)),
            ExprKind::Unary { op, operand } => {
                let symbol = match op {
                    UnaryOp::Not if !self.native() => "not ",
                    op => op.as_symbol(),
                };
                self.emitter.emit(symbol);
                self.expr_at(operand, prec::POSTFIX);
            }
            ExprKind::Binary { op, left, right } => {
                let level = prec::binary(op);
                let symbol = if self.native() {
                    op.as_symbol()
                } else {
                    op.as_liquid_symbol()
                };
                self.expr_at(left, level);
                self.emitter.emit_space();
                self.emitter.emit(symbol);
                self.emitter.emit_space();
                self.expr_at(right, level + 1);
            }
            ExprKind::Range {
                start,
                end,
                inclusive,
            } => {
                self.expr_at(start, prec::ADDITIVE);
                self.emitter.emit(if inclusive { ".." } else { "..<" });
                self.expr_at(end, prec::ADDITIVE);
            }
            ExprKind::Array(items) => {
                self.emitter.emit("[");
                self.expr_list(arena.expr_list(items), prec::LAMBDA);
                self.emitter.emit("]");
            }
            ExprKind::Object(entries) => {
                self.emitter.emit("{");
                for (i, entry) in arena.entries(entries).iter().enumerate() {
                    if i > 0 {
                        self.emitter.emit(", ");
                    }
                    let key = arena.name(entry.key);
                    if is_identifier(key) {
                        self.emitter.emit(key);
                    } else {
                        self.emitter.emit(&quote_string(key));
                    }
                    self.emitter.emit(": ");
                    self.expr(entry.value);
                }
                self.emitter.emit("}");
            }
            ExprKind::Lambda { params, body } => {
                self.emitter.emit("fn");
                self.params(arena.name_list(params));
                self.emitter.emit(" => ");
                self.expr(body);
            }
        }
    }

    /// `.name`, or `["name"]` when the name is not an identifier.
    fn member_name(&mut self, name: Name) {
        let text = self.arena.name(name);
        if is_identifier(text) {
            self.emitter.emit(".");
            self.emitter.emit(text);
        } else {
            self.emitter.emit("[");
            self.emitter.emit(&quote_string(text));
            self.emitter.emit("]");
        }
    }

    fn expr_list(&mut self, items: &[ExprId], min: u8) {
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                self.emitter.emit(", ");
            }
            self.expr_at(item, min);
        }
    }

    pub(super) fn params(&mut self, params: &[Name]) {
        self.emitter.emit("(");
        for (i, &param) in params.iter().enumerate() {
            if i > 0 {
                self.emitter.emit(", ");
            }
            let name = self.arena.name(param);
            self.emitter.emit(name);
        }
        self.emitter.emit(")");
    }

    fn paren_call(&mut self, callee: ExprId, args: &[ExprId]) {
        self.expr_at(callee, prec::POSTFIX);
        self.emitter.emit("(");
        self.expr_list(args, prec::LAMBDA);
        self.emitter.emit(")");
    }

    /// `value | f a b` (native) or `value | f: a, b` (Liquid). A Liquid
    /// filter must be a dotted name; other callees fall back to a call.
    fn pipe_call(&mut self, callee: ExprId, args: &[ExprId]) {
        let Some((&piped, rest)) = args.split_first() else {
            self.paren_call(callee, args);
            return;
        };
        if self.native() {
            self.expr_at(piped, prec::PIPE);
            self.emitter.emit(" | ");
            if self.is_pipe_callee(callee) {
                self.write_expr(callee);
            } else {
                self.emitter.emit("(");
                self.expr(callee);
                self.emitter.emit(")");
            }
            for &arg in rest {
                self.emitter.emit_space();
                self.expr_at(arg, prec::POSTFIX);
            }
        } else if self.is_filter_name(callee) {
            self.expr_at(piped, prec::PIPE);
            self.emitter.emit(" | ");
            self.write_expr(callee);
            if !rest.is_empty() {
                self.emitter.emit(": ");
                self.expr_list(rest, prec::OR);
            }
        } else {
            self.paren_call(callee, args);
        }
    }

    /// Native pipe callees are names with member and index suffixes; a call
    /// inside would swallow the arguments.
    fn is_pipe_callee(&self, mut id: ExprId) -> bool {
        loop {
            match self.arena.expr(id).kind {
                ExprKind::Ident(_) => return true,
                ExprKind::Member { receiver, name } if is_identifier(self.arena.name(name)) => {
                    id = receiver;
                }
                ExprKind::Index { receiver, .. } => id = receiver,
                _ => return false,
            }
        }
    }

    /// Liquid filter names: `name` or `a.b.c`.
    fn is_filter_name(&self, mut id: ExprId) -> bool {
        loop {
            match self.arena.expr(id).kind {
                ExprKind::Ident(_) => return true,
                ExprKind::Member { receiver, name } if is_identifier(self.arena.name(name)) => {
                    id = receiver;
                }
                _ => return false,
            }
        }
    }
}
