//! Expression nodes.

use crate::{Name, Span};

use super::{BinaryOp, EntryRange, ExprId, ExprRange, NameRange, UnaryOp};

/// How a call was written, so re-emission can keep its shape.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CallStyle {
    /// `f(a, b)`
    Paren,
    /// `a | f b` (native) or `a | f: b` (Liquid); the piped value is the first argument.
    Pipe,
}

/// Expression node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// Expression variants.
///
/// Floats are stored as bits so the whole tree stays `Eq + Hash`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    Null,
    Bool(bool),
    Int(i64),
    /// Integer literal too large for `i64`.
    BigInt(i128),
    /// `f64` bits.
    Float(u64),
    String(Name),
    Ident(Name),

    /// `receiver.name`
    Member {
        receiver: ExprId,
        name: Name,
    },
    /// `receiver[index]`
    Index {
        receiver: ExprId,
        index: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    /// For pipe calls `args[0]` is the piped value.
    Call {
        callee: ExprId,
        args: ExprRange,
        style: CallStyle,
    },
    /// `start..end` or `start..<end`
    Range {
        start: ExprId,
        end: ExprId,
        inclusive: bool,
    },
    Array(ExprRange),
    Object(EntryRange),
    /// `fn(a, b) => body`
    Lambda {
        params: NameRange,
        body: ExprId,
    },

    /// Placeholder for an expression that failed to parse.
    Error,
}

impl ExprKind {
    /// Literal and identifier leaves.
    pub fn is_atom(&self) -> bool {
        matches!(
            self,
            ExprKind::Null
                | ExprKind::Bool(_)
                | ExprKind::Int(_)
                | ExprKind::BigInt(_)
                | ExprKind::Float(_)
                | ExprKind::String(_)
                | ExprKind::Ident(_)
                | ExprKind::Error
        )
    }
}

/// `key: value` in an object literal.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ObjectEntry {
    pub key: Name,
    pub value: ExprId,
    pub span: Span,
}
