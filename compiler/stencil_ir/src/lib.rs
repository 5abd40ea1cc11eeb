//! Stencil IR: the data shared by every stage of the template pipeline.
//!
//! - Spans for source locations
//! - Tokens and `TokenList` for lexer output
//! - Interned names
//! - The flat template AST
//!
//! Floats in the AST are stored as `u64` bits and strings as interned
//! [`Name`]s so every node is `Eq + Hash`.

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod ast;
mod dialect;
mod name;
mod span;
mod token;

pub use ast::{
    BinaryOp, CallStyle, ElseBranch, EntryRange, Expr, ExprId, ExprKind, ExprRange, ForLoop,
    NameRange, ObjectEntry, Stmt, StmtId, StmtKind, StmtRange, Template, TemplateArena, UnaryOp,
    WhenClause, WhenRange, RANGE_PRECEDENCE, UNARY_PRECEDENCE,
};
pub use dialect::{Dialect, ScriptMode};
pub use name::{Name, NameTable};
pub use span::Span;
pub use token::{Token, TokenFlags, TokenKind, TokenList};

static_assert_size!(Span, 8);
static_assert_size!(ExprId, 4);
