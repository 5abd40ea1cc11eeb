//! Template syntax tree.
//!
//! Nodes are stored flat in a [`TemplateArena`] and refer to each other by
//! [`ExprId`]/[`StmtId`]. Child lists (call arguments, block bodies,
//! parameters) are ranges into the arena's shared list storage.

mod arena;
mod expr;
mod ids;
mod operators;
mod stmt;
mod template;

pub use arena::TemplateArena;
pub use expr::{CallStyle, Expr, ExprKind, ObjectEntry};
pub use ids::{EntryRange, ExprId, ExprRange, NameRange, StmtId, StmtRange, WhenRange};
pub use operators::{BinaryOp, UnaryOp, RANGE_PRECEDENCE, UNARY_PRECEDENCE};
pub use stmt::{ElseBranch, ForLoop, Stmt, StmtKind, WhenClause};
pub use template::Template;

#[cfg(test)]
mod tests;
