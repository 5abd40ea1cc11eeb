//! Statement nodes.

use crate::{Name, Span};

use super::{ExprId, ExprRange, NameRange, StmtId, StmtRange, WhenRange};

/// Statement node.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

/// The branch taken when an `if` condition is falsy.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ElseBranch {
    None,
    /// `else if` / `elsif`: the nested statement is always an `If`.
    ElseIf(StmtId),
    Block(StmtRange),
}

/// A `for` loop header.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ForLoop {
    pub var: Name,
    pub iterable: ExprId,
    pub limit: Option<ExprId>,
    pub offset: Option<ExprId>,
    pub reversed: bool,
    pub body: StmtRange,
    /// Runs when the iterable yields nothing.
    pub else_block: Option<StmtRange>,
}

/// `when a, b` clause.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct WhenClause {
    pub values: ExprRange,
    pub body: StmtRange,
    pub span: Span,
}

/// Statement variants.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    /// Literal template text, already trimmed.
    Text(Name),
    /// Raw block content, emitted verbatim.
    Raw(Name),
    /// Expression whose value is written to the output.
    Output(ExprId),
    /// `target = value`; target is an identifier, member or index expression.
    Assign {
        target: ExprId,
        value: ExprId,
    },
    If {
        cond: ExprId,
        then_block: StmtRange,
        else_branch: ElseBranch,
    },
    For(ForLoop),
    While {
        cond: ExprId,
        body: StmtRange,
    },
    With {
        target: ExprId,
        body: StmtRange,
    },
    Case {
        subject: ExprId,
        whens: WhenRange,
        else_block: Option<StmtRange>,
    },
    Capture {
        target: ExprId,
        body: StmtRange,
    },
    FuncDef {
        name: Name,
        params: NameRange,
        body: StmtRange,
    },
    Break,
    Continue,
    Return(Option<ExprId>),
    Import(ExprId),
    Include(ExprId),

    /// Placeholder for a statement that failed to parse.
    Error,
}

impl StmtKind {
    /// Statements after which the rest of a block cannot run.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            StmtKind::Break | StmtKind::Continue | StmtKind::Return(_)
        )
    }
}
