//! Runtime errors.
//!
//! The first runtime error aborts the render. Each [`EvalErrorKind`] maps to
//! one `E6xxx` code; constructors for the common cases live here so error
//! wording stays in one place.

use stencil_diagnostic::{Diagnostic, ErrorCode};
use stencil_ir::Span;

use crate::registry::AccessError;

pub type EvalResult<T = crate::Value> = Result<T, EvalError>;

#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum EvalErrorKind {
    #[error("undefined variable `{name}`")]
    UndefinedVariable { name: String },
    #[error(transparent)]
    Access(AccessError),
    #[error("host type `{type_name}` does not support {operation}")]
    HostIntegration {
        type_name: &'static str,
        operation: &'static str,
    },
    #[error("operator `{op}` is not defined for {left} and {right}")]
    InvalidOperands {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    #[error("operator `{op}` is not defined for {operand}")]
    InvalidOperand {
        op: &'static str,
        operand: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("`{callee}` is not a function (found {type_name})")]
    NotCallable {
        callee: String,
        type_name: &'static str,
    },
    #[error("`{name}` expects {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },
    #[error("loop exceeded the limit of {limit} iterations")]
    LoopLimit { limit: usize },
    #[error("call depth exceeded the limit of {limit}")]
    CallDepth { limit: usize },
    #[error("cannot include `{name}`: {message}")]
    Include { name: String, message: String },
    #[error("{message}")]
    InvalidAssignment { message: String },
    #[error("`{name}`: {message}")]
    Builtin { name: &'static str, message: String },
    #[error("template contains syntax errors and cannot be rendered")]
    InvalidTemplate,
    #[error("cannot iterate over {type_name}")]
    NotIterable { type_name: &'static str },
}

impl EvalErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            EvalErrorKind::UndefinedVariable { .. } => ErrorCode::E6001,
            EvalErrorKind::Access(error) => error.code(),
            EvalErrorKind::HostIntegration { .. } => ErrorCode::E6012,
            EvalErrorKind::InvalidOperands { .. } | EvalErrorKind::InvalidOperand { .. } => {
                ErrorCode::E6004
            }
            EvalErrorKind::DivisionByZero => ErrorCode::E6005,
            EvalErrorKind::NotCallable { .. } => ErrorCode::E6006,
            EvalErrorKind::Arity { .. } => ErrorCode::E6007,
            EvalErrorKind::LoopLimit { .. } => ErrorCode::E6008,
            EvalErrorKind::CallDepth { .. } => ErrorCode::E6009,
            EvalErrorKind::Include { .. } => ErrorCode::E6010,
            EvalErrorKind::InvalidAssignment { .. } => ErrorCode::E6013,
            EvalErrorKind::Builtin { .. } => ErrorCode::E6014,
            EvalErrorKind::InvalidTemplate => ErrorCode::E6015,
            EvalErrorKind::NotIterable { .. } => ErrorCode::E6016,
        }
    }
}

impl From<AccessError> for EvalErrorKind {
    fn from(error: AccessError) -> Self {
        match error {
            AccessError::HostIntegration {
                type_name,
                operation,
            } => EvalErrorKind::HostIntegration {
                type_name,
                operation,
            },
            other => EvalErrorKind::Access(other),
        }
    }
}

/// A runtime error with the span of the construct that raised it.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub span: Option<Span>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError { kind, span: None }
    }

    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach `span` unless a more precise one is already set.
    #[must_use]
    pub fn or_at(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.code()).with_message(self.kind.to_string());
        match self.span {
            Some(span) => diagnostic.with_label(span, "raised here"),
            None => diagnostic,
        }
    }
}

impl From<AccessError> for EvalError {
    fn from(error: AccessError) -> Self {
        EvalError::new(error.into())
    }
}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::new(kind)
    }
}

#[cold]
pub fn undefined_variable(name: &str, span: Span) -> EvalError {
    EvalError::new(EvalErrorKind::UndefinedVariable {
        name: name.to_owned(),
    })
    .at(span)
}

#[cold]
pub fn invalid_operands(op: &'static str, left: &crate::Value, right: &crate::Value) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidOperands {
        op,
        left: left.type_name(),
        right: right.type_name(),
    })
}

#[cold]
pub fn invalid_operand(op: &'static str, operand: &crate::Value) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidOperand {
        op,
        operand: operand.type_name(),
    })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::new(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn not_callable(callee: impl Into<String>, value: &crate::Value) -> EvalError {
    EvalError::new(EvalErrorKind::NotCallable {
        callee: callee.into(),
        type_name: value.type_name(),
    })
}

#[cold]
pub fn wrong_arg_count(name: &str, min: usize, max: usize, got: usize) -> EvalError {
    let expected = if min == max {
        min.to_string()
    } else if max == usize::MAX {
        format!("at least {min}")
    } else {
        format!("{min} to {max}")
    };
    EvalError::new(EvalErrorKind::Arity {
        name: name.to_owned(),
        expected,
        got,
    })
}

#[cold]
pub fn include_failed(name: &str, message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Include {
        name: name.to_owned(),
        message: message.into(),
    })
}

#[cold]
pub fn invalid_assignment(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::InvalidAssignment {
        message: message.into(),
    })
}

#[cold]
pub fn builtin_error(name: &'static str, message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Builtin {
        name,
        message: message.into(),
    })
}

#[cold]
pub fn not_iterable(value: &crate::Value) -> EvalError {
    EvalError::new(EvalErrorKind::NotIterable {
        type_name: value.type_name(),
    })
}
