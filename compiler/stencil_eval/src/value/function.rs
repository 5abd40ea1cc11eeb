//! Callable values: template functions, lambdas and builtins.

use std::fmt;
use std::sync::Arc;

use stencil_ir::{ExprId, StmtRange, Template};

use super::ScriptObject;
use crate::builtins::Builtin;

/// A function defined with `func name(params) ... end`.
pub struct ScriptFunction {
    pub name: Arc<str>,
    pub params: Vec<Arc<str>>,
    pub body: StmtRange,
    /// The template the body lives in; may be an included one.
    pub unit: Arc<Template>,
}

/// An anonymous `fn(params) => expr`.
pub struct Lambda {
    pub params: Vec<Arc<str>>,
    pub body: ExprId,
    pub unit: Arc<Template>,
    /// Local bindings visible where the lambda was created.
    pub captured: ScriptObject,
}

#[derive(Clone)]
pub enum FunctionValue {
    Script(Arc<ScriptFunction>),
    Lambda(Arc<Lambda>),
    Builtin(&'static Builtin),
}

impl FunctionValue {
    pub fn name(&self) -> &str {
        match self {
            FunctionValue::Script(function) => &function.name,
            FunctionValue::Lambda(_) => "<lambda>",
            FunctionValue::Builtin(builtin) => builtin.name,
        }
    }

    pub fn ptr_eq(&self, other: &FunctionValue) -> bool {
        match (self, other) {
            (FunctionValue::Script(a), FunctionValue::Script(b)) => Arc::ptr_eq(a, b),
            (FunctionValue::Lambda(a), FunctionValue::Lambda(b)) => Arc::ptr_eq(a, b),
            (FunctionValue::Builtin(a), FunctionValue::Builtin(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function {}>", self.name())
    }
}
