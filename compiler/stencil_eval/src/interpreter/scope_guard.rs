//! RAII guards for scope and call-frame management.
//!
//! [`ScopedInterpreter`] pops the scope it pushed when dropped;
//! [`FrameGuard`] undoes everything a call or include changed: hidden
//! scopes, call depth and the current unit. Both deref to the interpreter,
//! and both clean up during unwinding as well as on early `?` returns.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use stencil_ir::Template;

use super::Interpreter;
use crate::environment::{HiddenScopes, ScopeKind};
use crate::errors::{EvalError, EvalErrorKind};
use crate::value::{ScriptObject, Value};

/// Guard that pops one environment scope on drop.
pub struct ScopedInterpreter<'guard, 'interp> {
    interpreter: &'guard mut Interpreter<'interp>,
}

impl Drop for ScopedInterpreter<'_, '_> {
    fn drop(&mut self) {
        self.interpreter.env.pop_scope();
    }
}

impl<'interp> Deref for ScopedInterpreter<'_, 'interp> {
    type Target = Interpreter<'interp>;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

/// Guard for a function call or include.
pub struct FrameGuard<'guard, 'interp> {
    interpreter: &'guard mut Interpreter<'interp>,
    hidden: Option<HiddenScopes>,
    caller_unit: Option<Arc<Template>>,
}

impl Drop for FrameGuard<'_, '_> {
    fn drop(&mut self) {
        if let Some(hidden) = self.hidden.take() {
            self.interpreter.env.restore(hidden);
        }
        if let Some(unit) = self.caller_unit.take() {
            self.interpreter.unit = unit;
        }
        self.interpreter.call_depth -= 1;
    }
}

impl<'interp> Deref for FrameGuard<'_, 'interp> {
    type Target = Interpreter<'interp>;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for FrameGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl<'a> Interpreter<'a> {
    /// Push a scope that is popped when the guard drops.
    pub fn scoped(&mut self, kind: ScopeKind, value: Value) -> ScopedInterpreter<'_, 'a> {
        self.env.push_scope(kind, value);
        ScopedInterpreter { interpreter: self }
    }

    /// Run `f` inside a pushed scope.
    pub fn with_env_scope<T>(
        &mut self,
        kind: ScopeKind,
        value: Value,
        f: impl FnOnce(&mut ScopedInterpreter<'_, 'a>) -> T,
    ) -> T {
        let mut scoped = self.scoped(kind, value);
        f(&mut scoped)
    }

    /// Enter a call frame running code from `unit`.
    ///
    /// With `locals`, the caller's loop, `with` and local scopes are hidden
    /// and replaced by `locals` (innermost last). Without, the frame shares
    /// the caller's scopes, as an include does.
    pub fn enter_frame(
        &mut self,
        unit: Arc<Template>,
        locals: Option<Vec<ScriptObject>>,
    ) -> Result<FrameGuard<'_, 'a>, EvalError> {
        let limit = self.options.call_depth_limit;
        if limit != 0 && self.call_depth >= limit {
            tracing::debug!(limit, "call depth limit reached");
            return Err(EvalError::new(EvalErrorKind::CallDepth { limit }));
        }
        self.call_depth += 1;
        let hidden = locals.map(|locals| self.env.enter_call(locals));
        let caller_unit = Some(std::mem::replace(&mut self.unit, unit));
        Ok(FrameGuard {
            interpreter: self,
            hidden,
            caller_unit,
        })
    }
}
