//! Variable scopes for one render.
//!
//! The scope stack grows upward from the data model:
//!
//! | scope | pushed by | holds |
//! |---|---|---|
//! | model | the caller | the value passed to render (optional) |
//! | global | render | top-level assignments |
//! | loop | each `for` | the loop variable, `for` and `forloop` |
//! | with | `with expr` | the target object itself |
//! | local | calls | parameters, lambda captures |
//!
//! Any value with members can be a scope, so host objects work as the model
//! or as `with` targets. Lookups search innermost first. A function call
//! hides the caller's loop, `with` and local scopes for its duration.

use crate::registry::{AccessError, AccessorRegistry};
use crate::value::{ScriptObject, Value};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ScopeKind {
    Model,
    Global,
    Loop,
    With,
    Local,
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub value: Value,
}

/// Scopes hidden by a function call, restored when it returns.
#[must_use = "hidden scopes must be restored with `Environment::restore`"]
pub struct HiddenScopes(Vec<Scope>);

pub struct Environment {
    scopes: Vec<Scope>,
    global: ScriptObject,
    /// Index of the global scope in `scopes`.
    global_index: usize,
}

impl Environment {
    /// A fresh environment over `model`. A `null` model adds no scope.
    pub fn new(model: &Value) -> Self {
        let global = ScriptObject::new();
        let mut scopes = Vec::with_capacity(8);
        if !model.is_null() {
            scopes.push(Scope {
                kind: ScopeKind::Model,
                value: model.clone(),
            });
        }
        let global_index = scopes.len();
        scopes.push(Scope {
            kind: ScopeKind::Global,
            value: Value::Object(global.clone()),
        });
        Environment {
            scopes,
            global,
            global_index,
        }
    }

    pub fn global(&self) -> &ScriptObject {
        &self.global
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn push_scope(&mut self, kind: ScopeKind, value: Value) {
        self.scopes.push(Scope { kind, value });
    }

    /// Pop the innermost scope. The global and model scopes are never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > self.global_index + 1 {
            self.scopes.pop();
        }
    }

    /// The innermost scope's value.
    pub fn current(&self) -> Value {
        self.scopes
            .last()
            .map_or(Value::Null, |scope| scope.value.clone())
    }

    /// Resolve `name`, innermost scope first. `Ok(None)` when unbound.
    pub fn lookup(
        &self,
        registry: &AccessorRegistry,
        name: &str,
    ) -> Result<Option<Value>, AccessError> {
        for scope in self.scopes.iter().rev() {
            match &scope.value {
                Value::Object(object) => {
                    if let Some(value) = object.get(name) {
                        return Ok(Some(value));
                    }
                }
                other => {
                    if registry.has_member(other, name) {
                        return registry.get_member(other, name);
                    }
                }
            }
        }
        Ok(None)
    }

    /// Bind `name`: in the innermost scope that already has it, else the
    /// innermost `with` target, else the global scope.
    pub fn assign(
        &self,
        registry: &AccessorRegistry,
        name: &str,
        value: Value,
    ) -> Result<(), AccessError> {
        let owner = self
            .scopes
            .iter()
            .rev()
            .find(|scope| registry.has_member(&scope.value, name))
            .or_else(|| {
                self.scopes
                    .iter()
                    .rev()
                    .find(|scope| scope.kind == ScopeKind::With)
            });
        match owner {
            Some(scope) => registry.set_member(&scope.value, name, value),
            None => self.global.set(name, value),
        }
    }

    /// Hide every scope above the global one and push `scopes` as locals.
    pub fn enter_call(&mut self, scopes: impl IntoIterator<Item = ScriptObject>) -> HiddenScopes {
        let hidden = self.scopes.split_off(self.global_index + 1);
        self.scopes.extend(scopes.into_iter().map(|object| Scope {
            kind: ScopeKind::Local,
            value: Value::Object(object),
        }));
        HiddenScopes(hidden)
    }

    /// Drop the call's scopes and bring back the hidden ones.
    pub fn restore(&mut self, hidden: HiddenScopes) {
        self.scopes.truncate(self.global_index + 1);
        self.scopes.extend(hidden.0);
    }

    /// Snapshot of the bindings visible above the global scope, inner
    /// bindings shadowing outer ones. Lambdas close over this.
    pub fn capture_locals(&self, registry: &AccessorRegistry) -> ScriptObject {
        let captured = ScriptObject::new();
        for scope in &self.scopes[self.global_index + 1..] {
            let entries = match &scope.value {
                Value::Object(object) => object.entries(),
                Value::Host(host) => registry.host_entries(host).unwrap_or_default(),
                _ => Vec::new(),
            };
            for (name, value) in entries {
                captured.insert(name, value);
            }
        }
        captured
    }
}
