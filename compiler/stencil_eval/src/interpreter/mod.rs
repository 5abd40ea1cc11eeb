//! Tree-walking interpreter.
//!
//! One [`Interpreter`] serves one render. It walks the flat template arena
//! statement by statement, threading a [`Flow`] result so loops and
//! functions can react to `break`, `continue` and `ret` without unwinding.
//!
//! # Units
//!
//! `ExprId`s and `StmtId`s only mean something inside the arena that
//! allocated them. Function values and lambdas therefore carry the
//! template they were defined in (`unit`), and the interpreter switches
//! its current unit whenever it runs code from another template: calling a
//! function defined by an include, or running the include itself.
//!
//! Helpers are split by concern:
//!
//! - `exec` - statements and loops
//! - `expr` - expressions and assignment targets
//! - `call` - functions, lambdas, builtins and includes

mod call;
mod exec;
mod expr;
mod output;
mod scope_guard;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use stencil_ir::Template;

use crate::builtins::BuiltinContext;
use crate::environment::Environment;
use crate::errors::EvalResult;
use crate::options::RenderOptions;
use crate::registry::AccessorRegistry;
use crate::value::Value;

pub use scope_guard::{FrameGuard, ScopedInterpreter};

use output::Output;

/// How a statement finished.
#[derive(Clone, Debug)]
pub enum Flow {
    Normal,
    Break,
    Continue,
    Return(Option<Value>),
}

impl Flow {
    fn is_normal(&self) -> bool {
        matches!(self, Flow::Normal)
    }
}

/// Evaluation state for a single render.
pub struct Interpreter<'a> {
    options: &'a RenderOptions,
    registry: &'a AccessorRegistry,
    pub(crate) env: Environment,
    output: Output,
    /// Template whose arena the current ids index into.
    unit: Arc<Template>,
    call_depth: usize,
    includes: FxHashMap<Arc<str>, Arc<Template>>,
}

impl<'a> Interpreter<'a> {
    pub fn new(template: Arc<Template>, model: &Value, options: &'a RenderOptions) -> Self {
        Interpreter {
            options,
            registry: options.registry(),
            env: Environment::new(model),
            output: Output::new(),
            unit: template,
            call_depth: 0,
            includes: FxHashMap::default(),
        }
    }

    /// Run front matter (output discarded), then the body, and return the
    /// rendered text.
    pub fn run(mut self) -> EvalResult<String> {
        if let Some(front_matter) = self.unit.front_matter {
            let (_, discarded) = self.capture(|interp| interp.exec_block(front_matter))?;
            tracing::trace!(bytes = discarded.len(), "discarded front matter output");
        }
        let body = self.unit.body;
        self.exec_block(body)?;
        Ok(self.output.finish())
    }

    pub fn registry(&self) -> &'a AccessorRegistry {
        self.registry
    }

    /// Run `f` with a fresh output buffer and return what it wrote.
    ///
    /// The buffer is popped on error as well, so a failed capture never
    /// leaks into the enclosing output.
    pub(crate) fn capture<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> EvalResult<T>,
    ) -> EvalResult<(T, String)> {
        self.output.begin_capture();
        let result = f(self);
        let text = self.output.end_capture();
        result.map(|value| (value, text))
    }

    fn write_value(&mut self, value: &Value) {
        match value {
            Value::String(text) => self.output.write(text),
            other => {
                let text = other.display(self.registry);
                self.output.write(&text);
            }
        }
    }
}

impl BuiltinContext for Interpreter<'_> {
    fn registry(&self) -> &AccessorRegistry {
        self.registry
    }

    fn loop_limit(&self) -> usize {
        self.options.loop_limit
    }

    fn call_value(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult {
        self.call_function(callee, &args)
    }
}

/// Render `template` against `model`.
///
/// The first runtime error aborts the render.
#[tracing::instrument(level = "debug", skip_all, fields(dialect = %template.dialect))]
pub fn render(template: &Template, model: &Value, options: &RenderOptions) -> EvalResult<String> {
    let interpreter = Interpreter::new(Arc::new(template.clone()), model, options);
    let result = interpreter.run();
    match &result {
        Ok(text) => tracing::debug!(bytes = text.len(), "render finished"),
        Err(error) => tracing::debug!(code = %error.code(), %error, "render failed"),
    }
    result
}
