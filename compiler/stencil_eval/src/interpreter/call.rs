//! Calls: builtins, template functions, lambdas and includes.

use std::sync::Arc;

use stencil_ir::{ExprId, ExprKind, ScriptMode, Template};
use stencil_parse::{parse, ParseOptions};

use super::{Flow, Interpreter};
use crate::errors::{include_failed, not_callable, wrong_arg_count, EvalError, EvalResult};
use crate::value::{FunctionValue, Lambda, ScriptFunction, ScriptObject, Value};

impl Interpreter<'_> {
    /// Call the value `callee_expr` evaluated to, naming the expression in
    /// the error when it is not a function.
    pub(crate) fn call_named(
        &mut self,
        callee_expr: ExprId,
        callee: &Value,
        args: &[Value],
    ) -> EvalResult {
        if matches!(callee, Value::Function(_)) {
            return self.call_function(callee, args);
        }
        let unit = Arc::clone(&self.unit);
        let name = match &unit.arena.expr(callee_expr).kind {
            ExprKind::Ident(name) | ExprKind::Member { name, .. } => unit.arena.name(*name),
            _ => "expression",
        };
        Err(not_callable(name, callee))
    }

    pub(crate) fn call_function(&mut self, callee: &Value, args: &[Value]) -> EvalResult {
        match callee {
            Value::Function(FunctionValue::Builtin(builtin)) => builtin.call(self, args),
            Value::Function(FunctionValue::Script(function)) => {
                let function = Arc::clone(function);
                self.call_script(&function, args)
            }
            Value::Function(FunctionValue::Lambda(lambda)) => {
                let lambda = Arc::clone(lambda);
                self.call_lambda(&lambda, args)
            }
            other => Err(not_callable("value", other)),
        }
    }

    /// Run a `func` body with its output captured.
    ///
    /// The result is the `ret` value, else the captured text, else `null`.
    fn call_script(&mut self, function: &ScriptFunction, args: &[Value]) -> EvalResult {
        let locals = bind_params(&function.name, &function.params, args)?;
        let foreign = !Arc::ptr_eq(&function.unit, &self.unit);
        let mut frame = self.enter_frame(Arc::clone(&function.unit), Some(vec![locals]))?;
        let (flow, text) = frame
            .capture(|interp| interp.exec_block(function.body))
            .map_err(|error| detach(error, foreign))?;
        Ok(match flow {
            Flow::Return(Some(value)) => value,
            _ if !text.is_empty() => Value::from(text),
            _ => Value::Null,
        })
    }

    /// Evaluate a lambda body over its captured locals plus parameters.
    fn call_lambda(&mut self, lambda: &Lambda, args: &[Value]) -> EvalResult {
        let locals = bind_params("<lambda>", &lambda.params, args)?;
        let foreign = !Arc::ptr_eq(&lambda.unit, &self.unit);
        let mut frame = self.enter_frame(
            Arc::clone(&lambda.unit),
            Some(vec![lambda.captured.clone(), locals]),
        )?;
        frame
            .eval_expr(lambda.body)
            .map_err(|error| detach(error, foreign))
    }

    /// `include name`: run another template in the current scopes.
    pub(crate) fn include(&mut self, name: &Value) -> EvalResult<()> {
        let name: Arc<str> = match name {
            Value::String(text) => Arc::clone(text),
            other => Arc::from(other.display(self.registry)),
        };
        let template = match self.includes.get(&name) {
            Some(template) => Arc::clone(template),
            None => {
                let template = self.load_include(&name)?;
                self.includes.insert(Arc::clone(&name), Arc::clone(&template));
                template
            }
        };
        let mut frame = self.enter_frame(Arc::clone(&template), None)?;
        frame
            .exec_block(template.body)
            .map_err(|error| detach(error, true))?;
        Ok(())
    }

    /// Load and parse an include in the including template's dialect.
    fn load_include(&self, name: &str) -> EvalResult<Arc<Template>> {
        let Some(loader) = &self.options.loader else {
            return Err(include_failed(name, "no template loader is configured"));
        };
        let source = loader
            .load(name)
            .map_err(|error| include_failed(name, error.to_string()))?;
        let options = ParseOptions::default()
            .with_dialect(self.unit.dialect)
            .with_mode(ScriptMode::Default);
        let parsed = parse(&source, options);
        if let Some(error) = parsed.errors().next() {
            return Err(include_failed(name, error.message.clone()));
        }
        tracing::debug!(name, bytes = source.len(), "loaded include");
        Ok(Arc::new(parsed.template))
    }
}

/// Bind arguments to parameter names; missing ones are `null`.
fn bind_params(name: &str, params: &[Arc<str>], args: &[Value]) -> EvalResult<ScriptObject> {
    if args.len() > params.len() {
        return Err(wrong_arg_count(name, params.len(), params.len(), args.len()));
    }
    let locals = ScriptObject::new();
    for (i, param) in params.iter().enumerate() {
        locals.insert(Arc::clone(param), args.get(i).cloned().unwrap_or_default());
    }
    Ok(locals)
}

/// Spans from another template's source mean nothing to the caller; drop
/// them so the call site's span is attached instead.
fn detach(mut error: EvalError, foreign: bool) -> EvalError {
    if foreign {
        error.span = None;
    }
    error
}
