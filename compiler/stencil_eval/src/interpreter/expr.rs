//! Expression evaluation and assignment targets.

use std::sync::Arc;

use smallvec::SmallVec;
use stencil_ir::{BinaryOp, Expr, ExprId, ExprKind, Name, Span};
use stencil_stack::ensure_sufficient_stack;

use super::Interpreter;
use crate::builtins;
use crate::errors::{
    invalid_assignment, invalid_operands, undefined_variable, EvalError, EvalErrorKind, EvalResult,
};
use crate::operators::evaluate_binary;
use crate::registry::AccessError;
use crate::unary_operators::evaluate_unary;
use crate::value::{FunctionValue, Lambda, RangeValue, ScriptObject, Value};

impl Interpreter<'_> {
    pub(crate) fn eval_expr(&mut self, id: ExprId) -> EvalResult {
        let unit = Arc::clone(&self.unit);
        let expr = unit.arena.expr(id);
        ensure_sufficient_stack(|| self.eval_kind(expr))
            .map_err(|error| error.or_at(expr.span))
    }

    fn eval_kind(&mut self, expr: &Expr) -> EvalResult {
        let unit = Arc::clone(&self.unit);
        let arena = &unit.arena;
        match &expr.kind {
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::BigInt(n) => Ok(Value::from_i128(*n)),
            ExprKind::Float(bits) => Ok(Value::Float(f64::from_bits(*bits))),
            ExprKind::String(text) => Ok(Value::String(arena.names().lookup_shared(*text))),
            ExprKind::Ident(name) => self.eval_ident(*name, expr.span),
            ExprKind::Member { receiver, name } => {
                let receiver = self.eval_expr(*receiver)?;
                self.read_member(&receiver, arena.name(*name))
            }
            ExprKind::Index { receiver, index } => {
                let receiver = self.eval_expr(*receiver)?;
                let index = self.eval_expr(*index)?;
                self.read_index(&receiver, &index)
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval_expr(*operand)?;
                evaluate_unary(*op, &operand)
            }
            ExprKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => Ok(Value::Bool(
                self.eval_expr(*left)?.is_truthy() && self.eval_expr(*right)?.is_truthy(),
            )),
            ExprKind::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => Ok(Value::Bool(
                self.eval_expr(*left)?.is_truthy() || self.eval_expr(*right)?.is_truthy(),
            )),
            ExprKind::Binary { op, left, right } => {
                let left = self.eval_expr(*left)?;
                let right = self.eval_expr(*right)?;
                evaluate_binary(*op, &left, &right, self.registry)
            }
            ExprKind::Call { callee, args, .. } => {
                let function = self.eval_expr(*callee)?;
                let args = arena
                    .expr_list(*args)
                    .iter()
                    .map(|&arg| self.eval_expr(arg))
                    .collect::<EvalResult<SmallVec<[Value; 4]>>>()?;
                self.call_named(*callee, &function, &args)
            }
            ExprKind::Range {
                start,
                end,
                inclusive,
            } => {
                let start = self.eval_expr(*start)?;
                let end = self.eval_expr(*end)?;
                let op = if *inclusive { ".." } else { "..<" };
                match (start.as_int(), end.as_int()) {
                    (Some(from), Some(to)) => Ok(Value::Range(RangeValue::new(from, to, *inclusive))),
                    _ => Err(invalid_operands(op, &start, &end)),
                }
            }
            ExprKind::Array(items) => {
                let items = arena
                    .expr_list(*items)
                    .iter()
                    .map(|&item| self.eval_expr(item))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::from(items))
            }
            ExprKind::Object(entries) => {
                let object = ScriptObject::new();
                for entry in arena.entries(*entries) {
                    let value = self.eval_expr(entry.value)?;
                    object.insert(arena.names().lookup_shared(entry.key), value);
                }
                Ok(Value::Object(object))
            }
            ExprKind::Lambda { params, body } => {
                let lambda = Lambda {
                    params: arena
                        .name_list(*params)
                        .iter()
                        .map(|&param| arena.names().lookup_shared(param))
                        .collect(),
                    body: *body,
                    unit: Arc::clone(&unit),
                    captured: self.env.capture_locals(self.registry),
                };
                Ok(Value::Function(FunctionValue::Lambda(Arc::new(lambda))))
            }
            ExprKind::Error => Err(EvalError::new(EvalErrorKind::InvalidTemplate)),
        }
    }

    /// Scopes first, then builtins. Unbound names are `null` unless
    /// strict variables are on.
    fn eval_ident(&mut self, name: Name, span: Span) -> EvalResult {
        let unit = Arc::clone(&self.unit);
        let text = unit.arena.name(name);
        if let Some(value) = self.env.lookup(self.registry, text)? {
            return Ok(value);
        }
        if let Some(builtin) = builtins::lookup(text) {
            return Ok(Value::Function(FunctionValue::Builtin(builtin)));
        }
        if self.options.strict_variables {
            return Err(undefined_variable(text, span));
        }
        Ok(Value::Null)
    }

    /// Member read. A `null` receiver reads `null`; lookup failures read
    /// `null` under relaxed member access.
    pub(crate) fn read_member(&self, receiver: &Value, name: &str) -> EvalResult {
        if receiver.is_null() {
            return Ok(Value::Null);
        }
        let result = self
            .registry
            .get_member(receiver, name)
            .map(Option::unwrap_or_default);
        self.relax(result)
    }

    pub(crate) fn read_index(&self, receiver: &Value, index: &Value) -> EvalResult {
        if receiver.is_null() {
            return Ok(Value::Null);
        }
        self.relax(self.registry.get_index(receiver, index))
    }

    fn relax(&self, result: Result<Value, AccessError>) -> EvalResult {
        match result {
            Err(error) if self.options.relaxed_member_access && error.is_lookup_failure() => {
                tracing::trace!(%error, "relaxed member access");
                Ok(Value::Null)
            }
            other => other.map_err(EvalError::from),
        }
    }

    pub(crate) fn is_assignable(&self, target: ExprId) -> bool {
        matches!(
            self.unit.arena.expr(target).kind,
            ExprKind::Ident(_) | ExprKind::Member { .. } | ExprKind::Index { .. }
        )
    }

    /// Store `value` at an identifier, member or index target.
    pub(crate) fn assign(&mut self, target: ExprId, value: Value) -> EvalResult<()> {
        let unit = Arc::clone(&self.unit);
        let expr = unit.arena.expr(target);
        let result = match &expr.kind {
            ExprKind::Ident(name) => self
                .env
                .assign(self.registry, unit.arena.name(*name), value)
                .map_err(EvalError::from),
            ExprKind::Member { receiver, name } => {
                let receiver = self.eval_expr(*receiver)?;
                self.registry
                    .set_member(&receiver, unit.arena.name(*name), value)
                    .map_err(EvalError::from)
            }
            ExprKind::Index { receiver, index } => {
                let receiver = self.eval_expr(*receiver)?;
                let index = self.eval_expr(*index)?;
                self.registry
                    .set_index(&receiver, &index, value)
                    .map_err(EvalError::from)
            }
            _ => Err(invalid_assignment("only variables, members and indices can be assigned")),
        };
        result.map_err(|error| error.or_at(expr.span))
    }
}
