//! Statement execution.

use std::sync::Arc;

use stencil_ir::{ElseBranch, ExprId, ForLoop, StmtId, StmtKind, StmtRange, WhenRange};
use stencil_stack::ensure_sufficient_stack;

use super::{Flow, Interpreter};
use crate::environment::ScopeKind;
use crate::errors::{invalid_assignment, not_iterable, EvalError, EvalErrorKind, EvalResult};
use crate::value::{values_equal, FunctionValue, RangeValue, ScriptFunction, ScriptObject, Value};

/// The values a `for` loop walks over.
enum Sequence {
    Items(Vec<Value>),
    Range(RangeValue),
}

impl Sequence {
    fn len(&self) -> usize {
        match self {
            Sequence::Items(items) => items.len(),
            Sequence::Range(range) => range.len(),
        }
    }

    fn get(&self, index: usize) -> Value {
        match self {
            Sequence::Items(items) => items.get(index).cloned().unwrap_or_default(),
            Sequence::Range(range) => range.get(index).map_or(Value::Null, Value::Int),
        }
    }
}

impl Interpreter<'_> {
    pub(crate) fn exec_block(&mut self, block: StmtRange) -> EvalResult<Flow> {
        let unit = Arc::clone(&self.unit);
        for &id in unit.arena.stmt_list(block) {
            let flow = self.exec_stmt(id)?;
            if !flow.is_normal() {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, id: StmtId) -> EvalResult<Flow> {
        let unit = Arc::clone(&self.unit);
        let stmt = unit.arena.stmt(id);
        ensure_sufficient_stack(|| self.exec_kind(&stmt.kind))
            .map_err(|error| error.or_at(stmt.span))
    }

    fn exec_kind(&mut self, kind: &StmtKind) -> EvalResult<Flow> {
        let unit = Arc::clone(&self.unit);
        let arena = &unit.arena;
        match kind {
            StmtKind::Text(text) | StmtKind::Raw(text) => {
                self.output.write(arena.name(*text));
                Ok(Flow::Normal)
            }
            StmtKind::Output(expr) => {
                let value = self.eval_expr(*expr)?;
                self.write_value(&value);
                Ok(Flow::Normal)
            }
            StmtKind::Assign { target, value } => {
                let value = self.eval_expr(*value)?;
                self.assign(*target, value)?;
                Ok(Flow::Normal)
            }
            StmtKind::If {
                cond,
                then_block,
                else_branch,
            } => self.exec_if(*cond, *then_block, *else_branch),
            StmtKind::For(header) => self.exec_for(header),
            StmtKind::While { cond, body } => self.exec_while(*cond, *body),
            StmtKind::With { target, body } => self.exec_with(*target, *body),
            StmtKind::Case {
                subject,
                whens,
                else_block,
            } => self.exec_case(*subject, *whens, *else_block),
            StmtKind::Capture { target, body } => {
                let (flow, text) = self.capture(|interp| interp.exec_block(*body))?;
                self.assign(*target, Value::from(text))?;
                Ok(flow)
            }
            StmtKind::FuncDef { name, params, body } => {
                let function = ScriptFunction {
                    name: arena.names().lookup_shared(*name),
                    params: arena
                        .name_list(*params)
                        .iter()
                        .map(|&param| arena.names().lookup_shared(param))
                        .collect(),
                    body: *body,
                    unit: Arc::clone(&unit),
                };
                let value = Value::Function(FunctionValue::Script(Arc::new(function)));
                self.env.assign(self.registry, arena.name(*name), value)?;
                Ok(Flow::Normal)
            }
            StmtKind::Break => Ok(Flow::Break),
            StmtKind::Continue => Ok(Flow::Continue),
            StmtKind::Return(value) => {
                let value = value.map(|expr| self.eval_expr(expr)).transpose()?;
                Ok(Flow::Return(value))
            }
            StmtKind::Import(expr) => {
                let source = self.eval_expr(*expr)?;
                self.import(&source)?;
                Ok(Flow::Normal)
            }
            StmtKind::Include(expr) => {
                let name = self.eval_expr(*expr)?;
                self.include(&name)?;
                Ok(Flow::Normal)
            }
            StmtKind::Error => Err(EvalError::new(EvalErrorKind::InvalidTemplate)),
        }
    }

    fn exec_if(
        &mut self,
        cond: ExprId,
        then_block: StmtRange,
        else_branch: ElseBranch,
    ) -> EvalResult<Flow> {
        if self.eval_expr(cond)?.is_truthy() {
            return self.exec_block(then_block);
        }
        match else_branch {
            ElseBranch::None => Ok(Flow::Normal),
            ElseBranch::ElseIf(stmt) => self.exec_stmt(stmt),
            ElseBranch::Block(block) => self.exec_block(block),
        }
    }

    /// Fail once a loop is about to run its `limit + 1`th iteration.
    fn check_loop_limit(&self, step: usize) -> EvalResult<()> {
        let limit = self.options.loop_limit;
        if limit != 0 && step >= limit {
            tracing::debug!(limit, "loop limit reached");
            return Err(EvalError::new(EvalErrorKind::LoopLimit { limit }));
        }
        Ok(())
    }

    fn sequence(&self, iterable: &Value) -> EvalResult<Sequence> {
        match iterable {
            Value::Null => Ok(Sequence::Items(Vec::new())),
            Value::Array(array) => Ok(Sequence::Items(array.to_vec())),
            Value::Range(range) => Ok(Sequence::Range(*range)),
            Value::Object(object) => Ok(Sequence::Items(
                object
                    .entries()
                    .into_iter()
                    .map(|(key, value)| entry(key, value))
                    .collect(),
            )),
            Value::Host(host) => {
                if let Some(items) = self.registry.host_items(host) {
                    Ok(Sequence::Items(items))
                } else if let Some(entries) = self.registry.host_entries(host) {
                    Ok(Sequence::Items(
                        entries
                            .into_iter()
                            .map(|(key, value)| entry(key, value))
                            .collect(),
                    ))
                } else {
                    Err(not_iterable(iterable))
                }
            }
            other => Err(not_iterable(other)),
        }
    }

    /// Evaluate an optional `limit:`/`offset:` argument.
    fn loop_param(&mut self, expr: Option<ExprId>) -> EvalResult<Option<usize>> {
        let Some(expr) = expr else {
            return Ok(None);
        };
        let value = self.eval_expr(expr)?;
        match value {
            Value::Null => Ok(None),
            Value::Int(n) => Ok(Some(usize::try_from(n).unwrap_or(0))),
            other => Err(invalid_assignment(format!(
                "loop parameter must be an integer, found {}",
                other.type_name()
            ))),
        }
    }

    fn exec_for(&mut self, header: &ForLoop) -> EvalResult<Flow> {
        let iterable = self.eval_expr(header.iterable)?;
        let sequence = self.sequence(&iterable)?;
        let limit = self.loop_param(header.limit)?;
        let offset = self.loop_param(header.offset)?;

        let start = offset.unwrap_or(0).min(sequence.len());
        let count = limit.map_or(sequence.len() - start, |limit| {
            limit.min(sequence.len() - start)
        });
        let position = |step: usize| {
            if header.reversed {
                start + count - 1 - step
            } else {
                start + step
            }
        };

        if count == 0 {
            return match header.else_block {
                Some(block) => self.exec_block(block),
                None => Ok(Flow::Normal),
            };
        }

        let var = self.unit.arena.names().lookup_shared(header.var);
        let mut previous: Option<Value> = None;
        for step in 0..count {
            self.check_loop_limit(step)?;
            let item = sequence.get(position(step));
            let changed = previous
                .as_ref()
                .is_none_or(|previous| !values_equal(previous, &item));
            previous = Some(item.clone());

            let scope = ScriptObject::new();
            scope.insert(Arc::clone(&var), item);
            let companion = Value::Object(loop_object(step, count, changed));
            scope.insert("for", companion.clone());
            scope.insert("forloop", companion);

            let flow = self.with_env_scope(ScopeKind::Loop, Value::Object(scope), |scoped| {
                scoped.exec_block(header.body)
            })?;
            match flow {
                Flow::Break => break,
                Flow::Return(_) => return Ok(flow),
                Flow::Normal | Flow::Continue => {}
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_while(&mut self, cond: ExprId, body: StmtRange) -> EvalResult<Flow> {
        let mut step = 0;
        while self.eval_expr(cond)?.is_truthy() {
            self.check_loop_limit(step)?;
            step += 1;
            match self.exec_block(body)? {
                Flow::Break => break,
                flow @ Flow::Return(_) => return Ok(flow),
                Flow::Normal | Flow::Continue => {}
            }
        }
        Ok(Flow::Normal)
    }

    /// `with target ... end`. A `null` target that names an assignable
    /// location is initialized with a fresh object first.
    fn exec_with(&mut self, target: ExprId, body: StmtRange) -> EvalResult<Flow> {
        let mut value = self.eval_expr(target)?;
        if value.is_null() && self.is_assignable(target) {
            value = Value::Object(ScriptObject::new());
            self.assign(target, value.clone())?;
        }
        if !matches!(value, Value::Object(_) | Value::Host(_)) {
            return Err(invalid_assignment(format!(
                "`with` needs an object, found {}",
                value.type_name()
            )));
        }
        self.with_env_scope(ScopeKind::With, value, |scoped| scoped.exec_block(body))
    }

    fn exec_case(
        &mut self,
        subject: ExprId,
        whens: WhenRange,
        else_block: Option<StmtRange>,
    ) -> EvalResult<Flow> {
        let unit = Arc::clone(&self.unit);
        let subject = self.eval_expr(subject)?;
        for clause in unit.arena.whens(whens) {
            for &candidate in unit.arena.expr_list(clause.values) {
                if values_equal(&subject, &self.eval_expr(candidate)?) {
                    return self.exec_block(clause.body);
                }
            }
        }
        match else_block {
            Some(block) => self.exec_block(block),
            None => Ok(Flow::Normal),
        }
    }

    /// `import source`: copy the members of `source` into the current scope.
    fn import(&mut self, source: &Value) -> EvalResult<()> {
        let entries = match source {
            Value::Object(object) => object.entries(),
            Value::Host(host) => self.registry.host_entries(host).unwrap_or_default(),
            Value::Null => Vec::new(),
            other => {
                return Err(invalid_assignment(format!(
                    "cannot import from {}",
                    other.type_name()
                )))
            }
        };
        let scope = self.env.current();
        for (name, value) in entries {
            self.registry.set_member(&scope, &name, value)?;
        }
        Ok(())
    }
}

fn entry(key: Arc<str>, value: Value) -> Value {
    Value::object([("key", Value::String(key)), ("value", value)])
}

/// The `for`/`forloop` companion object. `index` and `rindex` are 0-based.
fn loop_object(index: usize, length: usize, changed: bool) -> ScriptObject {
    let object = ScriptObject::new();
    object.insert("index", Value::from(index));
    object.insert("rindex", Value::from(length - index - 1));
    object.insert("length", Value::from(length));
    object.insert("first", Value::Bool(index == 0));
    object.insert("last", Value::Bool(index + 1 == length));
    object.insert("even", Value::Bool(index % 2 == 0));
    object.insert("odd", Value::Bool(index % 2 == 1));
    object.insert("changed", Value::Bool(changed));
    object
}
