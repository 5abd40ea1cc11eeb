//! Builtin functions.
//!
//! A static table of `(name, arity range, fn)`. Builtins are the last stop
//! of name lookup, so a template variable or function with the same name
//! shadows them. Every builtin receives its arguments with the piped value
//! first: `x | truncate 5` calls `truncate(x, 5)`.

mod collections;
mod math;
mod strings;

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use crate::errors::{builtin_error, wrong_arg_count, EvalError, EvalErrorKind, EvalResult};
use crate::registry::AccessorRegistry;
use crate::value::Value;

/// What a builtin may ask of the interpreter.
pub trait BuiltinContext {
    fn registry(&self) -> &AccessorRegistry;

    /// The render's loop limit; `0` means unlimited.
    fn loop_limit(&self) -> usize;

    /// Call a function value, as `map` does with its mapper.
    fn call_value(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult;
}

pub type BuiltinFn = fn(&mut dyn BuiltinContext, &[Value]) -> EvalResult;

pub struct Builtin {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    func: BuiltinFn,
}

impl Builtin {
    const fn new(name: &'static str, min_args: usize, max_args: usize, func: BuiltinFn) -> Self {
        Builtin {
            name,
            min_args,
            max_args,
            func,
        }
    }

    pub fn call(&self, ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
        if args.len() < self.min_args || args.len() > self.max_args {
            return Err(wrong_arg_count(
                self.name,
                self.min_args,
                self.max_args,
                args.len(),
            ));
        }
        (self.func)(ctx, args)
    }
}

static BUILTINS: &[Builtin] = &[
    // strings
    Builtin::new("upcase", 1, 1, strings::upcase),
    Builtin::new("downcase", 1, 1, strings::downcase),
    Builtin::new("capitalize", 1, 1, strings::capitalize),
    Builtin::new("strip", 1, 1, strings::strip),
    Builtin::new("lstrip", 1, 1, strings::lstrip),
    Builtin::new("rstrip", 1, 1, strings::rstrip),
    Builtin::new("append", 2, 2, strings::append),
    Builtin::new("prepend", 2, 2, strings::prepend),
    Builtin::new("replace", 3, 3, strings::replace),
    Builtin::new("remove", 2, 2, strings::remove),
    Builtin::new("truncate", 2, 3, strings::truncate),
    Builtin::new("split", 2, 2, strings::split),
    Builtin::new("escape", 1, 1, strings::escape),
    // collections
    Builtin::new("size", 1, 1, collections::size),
    Builtin::new("join", 1, 2, collections::join),
    Builtin::new("first", 1, 1, collections::first),
    Builtin::new("last", 1, 1, collections::last),
    Builtin::new("reverse", 1, 1, collections::reverse),
    Builtin::new("sort", 1, 2, collections::sort),
    Builtin::new("uniq", 1, 1, collections::uniq),
    Builtin::new("concat", 2, 2, collections::concat),
    Builtin::new("map", 2, 2, collections::map),
    Builtin::new("compact", 1, 1, collections::compact),
    Builtin::new("slice", 2, 3, collections::slice),
    Builtin::new("default", 2, 2, collections::default),
    // math
    Builtin::new("plus", 2, 2, math::plus),
    Builtin::new("minus", 2, 2, math::minus),
    Builtin::new("times", 2, 2, math::times),
    Builtin::new("divided_by", 2, 2, math::divided_by),
    Builtin::new("modulo", 2, 2, math::modulo),
    Builtin::new("abs", 1, 1, math::abs),
    Builtin::new("round", 1, 2, math::round),
    Builtin::new("floor", 1, 1, math::floor),
    Builtin::new("ceil", 1, 1, math::ceil),
];

/// Find a builtin by name.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    static INDEX: OnceLock<FxHashMap<&'static str, &'static Builtin>> = OnceLock::new();
    INDEX
        .get_or_init(|| {
            tracing::trace!(count = BUILTINS.len(), "indexing builtins");
            BUILTINS.iter().map(|builtin| (builtin.name, builtin)).collect()
        })
        .get(name)
        .copied()
}

/// Names of every builtin, in table order.
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|builtin| builtin.name)
}

/// String form of a builtin argument; `null` reads as empty.
fn text(ctx: &dyn BuiltinContext, value: &Value) -> String {
    match value {
        Value::String(text) => text.to_string(),
        other => other.display(ctx.registry()),
    }
}

/// Integer argument; integral floats are accepted.
#[expect(
    clippy::cast_possible_truncation,
    reason = "only integral floats within i64 range reach the cast"
)]
fn int_arg(name: &'static str, value: &Value) -> EvalResult<i64> {
    match value {
        Value::Float(f) if f.fract() == 0.0 && f.abs() < 9.2e18 => Ok(*f as i64),
        other => other.as_int().ok_or_else(|| {
            builtin_error(
                name,
                format!("expected an integer, found {}", other.type_name()),
            )
        }),
    }
}

/// Largest range a builtin expands into an array when loops are unlimited.
const MAX_RANGE_ITEMS: usize = 1 << 20;

/// Elements of a sequence argument; `null` is empty.
///
/// Ranges expand only up to the loop limit.
fn items(ctx: &dyn BuiltinContext, name: &'static str, value: &Value) -> EvalResult<Vec<Value>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(array) => Ok(array.to_vec()),
        Value::Range(range) => {
            let limit = match ctx.loop_limit() {
                0 => MAX_RANGE_ITEMS,
                limit => limit.min(MAX_RANGE_ITEMS),
            };
            if range.len() > limit {
                return Err(EvalError::new(EvalErrorKind::LoopLimit { limit }));
            }
            Ok(range.iter().map(Value::Int).collect())
        }
        Value::Host(host) => ctx.registry().host_items(host).ok_or_else(|| {
            builtin_error(name, format!("expected an array, found {}", value.type_name()))
        }),
        other => Err(builtin_error(
            name,
            format!("expected an array, found {}", other.type_name()),
        )),
    }
}
