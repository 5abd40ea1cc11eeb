//! Numeric builtins.
//!
//! Arguments may be numbers or numeric strings; `null` counts as zero.

use stencil_ir::BinaryOp;

use super::{int_arg, BuiltinContext};
use crate::errors::{builtin_error, EvalResult};
use crate::operators::evaluate_binary;
use crate::value::Value;

fn number(name: &'static str, value: &Value) -> EvalResult {
    match value {
        Value::Null => Ok(Value::Int(0)),
        Value::Int(_) | Value::BigInt(_) | Value::Float(_) => Ok(value.clone()),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .map(Value::Int)
                .or_else(|_| text.parse::<f64>().map(Value::Float))
                .map_err(|_| builtin_error(name, format!("`{text}` is not a number")))
        }
        other => Err(builtin_error(
            name,
            format!("expected a number, found {}", other.type_name()),
        )),
    }
}

fn arithmetic(ctx: &dyn BuiltinContext, name: &'static str, op: BinaryOp, args: &[Value]) -> EvalResult {
    let left = number(name, &args[0])?;
    let right = number(name, &args[1])?;
    evaluate_binary(op, &left, &right, ctx.registry())
}

pub(super) fn plus(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    arithmetic(ctx, "plus", BinaryOp::Add, args)
}

pub(super) fn minus(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    arithmetic(ctx, "minus", BinaryOp::Sub, args)
}

pub(super) fn times(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    arithmetic(ctx, "times", BinaryOp::Mul, args)
}

/// Integer operands floor-divide; anything else divides as float.
pub(super) fn divided_by(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let left = number("divided_by", &args[0])?;
    let right = number("divided_by", &args[1])?;
    let op = if matches!(left, Value::Float(_)) || matches!(right, Value::Float(_)) {
        BinaryOp::Div
    } else {
        BinaryOp::FloorDiv
    };
    evaluate_binary(op, &left, &right, ctx.registry())
}

pub(super) fn modulo(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    arithmetic(ctx, "modulo", BinaryOp::Mod, args)
}

pub(super) fn abs(_ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    match number("abs", &args[0])? {
        Value::Int(n) => Ok(n
            .checked_abs()
            .map_or_else(|| Value::BigInt(i128::from(n).abs()), Value::Int)),
        Value::BigInt(n) => Ok(n
            .checked_abs()
            .map_or(Value::Float(f64::MAX), Value::from_i128)),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Ok(other),
    }
}

/// `round(n, digits = 0)`. Whole-number results become integers.
pub(super) fn round(_ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let digits = match args.get(1) {
        Some(digits) => int_arg("round", digits)?,
        None => 0,
    };
    match number("round", &args[0])? {
        Value::Float(f) if digits <= 0 => Ok(integral(f.round())),
        Value::Float(f) => {
            let scale = 10f64.powi(i32::try_from(digits).unwrap_or(i32::MAX));
            Ok(Value::Float((f * scale).round() / scale))
        }
        other => Ok(other),
    }
}

pub(super) fn floor(_ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    match number("floor", &args[0])? {
        Value::Float(f) => Ok(integral(f.floor())),
        other => Ok(other),
    }
}

pub(super) fn ceil(_ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    match number("ceil", &args[0])? {
        Value::Float(f) => Ok(integral(f.ceil())),
        other => Ok(other),
    }
}

/// An already-rounded float as `Int` when it fits.
#[expect(
    clippy::cast_possible_truncation,
    reason = "the value is integral and range-checked before the cast"
)]
fn integral(f: f64) -> Value {
    if f.is_finite() && f.abs() < 9.2e18 {
        Value::Int(f as i64)
    } else {
        Value::Float(f)
    }
}
