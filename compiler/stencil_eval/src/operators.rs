//! Binary operator implementations.
//!
//! Integers are promoted `i64` → `i128` → `f64` when a result overflows,
//! and any float operand makes the operation a float one. `&&` and `||`
//! short-circuit in the interpreter and never reach this module.

use std::cmp::Ordering;

use stencil_ir::BinaryOp;

use crate::errors::{division_by_zero, invalid_operands, EvalResult};
use crate::registry::AccessorRegistry;
use crate::value::{values_equal, Value};

#[derive(Copy, Clone, Debug)]
enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    fn of(value: &Value) -> Option<Number> {
        match value {
            Value::Int(n) => Some(Number::Int(i128::from(*n))),
            Value::BigInt(n) => Some(Number::Int(*n)),
            Value::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "promotion to float is the documented overflow behavior"
    )]
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Number::Int(n) => n == 0,
            Number::Float(f) => f == 0.0,
        }
    }
}

/// Evaluate `left op right` for every operator except `&&` and `||`.
pub fn evaluate_binary(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    registry: &AccessorRegistry,
) -> EvalResult {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(values_equal(left, right))),
        BinaryOp::NotEq => Ok(Value::Bool(!values_equal(left, right))),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            compare(op, left, right)
        }
        BinaryOp::Add if is_string(left) || is_string(right) => {
            let mut text = left.display(registry);
            text.push_str(&right.display(registry));
            Ok(Value::from(text))
        }
        BinaryOp::Add
        | BinaryOp::Sub
        | BinaryOp::Mul
        | BinaryOp::Div
        | BinaryOp::FloorDiv
        | BinaryOp::Mod => {
            let (Some(a), Some(b)) = (Number::of(left), Number::of(right)) else {
                return Err(invalid_operands(op.as_symbol(), left, right));
            };
            arithmetic(op, a, b)
        }
        BinaryOp::Contains => contains(left, right, registry),
        BinaryOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
    }
}

fn is_string(value: &Value) -> bool {
    matches!(value, Value::String(_))
}

fn arithmetic(op: BinaryOp, a: Number, b: Number) -> EvalResult {
    if matches!(op, BinaryOp::Div | BinaryOp::FloorDiv | BinaryOp::Mod) && b.is_zero() {
        return Err(division_by_zero());
    }
    if op == BinaryOp::Div {
        return Ok(Value::Float(a.as_f64() / b.as_f64()));
    }
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => Ok(int_arithmetic(op, x, y)),
        _ => Ok(Value::Float(float_arithmetic(op, a.as_f64(), b.as_f64()))),
    }
}

/// Integer arithmetic in `i128`, falling back to float on overflow.
fn int_arithmetic(op: BinaryOp, x: i128, y: i128) -> Value {
    let result = match op {
        BinaryOp::Add => x.checked_add(y),
        BinaryOp::Sub => x.checked_sub(y),
        BinaryOp::Mul => x.checked_mul(y),
        BinaryOp::FloorDiv => floor_div(x, y),
        BinaryOp::Mod => x.checked_rem(y),
        _ => None,
    };
    match result {
        Some(n) => Value::from_i128(n),
        None => Value::Float(float_arithmetic(
            op,
            Number::Int(x).as_f64(),
            Number::Int(y).as_f64(),
        )),
    }
}

fn floor_div(x: i128, y: i128) -> Option<i128> {
    let quotient = x.checked_div(y)?;
    let remainder = x.checked_rem(y)?;
    if remainder != 0 && ((remainder < 0) != (y < 0)) {
        quotient.checked_sub(1)
    } else {
        Some(quotient)
    }
}

fn float_arithmetic(op: BinaryOp, x: f64, y: f64) -> f64 {
    match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::FloorDiv => (x / y).floor(),
        BinaryOp::Mod => x % y,
        _ => x / y,
    }
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => match (Number::of(left), Number::of(right)) {
            (Some(Number::Int(a)), Some(Number::Int(b))) => Some(a.cmp(&b)),
            (Some(a), Some(b)) => a.as_f64().partial_cmp(&b.as_f64()),
            _ => return Err(invalid_operands(op.as_symbol(), left, right)),
        },
    };
    // NaN compares false against everything.
    let Some(ordering) = ordering else {
        return Ok(Value::Bool(false));
    };
    let result = match op {
        BinaryOp::Lt => ordering == Ordering::Less,
        BinaryOp::LtEq => ordering != Ordering::Greater,
        BinaryOp::Gt => ordering == Ordering::Greater,
        _ => ordering != Ordering::Less,
    };
    Ok(Value::Bool(result))
}

/// Total order used by `sort`: numbers before strings, each in natural order.
pub fn sort_order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::String(_), _) if right.is_number() => Some(Ordering::Greater),
        (_, Value::String(_)) if left.is_number() => Some(Ordering::Less),
        _ => match (Number::of(left), Number::of(right)) {
            (Some(Number::Int(a)), Some(Number::Int(b))) => Some(a.cmp(&b)),
            (Some(a), Some(b)) => Some(a.as_f64().total_cmp(&b.as_f64())),
            _ => None,
        },
    }
}

fn contains(haystack: &Value, needle: &Value, registry: &AccessorRegistry) -> EvalResult {
    let found = match haystack {
        Value::String(text) => match needle {
            Value::String(part) => text.contains(&**part),
            other => text.contains(&other.display(registry)),
        },
        Value::Array(items) => items
            .to_vec()
            .iter()
            .any(|item| values_equal(item, needle)),
        Value::Object(object) => match needle {
            Value::String(key) => object.contains_key(key),
            other => object.contains_key(&other.display(registry)),
        },
        Value::Range(range) => needle.as_int().is_some_and(|n| range.contains(n)),
        Value::Host(host) => {
            if let Some(items) = registry.host_items(host) {
                items.iter().any(|item| values_equal(item, needle))
            } else if let Some(key) = needle.as_str() {
                registry.has_member(haystack, key)
            } else {
                return Err(invalid_operands("contains", haystack, needle));
            }
        }
        _ => return Err(invalid_operands("contains", haystack, needle)),
    };
    Ok(Value::Bool(found))
}
