//! Unary operator implementations.

use stencil_ir::UnaryOp;

use crate::errors::{invalid_operand, EvalResult};
use crate::value::Value;

pub fn evaluate_unary(op: UnaryOp, value: &Value) -> EvalResult {
    match (op, value) {
        (UnaryOp::Not, _) => Ok(Value::Bool(!value.is_truthy())),
        (UnaryOp::Plus, Value::Int(_) | Value::BigInt(_) | Value::Float(_)) => Ok(value.clone()),
        (UnaryOp::Neg, Value::Int(n)) => Ok(n
            .checked_neg()
            .map_or_else(|| Value::BigInt(-i128::from(*n)), Value::Int)),
        (UnaryOp::Neg, Value::BigInt(n)) => Ok(n
            .checked_neg()
            .map_or_else(|| Value::Float(-value_as_f64(value)), Value::from_i128)),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        _ => Err(invalid_operand(op.as_symbol(), value)),
    }
}

fn value_as_f64(value: &Value) -> f64 {
    value.as_f64().unwrap_or(f64::NAN)
}
