//! Runtime values.
//!
//! Scalars are stored inline. Strings are shared `Arc<str>`. Objects, arrays
//! and host values are handles with reference semantics: assigning one to
//! another variable aliases it.

mod array;
mod convert;
mod display;
mod function;
mod host;
mod object;
mod range;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub use array::ScriptArray;
pub use convert::{FromValue, ToValue};
pub use display::write_display;
pub use function::{FunctionValue, Lambda, ScriptFunction};
pub use host::{AccessorBuilder, HostValue};
pub use object::ScriptObject;
pub use range::RangeValue;

use crate::registry::{AccessorRegistry, HostType, OpaqueAccessor, Reflect, ReflectAccessor};

/// Nesting depth at which equality gives up and reports "not equal".
const MAX_COMPARE_DEPTH: usize = 64;

#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Integers that overflowed `i64`.
    BigInt(i128),
    Float(f64),
    String(Arc<str>),
    Array(ScriptArray),
    Object(ScriptObject),
    Range(RangeValue),
    Function(FunctionValue),
    Host(HostValue),
}

impl Value {
    pub fn string(text: impl Into<Arc<str>>) -> Self {
        Value::String(text.into())
    }

    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(items.into_iter().collect())
    }

    pub fn object<K: Into<Arc<str>>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(ScriptObject::from_entries(entries))
    }

    /// Wrap a host container (map, sequence or fixed array) by reference.
    pub fn host<T: HostType>(value: T) -> Self {
        Value::Host(HostValue::new(value, T::accessor))
    }

    /// Wrap a host struct whose members are described by [`Reflect`].
    pub fn reflect<T: Reflect>(value: T) -> Self {
        Value::Host(HostValue::new(value, ReflectAccessor::<T>::build))
    }

    /// Wrap a host value scripts can pass around but not look into.
    pub fn opaque<T: Any + Send + Sync>(value: T) -> Self {
        Value::Host(HostValue::new(value, OpaqueAccessor::build))
    }

    /// Normalize a wide integer back to `Int` when it fits.
    pub fn from_i128(value: i128) -> Self {
        i64::try_from(value).map_or(Value::BigInt(value), Value::Int)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) | Value::BigInt(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Range(_) => "range",
            Value::Function(_) => "function",
            Value::Host(host) => host.type_name(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Only `null` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    /// Integer view; wide integers only when they fit `i64`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::BigInt(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "numeric promotion to float is lossy by definition"
    )]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::BigInt(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::BigInt(_) | Value::Float(_))
    }

    /// Display form written by `{{ value }}`, using `registry` for host values.
    pub fn display(&self, registry: &AccessorRegistry) -> String {
        let mut out = String::new();
        write_display(&mut out, self, registry);
        out
    }
}

/// Structural equality used by `==`, `case` and `contains`.
///
/// Numbers compare by value across representations; arrays and objects
/// compare element-wise; functions and host values by identity. Values of
/// different kinds are never equal.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    equal_at(left, right, 0)
}

fn equal_at(left: &Value, right: &Value, depth: usize) -> bool {
    if depth > MAX_COMPARE_DEPTH {
        return false;
    }
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Int(_) | Value::BigInt(_), Value::Int(_) | Value::BigInt(_)) => {
            wide(left) == wide(right)
        }
        (Value::Float(_), _) | (_, Value::Float(_)) if left.is_number() && right.is_number() => {
            left.as_f64() == right.as_f64()
        }
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            if a.ptr_eq(b) {
                return true;
            }
            let (a, b) = (a.to_vec(), b.to_vec());
            a.len() == b.len()
                && a.iter()
                    .zip(&b)
                    .all(|(x, y)| equal_at(x, y, depth + 1))
        }
        (Value::Object(a), Value::Object(b)) => {
            if a.ptr_eq(b) {
                return true;
            }
            a.len() == b.len()
                && a.entries().iter().all(|(key, value)| {
                    b.get(key)
                        .is_some_and(|other| equal_at(value, &other, depth + 1))
                })
        }
        (Value::Range(a), Value::Range(b)) => {
            a.len() == b.len()
                && (a.is_empty()
                    || (a.get(0) == b.get(0) && (a.len() == 1 || a.get(1) == b.get(1))))
        }
        (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
        (Value::Host(a), Value::Host(b)) => a.ptr_eq(b),
        _ => false,
    }
}

fn wide(value: &Value) -> Option<i128> {
    match value {
        Value::Int(n) => Some(i128::from(*n)),
        Value::BigInt(n) => Some(*n),
        _ => None,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display(AccessorRegistry::global()))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i128> for Value {
    fn from(value: i128) -> Self {
        Value::from_i128(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        i64::try_from(value).map_or_else(
            |_| Value::from_i128(i128::try_from(value).unwrap_or(i128::MAX)),
            Value::Int,
        )
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Arc::from(value))
    }
}

impl From<Arc<str>> for Value {
    fn from(value: Arc<str>) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(ScriptArray::from_vec(items))
    }
}

impl From<ScriptArray> for Value {
    fn from(array: ScriptArray) -> Self {
        Value::Array(array)
    }
}

impl From<ScriptObject> for Value {
    fn from(object: ScriptObject) -> Self {
        Value::Object(object)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]
mod tests;
