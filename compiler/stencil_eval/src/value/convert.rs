//! Conversions between host data and [`Value`].
//!
//! `ToValue` copies host data into script values. `FromValue` is the reverse
//! direction used by host setters; `null` converts to the target type's
//! default so host sequences can be extended with gaps.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::Arc;

use super::{ScriptArray, ScriptObject, Value};
use crate::registry::AccessError;

pub trait ToValue {
    fn to_value(&self) -> Value;
}

pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, AccessError>;
}

fn mismatch(expected: &'static str, found: &Value) -> AccessError {
    AccessError::Conversion {
        expected,
        found: found.type_name(),
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, AccessError> {
        Ok(value)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, AccessError> {
        match value {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }
}

macro_rules! impl_int_conversions {
    ($($ty:ty),*) => {$(
        impl ToValue for $ty {
            fn to_value(&self) -> Value {
                Value::from_i128(i128::from(*self))
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self, AccessError> {
                let wide = match &value {
                    Value::Null => return Ok(0),
                    Value::Int(n) => i128::from(*n),
                    Value::BigInt(n) => *n,
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "guarded by the integral and range checks"
                    )]
                    Value::Float(f) if f.fract() == 0.0 && f.abs() < 1.7e38 => *f as i128,
                    _ => return Err(mismatch(stringify!($ty), &value)),
                };
                <$ty>::try_from(wide).map_err(|_| mismatch(stringify!($ty), &value))
            }
        }
    )*};
}

impl_int_conversions!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl ToValue for usize {
    fn to_value(&self) -> Value {
        Value::from(*self)
    }
}

impl FromValue for usize {
    fn from_value(value: Value) -> Result<Self, AccessError> {
        let wide = u64::from_value(value.clone())?;
        usize::try_from(wide).map_err(|_| mismatch("usize", &value))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, AccessError> {
        match value {
            Value::Null => Ok(0.0),
            other => other.as_f64().ok_or_else(|| mismatch("float", &other)),
        }
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl FromValue for f32 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "host chose single precision"
    )]
    fn from_value(value: Value) -> Result<Self, AccessError> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::from(self)
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::from(self.as_str())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, AccessError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::String(text) => Ok(text.to_string()),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl ToValue for Arc<str> {
    fn to_value(&self) -> Value {
        Value::String(Arc::clone(self))
    }
}

impl FromValue for Arc<str> {
    fn from_value(value: Value) -> Result<Self, AccessError> {
        match value {
            Value::Null => Ok(Arc::from("")),
            Value::String(text) => Ok(text),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToValue::to_value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, AccessError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, AccessError> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items.to_vec().into_iter().map(T::from_value).collect(),
            other => Err(mismatch("array", &other)),
        }
    }
}

impl<T: ToValue, S: BuildHasher> ToValue for HashMap<String, T, S> {
    fn to_value(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(key, value)| (key.as_str(), value.to_value()))
                .collect(),
        )
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(key, value)| (key.as_str(), value.to_value()))
                .collect(),
        )
    }
}

impl ToValue for ScriptObject {
    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl ToValue for ScriptArray {
    fn to_value(&self) -> Value {
        Value::Array(self.clone())
    }
}
