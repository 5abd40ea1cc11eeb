//! The text a value writes into the output.

use std::fmt::Write;

use super::Value;
use crate::registry::AccessorRegistry;

/// Containers nested deeper than this print as `...`.
const MAX_DISPLAY_DEPTH: usize = 16;

/// Longer ranges print in `a..b` notation instead of element by element.
const MAX_RANGE_ITEMS: usize = 1000;

/// Append the display form of `value` to `out`.
///
/// Top-level `null` writes nothing. Arrays print as `[a, b]`, objects as
/// `{k: v}`, nested `null` as `null`.
pub fn write_display(out: &mut String, value: &Value, registry: &AccessorRegistry) {
    if !value.is_null() {
        write_value(out, value, registry, 0);
    }
}

fn write_value(out: &mut String, value: &Value, registry: &AccessorRegistry, depth: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Value::BigInt(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Float(f) => {
            let _ = write!(out, "{f}");
        }
        Value::String(text) => out.push_str(text),
        Value::Array(array) => write_items(out, &array.to_vec(), registry, depth),
        Value::Range(range) if range.len() > MAX_RANGE_ITEMS => {
            let op = if range.inclusive { ".." } else { "..<" };
            let _ = write!(out, "{}{op}{}", range.start, range.end);
        }
        Value::Range(range) => {
            let items: Vec<Value> = range.iter().map(Value::Int).collect();
            write_items(out, &items, registry, depth);
        }
        Value::Object(object) => write_entries(out, &object.entries(), registry, depth),
        Value::Function(function) => {
            let _ = write!(out, "<function {}>", function.name());
        }
        Value::Host(host) => {
            if let Some(entries) = registry.host_entries(host) {
                write_entries(out, &entries, registry, depth);
            } else if let Some(items) = registry.host_items(host) {
                write_items(out, &items, registry, depth);
            } else {
                let _ = write!(out, "<{}>", host.type_name());
            }
        }
    }
}

fn write_items(out: &mut String, items: &[Value], registry: &AccessorRegistry, depth: usize) {
    if depth >= MAX_DISPLAY_DEPTH {
        out.push_str("[...]");
        return;
    }
    out.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_value(out, item, registry, depth + 1);
    }
    out.push(']');
}

fn write_entries(
    out: &mut String,
    entries: &[(std::sync::Arc<str>, Value)],
    registry: &AccessorRegistry,
    depth: usize,
) {
    if depth >= MAX_DISPLAY_DEPTH {
        out.push_str("{...}");
        return;
    }
    out.push('{');
    for (i, (key, value)) in entries.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(key);
        out.push_str(": ");
        write_value(out, value, registry, depth + 1);
    }
    out.push('}');
}
