//! Array and collection builtins.
//!
//! These return new arrays; the input is never modified in place.

use std::cmp::Ordering;

use super::{int_arg, items, text, BuiltinContext};
use crate::errors::{builtin_error, EvalResult};
use crate::operators::sort_order;
use crate::value::{values_equal, Value};

pub(super) fn size(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    match &args[0] {
        Value::Null => Ok(Value::Int(0)),
        value => ctx
            .registry()
            .length(value)
            .map(Value::from)
            .ok_or_else(|| builtin_error("size", format!("{} has no size", value.type_name()))),
    }
}

pub(super) fn join(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let separator = args.get(1).map_or_else(|| " ".to_owned(), |sep| text(ctx, sep));
    let parts: Vec<String> = items(ctx, "join", &args[0])?
        .iter()
        .map(|item| text(ctx, item))
        .collect();
    Ok(Value::from(parts.join(&separator)))
}

pub(super) fn first(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    match &args[0] {
        Value::String(text) => Ok(text
            .chars()
            .next()
            .map_or(Value::Null, |c| Value::from(c.to_string()))),
        value => Ok(items(ctx, "first", value)?.into_iter().next().unwrap_or_default()),
    }
}

pub(super) fn last(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    match &args[0] {
        Value::String(text) => Ok(text
            .chars()
            .next_back()
            .map_or(Value::Null, |c| Value::from(c.to_string()))),
        value => Ok(items(ctx, "last", value)?.pop().unwrap_or_default()),
    }
}

/// Reverses arrays, and strings by character.
pub(super) fn reverse(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    match &args[0] {
        Value::String(text) => Ok(Value::from(text.chars().rev().collect::<String>())),
        value => {
            let mut list = items(ctx, "reverse", value)?;
            list.reverse();
            Ok(Value::from(list))
        }
    }
}

/// `sort(list, member?)`: ascending, optionally by a member of each item.
///
/// Mixing numbers and strings is allowed (numbers first); any other
/// incomparable pair is an error.
pub(super) fn sort(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let list = items(ctx, "sort", &args[0])?;
    let mut keyed: Vec<(Value, Value)> = match args.get(1) {
        None | Some(Value::Null) => list.into_iter().map(|item| (item.clone(), item)).collect(),
        Some(member) => {
            let member = text(ctx, member);
            list.into_iter()
                .map(|item| {
                    let key = ctx
                        .registry()
                        .get_member(&item, &member)
                        .ok()
                        .flatten()
                        .unwrap_or_default();
                    (key, item)
                })
                .collect()
        }
    };

    let mut incomparable = None;
    keyed.sort_by(|(a, _), (b, _)| {
        sort_order(a, b).unwrap_or_else(|| {
            incomparable.get_or_insert((a.type_name(), b.type_name()));
            Ordering::Equal
        })
    });
    if let Some((a, b)) = incomparable {
        return Err(builtin_error("sort", format!("cannot compare {a} with {b}")));
    }
    Ok(Value::from(keyed.into_iter().map(|(_, item)| item).collect::<Vec<_>>()))
}

/// Removes duplicates, keeping first occurrences.
pub(super) fn uniq(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let mut unique: Vec<Value> = Vec::new();
    for item in items(ctx, "uniq", &args[0])? {
        if !unique.iter().any(|seen| values_equal(seen, &item)) {
            unique.push(item);
        }
    }
    Ok(Value::from(unique))
}

pub(super) fn concat(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let mut list = items(ctx, "concat", &args[0])?;
    list.extend(items(ctx, "concat", &args[1])?);
    Ok(Value::from(list))
}

/// `map(list, f)` calls `f` per item; `map(list, "name")` reads a member.
pub(super) fn map(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let list = items(ctx, "map", &args[0])?;
    let mapped = match &args[1] {
        Value::Function(_) => list
            .into_iter()
            .map(|item| ctx.call_value(&args[1], vec![item]))
            .collect::<EvalResult<Vec<_>>>()?,
        Value::String(member) => list
            .iter()
            .map(|item| {
                ctx.registry()
                    .get_member(item, member)
                    .map(Option::unwrap_or_default)
            })
            .collect::<Result<Vec<_>, _>>()?,
        other => {
            return Err(builtin_error(
                "map",
                format!("expected a function or member name, found {}", other.type_name()),
            ))
        }
    };
    Ok(Value::from(mapped))
}

pub(super) fn compact(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let list: Vec<Value> = items(ctx, "compact", &args[0])?
        .into_iter()
        .filter(|item| !item.is_null())
        .collect();
    Ok(Value::from(list))
}

/// `slice(value, start, length = 1)` over arrays or strings. A negative
/// start counts from the end.
pub(super) fn slice(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let start = int_arg("slice", &args[1])?;
    let length = match args.get(2) {
        Some(length) => int_arg("slice", length)?,
        None => 1,
    };
    let length = usize::try_from(length).unwrap_or(0);

    match &args[0] {
        Value::String(source) => {
            let chars: Vec<char> = source.chars().collect();
            let from = resolve_start(start, chars.len());
            Ok(Value::from(
                chars.iter().skip(from).take(length).collect::<String>(),
            ))
        }
        value => {
            let list = items(ctx, "slice", value)?;
            let from = resolve_start(start, list.len());
            Ok(Value::from(
                list.into_iter().skip(from).take(length).collect::<Vec<_>>(),
            ))
        }
    }
}

fn resolve_start(start: i64, len: usize) -> usize {
    if start >= 0 {
        usize::try_from(start).unwrap_or(usize::MAX)
    } else {
        let back = usize::try_from(start.unsigned_abs()).unwrap_or(usize::MAX);
        len.saturating_sub(back)
    }
}

/// `default(value, fallback)`: the fallback replaces `null`, `false` and `""`.
pub(super) fn default(_ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let empty = match &args[0] {
        Value::Null | Value::Bool(false) => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    };
    Ok(if empty { args[1].clone() } else { args[0].clone() })
}
