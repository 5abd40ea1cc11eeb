//! String builtins.

use super::{int_arg, text, BuiltinContext};
use crate::errors::EvalResult;
use crate::value::Value;

pub(super) fn upcase(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    Ok(Value::from(text(ctx, &args[0]).to_uppercase()))
}

pub(super) fn downcase(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    Ok(Value::from(text(ctx, &args[0]).to_lowercase()))
}

pub(super) fn capitalize(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let source = text(ctx, &args[0]);
    let mut chars = source.chars();
    let capitalized = match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    };
    Ok(Value::from(capitalized))
}

pub(super) fn strip(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    Ok(Value::from(text(ctx, &args[0]).trim()))
}

pub(super) fn lstrip(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    Ok(Value::from(text(ctx, &args[0]).trim_start()))
}

pub(super) fn rstrip(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    Ok(Value::from(text(ctx, &args[0]).trim_end()))
}

pub(super) fn append(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let mut out = text(ctx, &args[0]);
    out.push_str(&text(ctx, &args[1]));
    Ok(Value::from(out))
}

pub(super) fn prepend(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let mut out = text(ctx, &args[1]);
    out.push_str(&text(ctx, &args[0]));
    Ok(Value::from(out))
}

pub(super) fn replace(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let source = text(ctx, &args[0]);
    let from = text(ctx, &args[1]);
    if from.is_empty() {
        return Ok(Value::from(source));
    }
    Ok(Value::from(source.replace(&from, &text(ctx, &args[2]))))
}

pub(super) fn remove(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let source = text(ctx, &args[0]);
    let part = text(ctx, &args[1]);
    if part.is_empty() {
        return Ok(Value::from(source));
    }
    Ok(Value::from(source.replace(&part, "")))
}

/// `truncate(text, length, ellipsis = "...")`: the ellipsis counts toward
/// `length`.
pub(super) fn truncate(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let source = text(ctx, &args[0]);
    let length = usize::try_from(int_arg("truncate", &args[1])?).unwrap_or(0);
    let ellipsis = args
        .get(2)
        .map_or_else(|| "...".to_owned(), |value| text(ctx, value));

    if source.chars().count() <= length {
        return Ok(Value::from(source));
    }
    let keep = length.saturating_sub(ellipsis.chars().count());
    let mut out: String = source.chars().take(keep).collect();
    out.push_str(&ellipsis);
    Ok(Value::from(out))
}

/// Splitting on an empty separator yields the characters.
pub(super) fn split(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let source = text(ctx, &args[0]);
    let separator = text(ctx, &args[1]);
    let parts: Vec<Value> = if separator.is_empty() {
        source.chars().map(|c| Value::from(c.to_string())).collect()
    } else {
        source.split(separator.as_str()).map(Value::from).collect()
    };
    Ok(Value::from(parts))
}

/// HTML-escape `& < > " '`.
pub(super) fn escape(ctx: &mut dyn BuiltinContext, args: &[Value]) -> EvalResult {
    let source = text(ctx, &args[0]);
    let mut out = String::with_capacity(source.len());
    for c in source.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    Ok(Value::from(out))
}
