//! Literal text, raw blocks and string literals.

use std::fmt::Write;

use stencil_ir::Dialect;

/// Spell `text` so it lexes back as the same literal text in `dialect`.
///
/// Every `{` that could open a delimiter goes inside a raw block: one
/// followed by `{` or `%`, and a trailing one, since the next emitted code
/// span would follow it directly.
pub fn escape_text(text: &str, dialect: Dialect) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut plain_start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'{' && matches!(bytes.get(i + 1), None | Some(b'{' | b'%')) {
            out.push_str(&text[plain_start..i]);
            push_raw(&mut out, "{", dialect);
            plain_start = i + 1;
        }
    }
    out.push_str(&text[plain_start..]);
    out
}

/// Raw block holding `content`, or `None` when the content would end the
/// block early.
pub fn raw_block(content: &str, dialect: Dialect) -> Option<String> {
    let fits = match dialect {
        // The block ends at the first `}%}`, which may straddle the content's tail.
        Dialect::Native => format!("{content}}}%}}").find("}%}") == Some(content.len()),
        Dialect::Liquid => !content.contains("{%"),
    };
    fits.then(|| {
        let mut out = String::with_capacity(content.len() + 24);
        push_raw(&mut out, content, dialect);
        out
    })
}

fn push_raw(out: &mut String, content: &str, dialect: Dialect) {
    match dialect {
        Dialect::Native => {
            out.push_str("{%{");
            out.push_str(content);
            out.push_str("}%}");
        }
        Dialect::Liquid => {
            out.push_str("{% raw %}");
            out.push_str(content);
            out.push_str("{% endraw %}");
        }
    }
}

/// Double-quoted string literal.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Whether `name` can be written bare as an object key or member name.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
