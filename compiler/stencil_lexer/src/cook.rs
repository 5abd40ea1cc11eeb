//! Turning literal token text into values.
//!
//! The lexer keeps only spans; the parser re-reads literal text from the
//! source and cooks it here. The lexer runs [`cook_string`] once up front so
//! that a bad escape is reported as a `LexError`.

use std::borrow::Cow;

/// An invalid escape inside a string literal.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EscapeError {
    /// Byte offset of the backslash, relative to the literal's opening quote.
    pub offset: usize,
    /// Byte length of the offending escape.
    pub len: usize,
    pub escape: char,
}

/// Cook a quoted string literal (`"…"` or `'…'`, quotes included).
///
/// Supported escapes: `\n \r \t \0 \\ \" \'` and `\uXXXX`.
pub fn cook_string(literal: &str) -> Result<Cow<'_, str>, EscapeError> {
    let content = literal
        .get(1..literal.len().saturating_sub(1))
        .unwrap_or("");
    if !content.contains('\\') {
        return Ok(Cow::Borrowed(content));
    }

    let mut out = String::with_capacity(content.len());
    let mut chars = content.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let error = |escape: char, len: usize| EscapeError {
            offset: i + 1,
            len,
            escape,
        };
        let Some((_, esc)) = chars.next() else {
            return Err(error('\\', 1));
        };
        match esc {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0' => out.push('\0'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            'u' => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = chars
                        .next()
                        .and_then(|(_, d)| d.to_digit(16))
                        .ok_or_else(|| error('u', 2))?;
                    code = code * 16 + digit;
                }
                out.push(char::from_u32(code).ok_or_else(|| error('u', 6))?);
            }
            other => return Err(error(other, 1 + other.len_utf8())),
        }
    }
    Ok(Cow::Owned(out))
}

/// A cooked integer literal, widened as far as needed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum IntLiteral {
    Small(i64),
    Wide(i128),
    /// Too large even for `i128`.
    Float(f64),
}

/// Cook a decimal integer literal.
pub fn cook_int(text: &str) -> Option<IntLiteral> {
    if let Ok(v) = text.parse::<i64>() {
        return Some(IntLiteral::Small(v));
    }
    if let Ok(v) = text.parse::<i128>() {
        return Some(IntLiteral::Wide(v));
    }
    text.parse::<f64>().ok().map(IntLiteral::Float)
}

/// Cook a float literal with optional exponent.
pub fn cook_float(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|f| f.is_finite())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn plain_strings_borrow() {
        assert!(matches!(cook_string("\"hello\""), Ok(Cow::Borrowed("hello"))));
        assert_eq!(cook_string("'it'").as_deref(), Ok("it"));
    }

    #[test]
    fn escapes() {
        assert_eq!(
            cook_string(r#""a\tb\n\"q\" é\\""#).as_deref(),
            Ok("a\tb\n\"q\" é\\")
        );
        assert_eq!(cook_string(r"'don\'t'").as_deref(), Ok("don't"));
    }

    #[test]
    fn invalid_escape_reports_position() {
        let err = cook_string(r#""ab\qc""#).unwrap_err();
        assert_eq!(err.escape, 'q');
        assert_eq!(err.offset, 3);
        assert!(cook_string(r#""\u12""#).is_err());
    }

    #[test]
    fn integers_widen() {
        assert_eq!(cook_int("42"), Some(IntLiteral::Small(42)));
        assert_eq!(
            cook_int("9223372036854775808"),
            Some(IntLiteral::Wide(9_223_372_036_854_775_808))
        );
        assert!(matches!(
            cook_int("999999999999999999999999999999999999999999"),
            Some(IntLiteral::Float(_))
        ));
    }

    #[test]
    fn floats() {
        assert_eq!(cook_float("1.5e2"), Some(150.0));
        assert_eq!(cook_float("2.25"), Some(2.25));
    }
}
