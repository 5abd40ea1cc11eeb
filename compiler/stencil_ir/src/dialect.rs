//! Surface syntaxes and lexing modes.

use std::fmt;

/// Concrete surface syntax. Both dialects share one AST.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Dialect {
    /// `{{ … }}` code spans with `end`-terminated blocks.
    #[default]
    Native,
    /// Liquid-compatible `{{ … }}` output and `{% … %}` tags.
    Liquid,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Native => f.write_str("native"),
            Dialect::Liquid => f.write_str("liquid"),
        }
    }
}

/// How the source is split between literal text and code.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ScriptMode {
    /// Literal text interleaved with delimited code.
    #[default]
    Default,
    /// The whole input is code.
    ScriptOnly,
    /// An optional `+++` delimited code block, then a `Default` body.
    FrontMatter,
}
