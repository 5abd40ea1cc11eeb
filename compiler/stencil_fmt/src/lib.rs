//! Stencil Formatter
//!
//! Re-emits parsed templates as source in either dialect. This backs
//! dialect conversion: a Liquid template parsed into the shared AST can be
//! written out as native syntax and the other way round.
//!
//! # Guarantees
//!
//! Re-parsing the output (in the target dialect and the given mode) yields
//! a template with the same statements and the same rendered output, and
//! introduces no diagnostics. Literal text that contains delimiter
//! sequences is written inside the dialect's raw block, and expressions are
//! parenthesized by precedence.
//!
//! # Modules
//!
//! - [`emitter`]: Output abstraction
//! - [`formatter`]: Statement and expression rendering
//! - [`text`]: Text escaping and string literals

pub mod emitter;
pub mod formatter;
pub mod text;

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;

pub use emitter::{Emitter, StringEmitter};
pub use formatter::TemplateFormatter;

use stencil_ir::{Dialect, ExprId, ScriptMode, Template, TemplateArena};

/// Write `template` as `dialect` source, to be re-parsed under `mode`.
#[tracing::instrument(level = "debug", skip(template))]
pub fn format_template(template: &Template, dialect: Dialect, mode: ScriptMode) -> String {
    let emitter = StringEmitter::with_capacity(template.source().len());
    let mut formatter = TemplateFormatter::new(&template.arena, dialect, emitter);
    formatter.format_template(template, mode);
    formatter.finish().output()
}

/// Write a single expression as `dialect` source.
pub fn format_expr(arena: &TemplateArena, id: ExprId, dialect: Dialect) -> String {
    let mut formatter = TemplateFormatter::new(arena, dialect, StringEmitter::new());
    formatter.expr(id);
    formatter.finish().output()
}
