//! Stencil: text templates in a Scriban-style native syntax or in Liquid.
//!
//! ```text
//! source ──► parse ──► Template ──► render(model) ──► String
//!                          │
//!                          └──► convert ──► source in the other dialect
//! ```
//!
//! Parsing never fails outright: syntax problems come back as
//! [`Diagnostic`]s next to a best-effort [`Template`]. Rendering stops at
//! the first runtime error and reports it as a [`RenderError`] with a line
//! and column.
//!
//! ```
//! use stencil::{parse, render, ParseOptions, RenderOptions, Value};
//!
//! let parsed = parse("This is a {{ text }} World!", ParseOptions::default());
//! assert!(!parsed.has_errors());
//!
//! let model = Value::object([("text", Value::from("Hello"))]);
//! let output = render(&parsed.template, &model, &RenderOptions::default()).unwrap();
//! assert_eq!(output, "This is a Hello World!");
//! ```
//!
//! Host data enters through [`Value::host`] and [`Value::reflect`]; see
//! [`AccessorRegistry`] for how members are resolved on Rust types.

mod errors;
mod logging;

pub use errors::{ConvertError, Location, RenderError};
pub use logging::init_tracing;

pub use stencil_diagnostic::{Diagnostic, ErrorCode, ReportOptions, Severity};
pub use stencil_eval::{
    camel_case, identity, snake_case, AccessError, AccessorRegistry, EvalError, EvalErrorKind,
    FromValue, HostType, LoadError, MemberTable, MemoryLoader, Reflect, RenderOptions,
    ScriptArray, ScriptObject, TemplateLoader, ToValue, Value, DEFAULT_CALL_DEPTH_LIMIT,
    DEFAULT_LOOP_LIMIT,
};
pub use stencil_ir::{Dialect, ScriptMode, Span, Template};
pub use stencil_parse::{ParseOptions, ParseResult};

/// Parse template source. Never panics; see [`ParseResult::diagnostics`].
pub fn parse(source: &str, options: ParseOptions) -> ParseResult {
    stencil_parse::parse(source, options)
}

/// Render a parsed template against `model`.
pub fn render(
    template: &Template,
    model: &Value,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    stencil_eval::render(template, model, options)
        .map_err(|error| RenderError::from_eval(&error, template.source()))
}

/// Parse and render in one step. The first syntax error is reported as a
/// [`RenderError`] without evaluating anything.
pub fn render_source(
    source: &str,
    parse_options: ParseOptions,
    model: &Value,
    options: &RenderOptions,
) -> Result<String, RenderError> {
    let parsed = parse(source, parse_options);
    if let Some(diagnostic) = parsed.errors().next() {
        return Err(RenderError::from_diagnostic(diagnostic, source));
    }
    render(&parsed.template, model, options)
}

/// Rewrite `source` from one dialect to the other.
pub fn convert(source: &str, from: Dialect, to: Dialect) -> Result<String, ConvertError> {
    convert_in_mode(source, from, to, ScriptMode::Default)
}

/// [`convert`] for script-only or front-matter input.
///
/// The output is re-parsed in `to` before it is returned, so a successful
/// conversion always yields source the parser accepts.
#[tracing::instrument(level = "debug", skip(source), fields(len = source.len()))]
pub fn convert_in_mode(
    source: &str,
    from: Dialect,
    to: Dialect,
    mode: ScriptMode,
) -> Result<String, ConvertError> {
    let parsed = parse(source, ParseOptions::default().with_dialect(from).with_mode(mode));
    if parsed.has_errors() {
        return Err(ConvertError::Syntax {
            diagnostics: parsed.errors().cloned().collect(),
        });
    }

    let output = stencil_fmt::format_template(&parsed.template, to, mode);
    let reparsed = parse(&output, ParseOptions::default().with_dialect(to).with_mode(mode));
    if reparsed.has_errors() {
        tracing::warn!(%from, %to, "converted template does not re-parse");
        return Err(ConvertError::Emit {
            to,
            diagnostics: reparsed.errors().cloned().collect(),
            output,
        });
    }
    Ok(output)
}

/// Annotated source excerpts for a batch of diagnostics, without color.
pub fn render_diagnostics(diagnostics: &[Diagnostic], source: &str) -> String {
    stencil_diagnostic::render(diagnostics, source, ReportOptions::default())
}
