//! Errors surfaced by the facade.

use std::fmt;

use stencil_diagnostic::{span_line_col, Diagnostic, ErrorCode};
use stencil_eval::EvalError;
use stencil_ir::{Dialect, Span};

/// 1-based line and character column.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A failed render.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
#[error("{message}{}", at(.location))]
pub struct RenderError {
    pub code: ErrorCode,
    pub message: String,
    /// Byte span in the rendered template's source, when known.
    pub span: Option<Span>,
    pub location: Option<Location>,
}

impl RenderError {
    pub fn from_eval(error: &EvalError, source: &str) -> Self {
        RenderError {
            code: error.code(),
            message: error.kind.to_string(),
            span: error.span,
            location: error.span.map(|span| locate(source, span)),
        }
    }

    pub fn from_diagnostic(diagnostic: &Diagnostic, source: &str) -> Self {
        let span = diagnostic.primary_span();
        RenderError {
            code: diagnostic.code,
            message: diagnostic.message.clone(),
            span,
            location: span.map(|span| locate(source, span)),
        }
    }

    /// The error as a diagnostic, for [`crate::render_diagnostics`].
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.code).with_message(self.message.clone());
        match self.span {
            Some(span) => diagnostic.with_label(span, "raised here"),
            None => diagnostic,
        }
    }
}

fn locate(source: &str, span: Span) -> Location {
    let (line, column) = span_line_col(source, span);
    Location { line, column }
}

fn at(location: &Option<Location>) -> String {
    location.map(|l| format!(" at {l}")).unwrap_or_default()
}

/// A conversion that could not produce source.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum ConvertError {
    /// The input had syntax errors; nothing was emitted.
    #[error("cannot convert a template with syntax errors: {}", first(.diagnostics))]
    Syntax { diagnostics: Vec<Diagnostic> },
    /// The emitted source did not parse back in the target dialect.
    #[error("converted {to} template does not parse: {}", first(.diagnostics))]
    Emit {
        to: Dialect,
        output: String,
        diagnostics: Vec<Diagnostic>,
    },
}

impl ConvertError {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            ConvertError::Syntax { diagnostics } | ConvertError::Emit { diagnostics, .. } => {
                diagnostics
            }
        }
    }
}

fn first(diagnostics: &[Diagnostic]) -> &str {
    diagnostics
        .first()
        .map_or("unknown error", |d| d.message.as_str())
}
