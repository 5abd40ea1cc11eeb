//! The [`Diagnostic`] value and its builder.

use std::fmt;

use stencil_ir::Span;

use crate::ErrorCode;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    /// The template cannot be rendered as written.
    Error,
    /// Renders, but probably not as intended.
    Warning,
    Note,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message attached to a stretch of template source.
///
/// A diagnostic's first primary label is where the problem is; secondary
/// labels point at related source such as the tag that opened a block.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
    pub is_primary: bool,
}

impl Label {
    fn new(span: Span, message: impl Into<String>, is_primary: bool) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary,
        }
    }

    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Label::new(span, message, true)
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Label::new(span, message, false)
    }
}

/// A problem found in a template, by the lexer, the parser or the renderer.
///
/// Built up front to back:
///
/// ```
/// use stencil_diagnostic::{Diagnostic, ErrorCode};
/// use stencil_ir::Span;
///
/// let diag = Diagnostic::error(ErrorCode::E1005)
///     .with_message("`if` block is missing `end`")
///     .with_label(Span::new(30, 30), "expected `end`")
///     .with_secondary_label(Span::new(0, 8), "`if` opened here");
/// assert_eq!(diag.primary_span(), Some(Span::new(30, 30)));
/// ```
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "a diagnostic does nothing until it is reported"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// A diagnostic whose message defaults to the code's summary.
    pub fn new(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: code.summary().to_string(),
            labels: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn error(code: ErrorCode) -> Self {
        Diagnostic::new(code, Severity::Error)
    }

    pub fn warning(code: ErrorCode) -> Self {
        Diagnostic::new(code, Severity::Warning)
    }

    pub fn with_message(self, message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            ..self
        }
    }

    /// Marks where the problem is.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find_map(|label| label.is_primary.then_some(label.span))
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// One line per label and note, for logs and test failures. Terminal
/// output with source excerpts goes through [`render`](crate::render).
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        for label in &self.labels {
            let kind = if label.is_primary { "at" } else { "see" };
            write!(f, "\n  {kind} {:?}: {}", label.span, label.message)?;
        }
        self.notes
            .iter()
            .try_for_each(|note| write!(f, "\n  note: {note}"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn one_line_per_label_and_note() {
        let diag = Diagnostic::error(ErrorCode::E1004)
            .with_message("expected identifier")
            .with_label(Span::new(3, 5), "here")
            .with_secondary_label(Span::new(0, 2), "loop opened here")
            .with_note("loop variables must be plain names");

        assert_eq!(
            diag.to_string(),
            "error[E1004]: expected identifier\n  at 3..5: here\n  see 0..2: loop opened here\n  note: loop variables must be plain names"
        );
    }

    #[test]
    fn primary_span_skips_secondary_labels() {
        let diag = Diagnostic::error(ErrorCode::E1003)
            .with_secondary_label(Span::new(0, 1), "opened here")
            .with_label(Span::new(9, 9), "expected `]`");
        assert_eq!(diag.primary_span(), Some(Span::new(9, 9)));
        assert_eq!(Diagnostic::error(ErrorCode::E1003).primary_span(), None);
    }

    #[test]
    fn message_defaults_to_the_code_summary() {
        let diag = Diagnostic::warning(ErrorCode::W1001);
        assert_eq!(diag.message, "unreachable statement");
        assert!(!diag.is_error());
        assert_eq!(diag.severity.to_string(), "warning");
    }
}
