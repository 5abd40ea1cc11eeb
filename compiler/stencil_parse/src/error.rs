//! Parse error types.
//!
//! A `ParseError` is what a grammar production returns when it cannot go on.
//! The statement loop turns it into a [`Diagnostic`], inserts an `Error`
//! placeholder and resynchronizes.

use stencil_diagnostic::{Diagnostic, ErrorCode};
use stencil_ir::{Span, Token, TokenKind};

/// What was being parsed when an error occurred, for "while parsing X" notes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorContext {
    IfBlock,
    ForLoop,
    WhileLoop,
    WithBlock,
    CaseBlock,
    Capture,
    FunctionDef,
    Assignment,
    LiquidTag,
    Output,
    Lambda,
    ArrayLiteral,
    ObjectLiteral,
    CallArguments,
    Pipe,
}

impl ErrorContext {
    /// Returns a phrase suitable for "while parsing {description}".
    pub fn description(self) -> &'static str {
        match self {
            Self::IfBlock => "an `if` block",
            Self::ForLoop => "a `for` loop",
            Self::WhileLoop => "a `while` loop",
            Self::WithBlock => "a `with` block",
            Self::CaseBlock => "a `case` block",
            Self::Capture => "a `capture` block",
            Self::FunctionDef => "a function definition",
            Self::Assignment => "an assignment",
            Self::LiquidTag => "a tag",
            Self::Output => "an output expression",
            Self::Lambda => "an anonymous function",
            Self::ArrayLiteral => "an array literal",
            Self::ObjectLiteral => "an object literal",
            Self::CallArguments => "call arguments",
            Self::Pipe => "a pipe call",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
    /// Text of the primary label.
    pub label: String,
    pub context: Option<ErrorContext>,
    /// Secondary locations (e.g. where an unclosed block was opened).
    pub related: Vec<(Span, String)>,
}

impl ParseError {
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        ParseError {
            code,
            message: message.into(),
            span,
            label: String::from("here"),
            context: None,
            related: Vec::new(),
        }
    }

    /// `found` did not match what the grammar `expected`.
    pub fn unexpected(found: Token, expected: &str, source: &str) -> Self {
        let found_text = describe_token(found, source);
        ParseError::new(
            ErrorCode::E1001,
            format!("unexpected token: expected {expected}, found {found_text}"),
            found.span,
        )
        .with_label(format!("expected {expected}"))
    }

    pub fn expected_expression(found: Token, source: &str) -> Self {
        ParseError::new(
            ErrorCode::E1002,
            format!("expected expression, found {}", describe_token(found, source)),
            found.span,
        )
        .with_label("expected expression here")
    }

    pub fn unclosed(open: Span, at: Span, delimiter: char, close: char) -> Self {
        ParseError::new(
            ErrorCode::E1003,
            format!("unclosed delimiter `{delimiter}`"),
            at,
        )
        .with_label(format!("expected `{close}`"))
        .with_related(open, "unclosed delimiter opened here")
    }

    pub fn missing_end(open: Span, at: Span, keyword: &str, end: &str) -> Self {
        ParseError::new(
            ErrorCode::E1005,
            format!("`{keyword}` block is missing `{end}`"),
            at,
        )
        .with_label(format!("expected `{end}`"))
        .with_related(open, format!("`{keyword}` opened here"))
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        if self.context.is_none() {
            self.context = Some(context);
        }
        self
    }

    #[must_use]
    pub fn with_related(mut self, span: Span, message: impl Into<String>) -> Self {
        self.related.push((span, message.into()));
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code)
            .with_message(self.message.clone())
            .with_label(self.span, self.label.clone());
        for (span, message) in &self.related {
            diag = diag.with_secondary_label(*span, message.clone());
        }
        if let Some(context) = self.context {
            diag = diag.with_note(format!("while parsing {}", context.description()));
        }
        diag
    }
}

/// "identifier `foo`", "`end`", "end of input", ...
pub(crate) fn describe_token(token: Token, source: &str) -> String {
    match token.kind {
        TokenKind::Ident | TokenKind::Int | TokenKind::Float | TokenKind::String => {
            format!("{} `{}`", token.kind.display_name(), token.text(source))
        }
        TokenKind::Error => format!("invalid character `{}`", token.text(source)),
        kind => kind.display_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn unexpected_token_message() {
        let source = "{{ for 1 }}";
        let token = Token::new(TokenKind::Int, Span::new(7, 8), 1, 8);
        let err = ParseError::unexpected(token, "identifier", source)
            .with_context(ErrorContext::ForLoop);
        assert_eq!(
            err.message,
            "unexpected token: expected identifier, found integer `1`"
        );
        let diag = err.to_diagnostic();
        assert_eq!(diag.code, ErrorCode::E1001);
        assert_eq!(diag.primary_span(), Some(Span::new(7, 8)));
        assert_eq!(diag.notes, vec!["while parsing a `for` loop".to_string()]);
    }

    #[test]
    fn first_context_wins() {
        let err = ParseError::new(ErrorCode::E1002, "x", Span::DUMMY)
            .with_context(ErrorContext::Lambda)
            .with_context(ErrorContext::Output);
        assert_eq!(err.context, Some(ErrorContext::Lambda));
    }

    #[test]
    fn missing_end_points_at_opener() {
        let err = ParseError::missing_end(Span::new(0, 8), Span::new(20, 20), "if", "end");
        let diag = err.to_diagnostic();
        assert_eq!(diag.code, ErrorCode::E1005);
        assert_eq!(diag.labels.len(), 2);
        assert_eq!(diag.message, "`if` block is missing `end`");
    }
}
