//! Unrecoverable lexing failures.
//!
//! Anything the parser can recover from (a stray character, a bad operator)
//! becomes an `Error` token instead. A `LexError` ends the token stream.

use stencil_diagnostic::{Diagnostic, ErrorCode};
use stencil_ir::Span;
use thiserror::Error;

/// What went wrong.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Error)]
pub enum LexErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated code block")]
    UnterminatedCode,
    #[error("unterminated raw block")]
    UnterminatedRaw,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("unterminated front matter")]
    UnterminatedFrontMatter,
    #[error("invalid escape sequence `\\{escape}`")]
    InvalidEscape { escape: char },
    #[error("template source exceeds {} bytes", u32::MAX)]
    SourceTooLarge,
}

/// A lexer failure and where it happened.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Error)]
#[error("{kind} at {span:?}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        LexError { kind, span }
    }

    pub fn code(&self) -> ErrorCode {
        match self.kind {
            LexErrorKind::UnterminatedString => ErrorCode::E0001,
            LexErrorKind::UnterminatedCode => ErrorCode::E0002,
            LexErrorKind::UnterminatedRaw => ErrorCode::E0003,
            LexErrorKind::UnterminatedComment => ErrorCode::E0004,
            LexErrorKind::InvalidEscape { .. } => ErrorCode::E0005,
            LexErrorKind::UnterminatedFrontMatter => ErrorCode::E0006,
            LexErrorKind::SourceTooLarge => ErrorCode::E0007,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let label = match self.kind {
            LexErrorKind::UnterminatedString => "string starts here",
            LexErrorKind::UnterminatedCode => "code block opened here",
            LexErrorKind::UnterminatedRaw => "raw block opened here",
            LexErrorKind::UnterminatedComment => "comment starts here",
            LexErrorKind::UnterminatedFrontMatter => "front matter opened here",
            LexErrorKind::InvalidEscape { .. } => "invalid escape",
            LexErrorKind::SourceTooLarge => "source too large",
        };
        Diagnostic::error(self.code())
            .with_message(self.kind.to_string())
            .with_label(self.span, label)
    }
}
