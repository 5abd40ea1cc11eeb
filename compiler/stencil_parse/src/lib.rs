//! Template parser.
//!
//! Recursive descent over the lexer's [`TokenList`], one production per
//! statement and expression kind. Both dialects share the AST vocabulary; the
//! Liquid tag grammar lives in its own module behind the dialect flag.
//!
//! The parser never gives up: a failing production becomes a [`Diagnostic`]
//! plus an `Error` placeholder node, and parsing resumes at the next
//! statement separator, code exit, block keyword or end of input. A
//! [`LexError`](stencil_lexer::LexError) is the only thing that stops it,
//! and that too surfaces as a diagnostic on an empty template.

mod cursor;
mod error;
mod grammar;
mod recovery;

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]
mod tests;

use std::sync::Arc;

use stencil_diagnostic::{Diagnostic, Severity};
use stencil_ir::{
    Dialect, Expr, ExprId, ExprKind, ScriptMode, Span, Stmt, StmtId, StmtKind,
    Template, TemplateArena, Token, TokenList,
};
use stencil_lexer::LexOptions;

pub use cursor::Cursor;
pub use error::{ErrorContext, ParseError};
pub use recovery::{synchronize, TokenSet};

/// Parser configuration.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ParseOptions {
    pub dialect: Dialect,
    pub mode: ScriptMode,
    /// Keep whitespace and comment tokens in [`ParseResult::tokens`].
    pub keep_trivia: bool,
}

impl ParseOptions {
    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ScriptMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_trivia(mut self, keep_trivia: bool) -> Self {
        self.keep_trivia = keep_trivia;
        self
    }

    pub fn lex_options(&self) -> LexOptions {
        LexOptions::default()
            .with_dialect(self.dialect)
            .with_mode(self.mode)
            .with_trivia(self.keep_trivia)
    }
}

/// Result of parsing: the template plus every diagnostic, in source order of
/// discovery.
#[derive(Clone, Debug)]
pub struct ParseResult {
    pub template: Template,
    pub diagnostics: Vec<Diagnostic>,
    /// The lexed tokens, trivia included when requested.
    pub tokens: TokenList,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

/// Parser state for one template.
pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    arena: TemplateArena,
    diagnostics: Vec<Diagnostic>,
    dialect: Dialect,
    /// Inside script-only input or front matter: native statement rules
    /// apply whatever the dialect.
    script: bool,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], source: &'a str, dialect: Dialect) -> Self {
        Parser {
            cursor: Cursor::new(tokens, source),
            arena: TemplateArena::new(),
            diagnostics: Vec::new(),
            dialect,
            script: false,
        }
    }

    /// Parse the whole token stream into a template over `source`.
    fn parse_template(mut self, mode: ScriptMode, source: Arc<str>) -> (Template, Vec<Diagnostic>) {
        self.script = mode == ScriptMode::ScriptOnly;
        let (front_matter, body) = self.parse_template_body();
        tracing::debug!(
            statements = self.arena.all_stmts().len(),
            diagnostics = self.diagnostics.len(),
            "parsed template"
        );
        let template = Template::new(self.arena, front_matter, body, self.dialect, source);
        (template, self.diagnostics)
    }

    fn report(&mut self, error: ParseError) {
        tracing::trace!(code = %error.code, span = ?error.span, "recovering from parse error");
        self.diagnostics.push(error.to_diagnostic());
    }

    /// Native statement rules are in force.
    fn native_rules(&self) -> bool {
        self.script || self.dialect == Dialect::Native
    }

    fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.alloc_expr(Expr::new(kind, span))
    }

    fn alloc_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        self.arena.alloc_stmt(Stmt::new(kind, span))
    }

    fn expr_span(&self, id: ExprId) -> Span {
        self.arena.expr(id).span
    }

    /// Span from `start` through the last consumed token.
    fn span_from(&self, start: Span) -> Span {
        let end = self.cursor.previous_span().end.max(start.start);
        Span::new(start.start, end)
    }
}

/// Parse template source.
///
/// Never panics. Lexing failures produce an empty template with a single
/// error diagnostic.
#[tracing::instrument(level = "debug", skip(source), fields(len = source.len()))]
pub fn parse(source: &str, options: ParseOptions) -> ParseResult {
    let shared: Arc<str> = Arc::from(source);
    let tokens = match stencil_lexer::lex(source, options.lex_options()) {
        Ok(tokens) => tokens,
        Err(err) => {
            tracing::debug!(error = %err, "lexing aborted");
            return ParseResult {
                template: Template::empty(options.dialect, shared),
                diagnostics: vec![err.to_diagnostic()],
                tokens: TokenList::new(),
            };
        }
    };

    // Trivia is for tools; the grammar only needs trim-flagged comments,
    // which stand in for the text they trim.
    let significant: TokenList = tokens
        .iter()
        .filter(|t| !t.kind.is_trivia() || t.trims_left() || t.trims_right())
        .copied()
        .collect();

    let parser = Parser::new(&significant, source, options.dialect);
    let (template, diagnostics) = parser.parse_template(options.mode, shared);
    ParseResult {
        template,
        diagnostics,
        tokens,
    }
}
