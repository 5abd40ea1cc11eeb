//! Template structure: text runs, code spans and statement blocks.
//!
//! A block is a run of items (text, raw blocks, statements) that ends at a
//! block word (`else`, `else if`/`elsif`, `when`, `end`/`end*`) or at the end
//! of input. Code delimiters are plain separators here, which is what lets a
//! native `{{ if x }}` open a block that spans several code regions.

mod expr;
mod liquid;
mod stmt;

use stencil_diagnostic::{Diagnostic, ErrorCode};
use stencil_ir::{ExprId, ExprKind, Span, StmtId, StmtKind, StmtRange, TokenKind};
use stencil_lexer::raw_block_content;
use stencil_stack::ensure_sufficient_stack;

use crate::error::describe_token;
use crate::recovery::{synchronize, CODE_EXIT, STMT_END, STMT_RECOVERY};
use crate::{ErrorContext, ParseError, Parser};

/// A word that closes or continues the enclosing block.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum BlockWord {
    Else,
    ElseIf,
    When,
    End,
}

impl BlockWord {
    fn spelling(self) -> &'static str {
        match self {
            BlockWord::Else => "else",
            BlockWord::ElseIf => "else if",
            BlockWord::When => "when",
            BlockWord::End => "end",
        }
    }
}

/// Liquid closing tags the block loop stops at.
const LIQUID_END_TAGS: &[&str] = &[
    "endif",
    "endunless",
    "endfor",
    "endcase",
    "endcapture",
    "endwhile",
    "endwith",
    "endfunc",
];

/// Liquid closing tag for a block keyword.
fn liquid_end_tag(keyword: &str) -> &'static str {
    match keyword {
        "unless" => "endunless",
        "for" => "endfor",
        "case" => "endcase",
        "capture" => "endcapture",
        "while" => "endwhile",
        "with" => "endwith",
        "func" => "endfunc",
        _ => "endif",
    }
}

impl Parser<'_> {
    pub(crate) fn parse_template_body(&mut self) -> (Option<StmtRange>, StmtRange) {
        let front_matter = if self.cursor.check(TokenKind::FrontMatterMarker) {
            self.cursor.advance();
            let outer = self.script;
            self.script = true;
            let block = self.parse_top_level(true);
            self.script = outer;
            self.cursor.eat(TokenKind::FrontMatterMarker);
            Some(block)
        } else {
            None
        };
        let body = self.parse_top_level(false);
        (front_matter, body)
    }

    /// Statements up to the end of input (or the closing `+++`), reporting
    /// block words that have no block to close.
    fn parse_top_level(&mut self, in_front_matter: bool) -> StmtRange {
        let mut items = Vec::new();
        loop {
            self.parse_block_items(&mut items);
            match self.cursor.current_kind() {
                TokenKind::Eof => break,
                TokenKind::FrontMatterMarker if in_front_matter => break,
                TokenKind::FrontMatterMarker => {
                    self.cursor.advance();
                }
                _ => self.skip_stray_block_word(),
            }
        }
        self.finish_block(items)
    }

    /// Items up to the next block word or end of input.
    pub(crate) fn parse_block(&mut self) -> StmtRange {
        ensure_sufficient_stack(|| {
            let mut items = Vec::new();
            self.parse_block_items(&mut items);
            self.finish_block(items)
        })
    }

    fn parse_block_items(&mut self, items: &mut Vec<StmtId>) {
        loop {
            let before = self.cursor.position();
            match self.cursor.current_kind() {
                TokenKind::Eof | TokenKind::FrontMatterMarker => return,
                TokenKind::Text => {
                    if let Some(id) = self.parse_text() {
                        items.push(id);
                    }
                    continue;
                }
                TokenKind::Raw => {
                    items.push(self.parse_raw());
                    continue;
                }
                TokenKind::Comment => {
                    self.cursor.advance();
                    continue;
                }
                _ => {}
            }
            if self.block_word().is_some() {
                return;
            }
            if self.native_rules() {
                self.parse_native_item(items);
            } else {
                self.parse_liquid_item(items);
            }
            if self.cursor.position() == before {
                self.cursor.advance();
            }
        }
    }

    fn finish_block(&mut self, items: Vec<StmtId>) -> StmtRange {
        self.check_unreachable(&items);
        self.arena.alloc_stmt_list(items)
    }

    /// Warn once per block about the first statement after `break`,
    /// `continue` or `ret`. Text is exempt: layout whitespace after a
    /// `{{ break }}` is normal.
    fn check_unreachable(&mut self, items: &[StmtId]) {
        let mut terminated = false;
        for &id in items {
            let stmt = self.arena.stmt(id);
            let silent = matches!(
                stmt.kind,
                StmtKind::Text(_) | StmtKind::Raw(_) | StmtKind::Error
            );
            if terminated && !silent {
                let span = stmt.span;
                self.diagnostics.push(
                    Diagnostic::warning(ErrorCode::W1001)
                        .with_message("unreachable statement")
                        .with_label(span, "this statement never runs"),
                );
                return;
            }
            terminated |= stmt.kind.is_terminator();
        }
    }

    /// Literal text, trimmed by neighbouring trim markers.
    fn parse_text(&mut self) -> Option<StmtId> {
        let position = self.cursor.position();
        let token = self.cursor.advance();
        let mut text = self.cursor.text(&token);
        let mut span = token.span;

        let trim_start = position
            .checked_sub(1)
            .and_then(|i| self.cursor.token_at(i))
            .is_some_and(|t| t.trims_right());
        let trim_end = self
            .cursor
            .token_at(position + 1)
            .is_some_and(|t| t.trims_left());

        if trim_start {
            let trimmed = text.trim_start();
            span.start += u32::try_from(text.len() - trimmed.len()).unwrap_or(0);
            text = trimmed;
        }
        if trim_end {
            let trimmed = text.trim_end();
            span.end -= u32::try_from(text.len() - trimmed.len()).unwrap_or(0);
            text = trimmed;
        }
        if text.is_empty() {
            return None;
        }
        let name = self.arena.intern(text);
        Some(self.alloc_stmt(StmtKind::Text(name), span))
    }

    fn parse_raw(&mut self) -> StmtId {
        let token = self.cursor.advance();
        let content = raw_block_content(self.cursor.text(&token), self.dialect);
        let name = self.arena.intern(content);
        self.alloc_stmt(StmtKind::Raw(name), token.span)
    }

    /// The block word at the cursor, if any.
    pub(crate) fn block_word(&self) -> Option<BlockWord> {
        if self.native_rules() {
            return match self.cursor.current_kind() {
                TokenKind::End => Some(BlockWord::End),
                TokenKind::When => Some(BlockWord::When),
                TokenKind::Else if self.cursor.peek_kind(1) == TokenKind::If => {
                    Some(BlockWord::ElseIf)
                }
                TokenKind::Else => Some(BlockWord::Else),
                _ => None,
            };
        }

        if !self.cursor.check(TokenKind::TagEnter) {
            return None;
        }
        let word = self.cursor.peek(1);
        match word.kind {
            TokenKind::Else => Some(BlockWord::Else),
            TokenKind::When => Some(BlockWord::When),
            TokenKind::End => Some(BlockWord::End),
            TokenKind::Ident => {
                let text = self.cursor.text(&word);
                if text == "elsif" {
                    Some(BlockWord::ElseIf)
                } else if LIQUID_END_TAGS.contains(&text) {
                    Some(BlockWord::End)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Consume the tokens of a block word (not the tag exit).
    pub(crate) fn eat_block_word(&mut self, word: BlockWord) {
        self.cursor.advance();
        if word == BlockWord::ElseIf || !self.native_rules() {
            self.cursor.advance();
        }
    }

    /// Close a block opened by `keyword` at `open`, reporting a missing end.
    pub(crate) fn expect_block_end(&mut self, keyword: &'static str, open: Span) {
        if self.native_rules() {
            if !self.cursor.eat(TokenKind::End) {
                let at = self.cursor.current_span();
                self.report(ParseError::missing_end(open, at, keyword, "end"));
            }
            return;
        }

        let end_tag = liquid_end_tag(keyword);
        let word = self.cursor.peek(1);
        let closes = self.cursor.check(TokenKind::TagEnter)
            && (word.kind == TokenKind::End
                || (word.kind == TokenKind::Ident && self.cursor.text(&word) == end_tag));
        if closes {
            self.cursor.advance();
            self.cursor.advance();
            self.finish_header();
        } else {
            let at = self.cursor.current_span();
            self.report(ParseError::missing_end(open, at, keyword, end_tag));
        }
    }

    /// End of a statement header: a statement boundary in native code, the
    /// tag exit in Liquid.
    pub(crate) fn finish_header(&mut self) {
        if self.native_rules() {
            if !STMT_END.contains(self.cursor.current_kind()) {
                let err = self.unexpected("end of statement");
                self.report(err);
                synchronize(&mut self.cursor, STMT_END);
            }
        } else if !self.cursor.eat(TokenKind::TagExit) {
            let err = self.unexpected("`%}`");
            self.report(err);
            self.recover_tag();
        }
    }

    /// After a complete native statement.
    pub(crate) fn expect_statement_end(&mut self) {
        if STMT_END.contains(self.cursor.current_kind()) || self.block_word().is_some() {
            return;
        }
        let err = self.unexpected("end of statement");
        self.report(err);
        synchronize(&mut self.cursor, STMT_RECOVERY);
    }

    /// Skip to and past the exit of the current Liquid tag or output.
    pub(crate) fn recover_tag(&mut self) {
        synchronize(&mut self.cursor, CODE_EXIT);
        if matches!(
            self.cursor.current_kind(),
            TokenKind::CodeExit | TokenKind::TagExit
        ) {
            self.cursor.advance();
        }
    }

    /// An `else`/`end`/`when` with no block to belong to.
    fn skip_stray_block_word(&mut self) {
        let Some(word) = self.block_word() else {
            self.cursor.advance();
            return;
        };
        let start = self.cursor.current_span();
        let spelling = if self.native_rules() {
            word.spelling()
        } else {
            self.cursor.text(&self.cursor.peek(1))
        };
        let message = format!("`{spelling}` without a matching block");
        self.eat_block_word(word);
        if self.native_rules() {
            synchronize(&mut self.cursor, STMT_END);
        } else {
            self.recover_tag();
        }
        let span = self.span_from(start);
        self.report(
            ParseError::new(ErrorCode::E1007, message, span).with_label("nothing to close here"),
        );
    }

    /// "Expected X" error for the current token. Invalid characters get
    /// their own code.
    pub(crate) fn unexpected(&self, expected: &str) -> ParseError {
        let found = self.cursor.current();
        if found.kind == TokenKind::Error {
            return ParseError::new(
                ErrorCode::E1009,
                format!("invalid character {}", describe_token(found, self.cursor.source())),
                found.span,
            );
        }
        ParseError::unexpected(found, expected, self.cursor.source())
    }

    /// Placeholder statement covering whatever a failed production consumed.
    pub(crate) fn error_stmt(&mut self, start: Span) -> StmtId {
        let span = self.span_from(start);
        self.alloc_stmt(StmtKind::Error, span)
    }

    /// Header expression of a block statement. Errors are reported here so
    /// the block body still parses.
    pub(crate) fn parse_header_expr(&mut self, context: ErrorContext) -> ExprId {
        let start = self.cursor.current_span();
        match self.parse_expr() {
            Ok(id) => id,
            Err(err) => {
                self.report(err.with_context(context));
                let recovery = if self.native_rules() { STMT_RECOVERY } else { CODE_EXIT };
                synchronize(&mut self.cursor, recovery);
                let span = self.span_from(start);
                self.alloc_expr(ExprKind::Error, span)
            }
        }
    }
}
