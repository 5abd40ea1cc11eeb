//! Template lexer.
//!
//! Splits template source into literal text, delimiters and code tokens.
//! The lexer is a small mode machine:
//!
//! - **Text**: scan for the next opening delimiter (`{{`, native `{%{`,
//!   Liquid `{%`) and emit the literal text before it.
//! - **Code**: emit code tokens until the matching exit delimiter.
//!   Whitespace, comments and strings are scanned by hand; everything else
//!   goes through the `logos` recognizer in [`raw_token`].
//!
//! `ScriptMode::ScriptOnly` starts (and stays) in code; `ScriptMode::FrontMatter`
//! lexes an optional leading `+++` block as code before switching to text.
//!
//! The lexer is a lazy iterator of `Result<Token, LexError>`. It can be
//! cloned to look ahead and [`reset`](Lexer::reset) to start over.

mod cook;
mod lex_error;
mod raw_token;

use stencil_ir::{Dialect, ScriptMode, Span, Token, TokenFlags, TokenKind, TokenList};

pub use cook::{cook_float, cook_int, cook_string, EscapeError, IntLiteral};
pub use lex_error::{LexError, LexErrorKind};

/// Lexer configuration.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct LexOptions {
    pub dialect: Dialect,
    pub mode: ScriptMode,
    /// Emit whitespace and comment tokens inside code.
    pub keep_trivia: bool,
}

impl LexOptions {
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
}

/// Where a code span ends.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum CodeKind {
    /// `{{ … }}`
    Output,
    /// Liquid `{% … %}`
    Tag,
    /// Whole input, no exit.
    Script,
    /// `+++` on its own line.
    FrontMatter,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum State {
    Start,
    Text,
    Code(CodeKind),
    Done,
}

/// Lazy, restartable template lexer.
#[derive(Clone, Debug)]
pub struct Lexer<'src> {
    source: &'src str,
    options: LexOptions,
    state: State,
    pos: usize,
    line: u32,
    column: u32,
    /// Span of the delimiter that opened the current code block.
    code_open: Span,
    /// Open `{` inside the current code block; `}}` only exits at zero.
    brace_depth: u32,
    /// Whitespace or a comment was skipped since the last code token.
    space_before: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, options: LexOptions) -> Self {
        Lexer {
            source,
            options,
            state: State::Start,
            pos: 0,
            line: 1,
            column: 1,
            code_open: Span::DUMMY,
            brace_depth: 0,
            space_before: false,
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn options(&self) -> LexOptions {
        self.options
    }

    /// Rewind to the start of the source.
    pub fn reset(&mut self) {
        *self = Lexer::new(self.source, self.options);
    }

    fn rest(&self) -> &'src str {
        self.source.get(self.pos..).unwrap_or("")
    }

    fn is_liquid(&self) -> bool {
        self.options.dialect == Dialect::Liquid
    }

    /// Build a token for `len` bytes at the current position and advance.
    fn make(&mut self, kind: TokenKind, len: usize, flags: TokenFlags) -> Token {
        let start = self.pos;
        let end = (start + len).min(self.source.len());
        let token = Token::new(kind, Span::from_range(start..end), self.line, self.column)
            .with_flags(flags);
        let source = self.source;
        for c in source[start..end].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos = end;
        token
    }

    /// Produce the next token, including trivia.
    fn scan(&mut self) -> Result<Option<Token>, LexError> {
        loop {
            match self.state {
                State::Done => return Ok(None),
                State::Start => {
                    if self.source.len() > u32::MAX as usize {
                        self.state = State::Done;
                        return Err(LexError::new(LexErrorKind::SourceTooLarge, Span::DUMMY));
                    }
                    match self.options.mode {
                        ScriptMode::ScriptOnly => self.state = State::Code(CodeKind::Script),
                        ScriptMode::FrontMatter => {
                            if let Some(len) = front_matter_marker(self.rest()) {
                                let token = self.make(
                                    TokenKind::FrontMatterMarker,
                                    len,
                                    TokenFlags::empty(),
                                );
                                self.enter_code(CodeKind::FrontMatter, token.span);
                                return Ok(Some(token));
                            }
                            self.state = State::Text;
                        }
                        ScriptMode::Default => self.state = State::Text,
                    }
                }
                State::Text => return self.scan_text().map(Some),
                State::Code(kind) => return self.scan_code(kind).map(Some),
            }
        }
    }

    fn enter_code(&mut self, kind: CodeKind, open: Span) {
        self.state = State::Code(kind);
        self.code_open = open;
        self.brace_depth = 0;
        self.space_before = false;
    }

    fn eof(&mut self) -> Token {
        self.state = State::Done;
        self.make(TokenKind::Eof, 0, TokenFlags::empty())
    }

    // Text

    fn scan_text(&mut self) -> Result<Token, LexError> {
        if self.pos >= self.source.len() {
            return Ok(self.eof());
        }
        let delimiter = self.find_delimiter();
        if delimiter > self.pos {
            return Ok(self.make(TokenKind::Text, delimiter - self.pos, TokenFlags::empty()));
        }
        self.scan_delimiter()
    }

    /// Byte offset of the next opening delimiter, or the end of input.
    fn find_delimiter(&self) -> usize {
        let bytes = self.source.as_bytes();
        let mut from = self.pos;
        while let Some(offset) = self.source.get(from..).and_then(|s| s.find('{')) {
            let at = from + offset;
            match bytes.get(at + 1) {
                Some(b'{') => return at,
                Some(b'%') if self.is_liquid() || bytes.get(at + 2) == Some(&b'{') => return at,
                _ => {}
            }
            from = at + 1;
        }
        self.source.len()
    }

    fn scan_delimiter(&mut self) -> Result<Token, LexError> {
        let rest = self.rest();
        if rest.starts_with("{{") {
            let (len, flags) = if rest.starts_with("{{-") {
                (3, TokenFlags::TRIM_LEFT)
            } else {
                (2, TokenFlags::empty())
            };
            let token = self.make(TokenKind::CodeEnter, len, flags);
            self.enter_code(CodeKind::Output, token.span);
            return Ok(token);
        }

        if !self.is_liquid() {
            // `{%{ … }%}`
            let Some(close) = rest.get(3..).and_then(|s| s.find("}%}")) else {
                return Err(self.unterminated(LexErrorKind::UnterminatedRaw, 3));
            };
            return Ok(self.make(TokenKind::Raw, close + 6, TokenFlags::empty()));
        }

        let trim_open = rest.starts_with("{%-");
        let open_len = if trim_open { 3 } else { 2 };
        let mut flags = if trim_open {
            TokenFlags::TRIM_LEFT
        } else {
            TokenFlags::empty()
        };

        if let Some((word, tag_len)) = block_tag(rest) {
            let (kind, end_word, error) = match word {
                "raw" => (TokenKind::Raw, "endraw", LexErrorKind::UnterminatedRaw),
                _ => (
                    TokenKind::Comment,
                    "endcomment",
                    LexErrorKind::UnterminatedComment,
                ),
            };
            let Some((close_end, trim_close)) = find_end_tag(rest, tag_len, end_word) else {
                return Err(self.unterminated(error, tag_len));
            };
            if trim_close {
                flags |= TokenFlags::TRIM_RIGHT;
            }
            return Ok(self.make(kind, close_end, flags));
        }

        let token = self.make(TokenKind::TagEnter, open_len, flags);
        self.enter_code(CodeKind::Tag, token.span);
        Ok(token)
    }

    fn unterminated(&mut self, kind: LexErrorKind, open_len: usize) -> LexError {
        self.state = State::Done;
        let end = (self.pos + open_len).min(self.source.len());
        LexError::new(kind, Span::from_range(self.pos..end))
    }

    // Code

    fn code_flags(&mut self) -> TokenFlags {
        if std::mem::take(&mut self.space_before) {
            TokenFlags::SPACE_BEFORE
        } else {
            TokenFlags::empty()
        }
    }

    fn scan_code(&mut self, kind: CodeKind) -> Result<Token, LexError> {
        let rest = self.rest();
        let Some(c) = rest.chars().next() else {
            return match kind {
                CodeKind::Script => Ok(self.eof()),
                CodeKind::FrontMatter => {
                    Err(self.unclosed_code(LexErrorKind::UnterminatedFrontMatter))
                }
                CodeKind::Output | CodeKind::Tag => {
                    Err(self.unclosed_code(LexErrorKind::UnterminatedCode))
                }
            };
        };

        if kind == CodeKind::FrontMatter && self.at_line_start() {
            if let Some(len) = front_matter_marker(rest) {
                self.state = State::Text;
                let flags = self.code_flags();
                return Ok(self.make(TokenKind::FrontMatterMarker, len, flags));
            }
        }

        // Whitespace; newlines separate statements except inside Liquid tags.
        let newline_is_space =
            self.is_liquid() && matches!(kind, CodeKind::Output | CodeKind::Tag);
        let bytes = rest.as_bytes();
        let mut ws_len = 0;
        while let Some(&b) = bytes.get(ws_len) {
            let is_space = match b {
                b' ' | b'\t' => true,
                b'\r' => newline_is_space || bytes.get(ws_len + 1) != Some(&b'\n'),
                b'\n' => newline_is_space,
                _ => false,
            };
            if !is_space {
                break;
            }
            ws_len += 1;
        }
        if ws_len > 0 {
            self.space_before = true;
            return Ok(self.make(TokenKind::Whitespace, ws_len, TokenFlags::empty()));
        }
        if c == '\n' || rest.starts_with("\r\n") {
            let len = if c == '\n' { 1 } else { 2 };
            let flags = self.code_flags();
            let token = self.make(TokenKind::Newline, len, flags);
            self.space_before = true;
            return Ok(token);
        }

        if let Some(token) = self.scan_exit(kind, rest) {
            return Ok(token);
        }

        match c {
            '#' => self.scan_comment(kind, rest),
            '"' | '\'' => self.scan_string(rest, c),
            _ => {
                let flags = self.code_flags();
                match raw_token::next_code_token(rest) {
                    Some((token_kind, len)) => {
                        match token_kind {
                            TokenKind::LBrace => self.brace_depth += 1,
                            TokenKind::RBrace => {
                                self.brace_depth = self.brace_depth.saturating_sub(1);
                            }
                            _ => {}
                        }
                        Ok(self.make(token_kind, len, flags))
                    }
                    None => Ok(self.make(TokenKind::Error, c.len_utf8(), flags)),
                }
            }
        }
    }

    fn unclosed_code(&mut self, kind: LexErrorKind) -> LexError {
        self.state = State::Done;
        LexError::new(kind, self.code_open)
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0 || self.source.as_bytes().get(self.pos - 1) == Some(&b'\n')
    }

    fn scan_exit(&mut self, kind: CodeKind, rest: &str) -> Option<Token> {
        let (token_kind, plain) = match kind {
            CodeKind::Output if self.brace_depth == 0 => (TokenKind::CodeExit, "}}"),
            CodeKind::Tag => (TokenKind::TagExit, "%}"),
            _ => return None,
        };
        let (len, mut flags) = if rest.starts_with('-') && rest[1..].starts_with(plain) {
            (3, TokenFlags::TRIM_RIGHT)
        } else if rest.starts_with(plain) {
            (2, TokenFlags::empty())
        } else {
            return None;
        };
        flags |= self.code_flags();
        self.state = State::Text;
        Some(self.make(token_kind, len, flags))
    }

    /// `# …` to end of line or code exit, `## … ##` block.
    fn scan_comment(&mut self, kind: CodeKind, rest: &str) -> Result<Token, LexError> {
        self.space_before = true;
        if let Some(body) = rest.strip_prefix("##") {
            let Some(close) = body.find("##") else {
                return Err(self.unterminated(LexErrorKind::UnterminatedComment, 2));
            };
            return Ok(self.make(TokenKind::Comment, close + 4, TokenFlags::empty()));
        }

        let mut end = rest.find(['\n', '\r']).unwrap_or(rest.len());
        let exit = match kind {
            CodeKind::Output => Some("}}"),
            CodeKind::Tag => Some("%}"),
            CodeKind::Script | CodeKind::FrontMatter => None,
        };
        if let Some(exit_at) = exit.and_then(|exit| rest[..end].find(exit)) {
            end = if exit_at > 1 && rest.as_bytes()[exit_at - 1] == b'-' {
                exit_at - 1
            } else {
                exit_at
            };
        }
        Ok(self.make(TokenKind::Comment, end, TokenFlags::empty()))
    }

    fn scan_string(&mut self, rest: &str, quote: char) -> Result<Token, LexError> {
        let mut escaped = false;
        let mut close = None;
        for (i, c) in rest.char_indices().skip(1) {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                close = Some(i);
                break;
            }
        }
        let Some(close) = close else {
            return Err(self.unterminated(LexErrorKind::UnterminatedString, 1));
        };
        let len = close + 1;
        if let Err(err) = cook_string(&rest[..len]) {
            self.state = State::Done;
            let start = self.pos + err.offset;
            let end = (start + err.len).min(self.pos + len);
            return Err(LexError::new(
                LexErrorKind::InvalidEscape { escape: err.escape },
                Span::from_range(start..end),
            ));
        }
        let flags = self.code_flags();
        Ok(self.make(TokenKind::String, len, flags))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.scan() {
                Ok(Some(token)) if token.kind.is_trivia() && !self.options.keep_trivia => {
                    // Liquid comment blocks in text position keep their trim markers.
                    if token.kind == TokenKind::Comment && !token.flags.is_empty() {
                        return Some(Ok(token));
                    }
                }
                Ok(Some(token)) => return Some(Ok(token)),
                Ok(None) => return None,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

/// Lex the whole source, stopping at the first `LexError`.
#[tracing::instrument(level = "debug", skip(source), fields(len = source.len()))]
pub fn lex(source: &str, options: LexOptions) -> Result<TokenList, LexError> {
    let tokens = Lexer::new(source, options).collect::<Result<TokenList, LexError>>()?;
    tracing::debug!(tokens = tokens.len(), "lexed template");
    Ok(tokens)
}

/// Content of a `Raw` token without its delimiters.
pub fn raw_block_content(text: &str, dialect: Dialect) -> &str {
    match dialect {
        Dialect::Native => text
            .strip_prefix("{%{")
            .and_then(|s| s.strip_suffix("}%}"))
            .unwrap_or(text),
        Dialect::Liquid => {
            let start = text.find("%}").map_or(0, |i| i + 2);
            let end = text.rfind("{%").unwrap_or(text.len());
            text.get(start..end.max(start)).unwrap_or("")
        }
    }
}

/// Length of a `+++` marker line (trailing newline included).
fn front_matter_marker(rest: &str) -> Option<usize> {
    let line_end = rest.find('\n').map_or(rest.len(), |i| i + 1);
    let line = &rest[..line_end];
    (line.trim() == "+++").then_some(line_end)
}

/// Liquid `{% raw %}` / `{% comment %}` opening tag: the word and the tag length.
fn block_tag(rest: &str) -> Option<(&'static str, usize)> {
    let (word, len) = simple_tag(rest)?;
    match word {
        "raw" => Some(("raw", len)),
        "comment" => Some(("comment", len)),
        _ => None,
    }
}

/// Parse `{%-? word -?%}` at the start of `text`; returns the word, the tag
/// length and whether the closing delimiter trims.
fn simple_tag_with_trim(text: &str) -> Option<(&str, usize, bool)> {
    let after_open = text.strip_prefix("{%")?;
    let after_open = after_open.strip_prefix('-').unwrap_or(after_open);
    let body = after_open.trim_start_matches([' ', '\t', '\r', '\n']);
    let word_len = body
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    let word = &body[..word_len];
    let tail = body[word_len..].trim_start_matches([' ', '\t', '\r', '\n']);
    let (trim, close_len) = if tail.starts_with("-%}") {
        (true, 3)
    } else if tail.starts_with("%}") {
        (false, 2)
    } else {
        return None;
    };
    let len = text.len() - tail.len() + close_len;
    Some((word, len, trim))
}

fn simple_tag(text: &str) -> Option<(&str, usize)> {
    simple_tag_with_trim(text).map(|(word, len, _)| (word, len))
}

/// Find `{% end_word %}` after `from`; returns the offset just past it and
/// whether its closing delimiter trims.
fn find_end_tag(text: &str, from: usize, end_word: &str) -> Option<(usize, bool)> {
    let mut search = from;
    while let Some(offset) = text.get(search..).and_then(|s| s.find("{%")) {
        let at = search + offset;
        if let Some((word, len, trim)) = simple_tag_with_trim(&text[at..]) {
            if word == end_word {
                return Some((at + len, trim));
            }
        }
        search = at + 2;
    }
    None
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
