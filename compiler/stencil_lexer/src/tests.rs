use pretty_assertions::assert_eq;
use proptest::prelude::*;
use stencil_ir::{Dialect, ScriptMode, Span, TokenKind};

use super::*;

fn kinds(source: &str, options: LexOptions) -> Vec<TokenKind> {
    lex(source, options).unwrap().kinds()
}

fn native() -> LexOptions {
    LexOptions::default()
}

fn liquid() -> LexOptions {
    LexOptions::default().with_dialect(Dialect::Liquid)
}

#[test]
fn text_and_code() {
    let source = "This is a {{ text }} World!";
    let tokens = lex(source, native()).unwrap();
    assert_eq!(
        tokens.kinds(),
        vec![
            TokenKind::Text,
            TokenKind::CodeEnter,
            TokenKind::Ident,
            TokenKind::CodeExit,
            TokenKind::Text,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[0].text(source), "This is a ");
    assert_eq!(tokens[2].text(source), "text");
    assert!(tokens[2].has_space_before());
    assert_eq!(tokens[4].text(source), " World!");
    assert_eq!(tokens[5].span, Span::point(27));
}

#[test]
fn trim_markers() {
    let source = "a {{- x -}} b";
    let tokens = lex(source, native()).unwrap();
    assert!(tokens[1].trims_left());
    assert_eq!(tokens[1].text(source), "{{-");
    assert!(tokens[3].trims_right());
    assert_eq!(tokens[3].text(source), "-}}");
}

#[test]
fn liquid_tags() {
    assert_eq!(
        kinds("{% for p in products %}{{p.name}}{% endfor %}", liquid()),
        vec![
            TokenKind::TagEnter,
            TokenKind::For,
            TokenKind::Ident,
            TokenKind::In,
            TokenKind::Ident,
            TokenKind::TagExit,
            TokenKind::CodeEnter,
            TokenKind::Ident,
            TokenKind::Dot,
            TokenKind::Ident,
            TokenKind::CodeExit,
            TokenKind::TagEnter,
            TokenKind::Ident,
            TokenKind::TagExit,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn liquid_tag_trim_and_newlines() {
    let source = "{%- if a\n  and b -%}";
    let tokens = lex(source, liquid()).unwrap();
    assert_eq!(
        tokens.kinds(),
        vec![
            TokenKind::TagEnter,
            TokenKind::If,
            TokenKind::Ident,
            TokenKind::And,
            TokenKind::Ident,
            TokenKind::TagExit,
            TokenKind::Eof,
        ]
    );
    assert!(tokens[0].trims_left());
    assert!(tokens[5].trims_right());
}

#[test]
fn native_percent_is_text() {
    assert_eq!(
        kinds("100{% done", native()),
        vec![TokenKind::Text, TokenKind::Eof]
    );
}

#[test]
fn native_raw_block() {
    let source = "a{%{ {{x}} }%}b";
    let tokens = lex(source, native()).unwrap();
    assert_eq!(
        tokens.kinds(),
        vec![TokenKind::Text, TokenKind::Raw, TokenKind::Text, TokenKind::Eof]
    );
    assert_eq!(tokens[1].span, Span::new(1, 14));
    assert_eq!(
        raw_block_content(tokens[1].text(source), Dialect::Native),
        " {{x}} "
    );
}

#[test]
fn liquid_raw_block() {
    let source = "{% raw %}{{ x }}{% endraw %}!";
    let tokens = lex(source, liquid()).unwrap();
    assert_eq!(
        tokens.kinds(),
        vec![TokenKind::Raw, TokenKind::Text, TokenKind::Eof]
    );
    assert_eq!(
        raw_block_content(tokens[0].text(source), Dialect::Liquid),
        "{{ x }}"
    );
}

#[test]
fn comments_are_trivia() {
    assert_eq!(
        kinds("{{ x # note\n y }}", native()),
        vec![
            TokenKind::CodeEnter,
            TokenKind::Ident,
            TokenKind::Newline,
            TokenKind::Ident,
            TokenKind::CodeExit,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        kinds("{{ x # note -}}", native()),
        vec![
            TokenKind::CodeEnter,
            TokenKind::Ident,
            TokenKind::CodeExit,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        kinds("{{ ## multi\nline ## x }}", native()),
        vec![
            TokenKind::CodeEnter,
            TokenKind::Ident,
            TokenKind::CodeExit,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn liquid_comment_blocks() {
    assert_eq!(
        kinds("a{% comment %}hidden {{ x }}{% endcomment %}b", liquid()),
        vec![TokenKind::Text, TokenKind::Text, TokenKind::Eof]
    );

    let tokens = lex("a {%- comment -%} x {%- endcomment -%} b", liquid()).unwrap();
    assert_eq!(
        tokens.kinds(),
        vec![
            TokenKind::Text,
            TokenKind::Comment,
            TokenKind::Text,
            TokenKind::Eof,
        ]
    );
    assert!(tokens[1].trims_left());
    assert!(tokens[1].trims_right());
}

#[test]
fn front_matter() {
    let source = "+++\nx = 1\n+++\nbody {{ x }}";
    let options = native().with_mode(ScriptMode::FrontMatter);
    let tokens = lex(source, options).unwrap();
    assert_eq!(
        tokens.kinds(),
        vec![
            TokenKind::FrontMatterMarker,
            TokenKind::Ident,
            TokenKind::Eq,
            TokenKind::Int,
            TokenKind::Newline,
            TokenKind::FrontMatterMarker,
            TokenKind::Text,
            TokenKind::CodeEnter,
            TokenKind::Ident,
            TokenKind::CodeExit,
            TokenKind::Eof,
        ]
    );
    assert_eq!(tokens[5].text(source), "+++\n");
    assert_eq!(tokens[6].text(source), "body ");
}

#[test]
fn front_matter_is_optional() {
    let options = native().with_mode(ScriptMode::FrontMatter);
    assert_eq!(
        kinds("no header", options),
        vec![TokenKind::Text, TokenKind::Eof]
    );
}

#[test]
fn script_only() {
    assert_eq!(
        kinds("x = 1; y", native().with_mode(ScriptMode::ScriptOnly)),
        vec![
            TokenKind::Ident,
            TokenKind::Eq,
            TokenKind::Int,
            TokenKind::Semicolon,
            TokenKind::Ident,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn nested_braces_do_not_close_code() {
    assert_eq!(
        kinds("{{ {a: {b: 1}} }}", native()),
        vec![
            TokenKind::CodeEnter,
            TokenKind::LBrace,
            TokenKind::Ident,
            TokenKind::Colon,
            TokenKind::LBrace,
            TokenKind::Ident,
            TokenKind::Colon,
            TokenKind::Int,
            TokenKind::RBrace,
            TokenKind::RBrace,
            TokenKind::CodeExit,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn space_before_flag() {
    let tokens = lex("{{f(x)}}{{f (x)}}", native()).unwrap();
    assert!(!tokens[2].has_space_before());
    let spaced = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::LParen)
        .map(|t| t.has_space_before())
        .collect::<Vec<_>>();
    assert_eq!(spaced, vec![false, true]);
}

#[test]
fn irregular_character_becomes_error_token() {
    let source = "{{ a @ b }}";
    let tokens = lex(source, native()).unwrap();
    assert_eq!(tokens[2].kind, TokenKind::Error);
    assert_eq!(tokens[2].span, Span::new(5, 6));
    assert_eq!(tokens[3].kind, TokenKind::Ident);
}

#[test]
fn line_and_column() {
    let tokens = lex("a\n{{ x }}", native()).unwrap();
    let x = tokens[2];
    assert_eq!(x.kind, TokenKind::Ident);
    assert_eq!((x.line, x.column), (2, 4));
}

#[test]
fn unterminated_string() {
    let err = lex("{{ \"abc }}", native()).unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    assert_eq!(err.span, Span::new(3, 4));
}

#[test]
fn unterminated_code() {
    let err = lex("hi {{ x ", native()).unwrap_err();
    assert_eq!(err.kind, LexErrorKind::UnterminatedCode);
    assert_eq!(err.span, Span::new(3, 5));
}

#[test]
fn unterminated_blocks() {
    let raw = lex("a {%{ raw", native()).unwrap_err();
    assert_eq!(raw.kind, LexErrorKind::UnterminatedRaw);
    assert_eq!(raw.span, Span::new(2, 5));

    let comment = lex("{{ ## x }}", native()).unwrap_err();
    assert_eq!(comment.kind, LexErrorKind::UnterminatedComment);

    let liquid_raw = lex("{% raw %} x", liquid()).unwrap_err();
    assert_eq!(liquid_raw.kind, LexErrorKind::UnterminatedRaw);

    let front = lex("+++\nx = 1\n", native().with_mode(ScriptMode::FrontMatter)).unwrap_err();
    assert_eq!(front.kind, LexErrorKind::UnterminatedFrontMatter);
    assert_eq!(front.span, Span::new(0, 4));
}

#[test]
fn invalid_escape() {
    let err = lex(r#"{{ "a\qb" }}"#, native()).unwrap_err();
    assert_eq!(err.kind, LexErrorKind::InvalidEscape { escape: 'q' });
    assert_eq!(err.span, Span::new(5, 7));
    assert_eq!(err.code(), stencil_diagnostic::ErrorCode::E0005);
    assert!(err.to_diagnostic().is_error());
}

#[test]
fn lexer_stops_after_error() {
    let mut lexer = Lexer::new("{{ 'x", native());
    assert!(matches!(lexer.next(), Some(Ok(_))));
    assert!(matches!(lexer.next(), Some(Err(_))));
    assert!(lexer.next().is_none());
}

#[test]
fn clone_and_reset() {
    let mut lexer = Lexer::new("a {{ b }}", native());
    let first = lexer.next().unwrap().unwrap();
    let lookahead = lexer.clone().next().unwrap().unwrap();
    let second = lexer.next().unwrap().unwrap();
    assert_eq!(lookahead, second);

    lexer.reset();
    assert_eq!(lexer.next().unwrap().unwrap(), first);
}

#[test]
fn trivia_retention() {
    let source = "{{ x # c\n}}";
    let tokens = lex(source, native().with_trivia(true)).unwrap();
    assert_eq!(
        tokens.kinds(),
        vec![
            TokenKind::CodeEnter,
            TokenKind::Whitespace,
            TokenKind::Ident,
            TokenKind::Whitespace,
            TokenKind::Comment,
            TokenKind::Newline,
            TokenKind::CodeExit,
            TokenKind::Eof,
        ]
    );
    assert!(tokens.iter().all(|t| !t.trims_left()));
}

fn all_options() -> impl Strategy<Value = LexOptions> {
    (
        prop_oneof![Just(Dialect::Native), Just(Dialect::Liquid)],
        prop_oneof![
            Just(ScriptMode::Default),
            Just(ScriptMode::ScriptOnly),
            Just(ScriptMode::FrontMatter)
        ],
    )
        .prop_map(|(dialect, mode)| {
            LexOptions::default()
                .with_dialect(dialect)
                .with_mode(mode)
                .with_trivia(true)
        })
}

proptest! {
    #[test]
    fn tokens_cover_source(
        source in "[a-z {}%#+\\-\"'\n|.=0-9é]{0,48}",
        options in all_options(),
    ) {
        if let Ok(tokens) = lex(&source, options) {
            let rebuilt: String = tokens.iter().map(|t| t.text(&source)).collect();
            prop_assert_eq!(rebuilt, source.clone());
            prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        }
    }

    #[test]
    fn never_panics(source in "\\PC{0,64}", options in all_options()) {
        let _ = lex(&source, options);
    }
}
