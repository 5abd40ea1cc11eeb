use pretty_assertions::assert_eq;
use proptest::prelude::*;
use stencil_diagnostic::ErrorCode;
use stencil_ir::{
    CallStyle, ElseBranch, ExprId, ExprKind, ScriptMode, StmtId, StmtKind, StmtRange,
    TemplateArena,
};

use super::*;

// Compact s-expression dump of the AST, for structural assertions.

fn dump_block(arena: &TemplateArena, range: StmtRange) -> String {
    let items: Vec<String> = arena
        .stmt_list(range)
        .iter()
        .map(|&id| dump_stmt(arena, id))
        .collect();
    format!("[{}]", items.join(" "))
}

fn dump_stmt(arena: &TemplateArena, id: StmtId) -> String {
    let e = |id: ExprId| dump_expr(arena, id);
    let b = |range: StmtRange| dump_block(arena, range);
    match &arena.stmt(id).kind {
        StmtKind::Text(t) => format!("{:?}", arena.name(*t)),
        StmtKind::Raw(t) => format!("raw({:?})", arena.name(*t)),
        StmtKind::Output(x) => format!("out({})", e(*x)),
        StmtKind::Assign { target, value } => format!("(= {} {})", e(*target), e(*value)),
        StmtKind::If {
            cond,
            then_block,
            else_branch,
        } => {
            let tail = match else_branch {
                ElseBranch::None => String::new(),
                ElseBranch::ElseIf(nested) => format!(" {}", dump_stmt(arena, *nested)),
                ElseBranch::Block(block) => format!(" else {}", b(*block)),
            };
            format!("(if {} {}{tail})", e(*cond), b(*then_block))
        }
        StmtKind::For(f) => {
            let mut out = format!("(for {} in {}", arena.name(f.var), e(f.iterable));
            if let Some(limit) = f.limit {
                out += &format!(" limit={}", e(limit));
            }
            if let Some(offset) = f.offset {
                out += &format!(" offset={}", e(offset));
            }
            if f.reversed {
                out += " reversed";
            }
            out += &format!(" {}", b(f.body));
            if let Some(else_block) = f.else_block {
                out += &format!(" else {}", b(else_block));
            }
            out + ")"
        }
        StmtKind::While { cond, body } => format!("(while {} {})", e(*cond), b(*body)),
        StmtKind::With { target, body } => format!("(with {} {})", e(*target), b(*body)),
        StmtKind::Case {
            subject,
            whens,
            else_block,
        } => {
            let mut out = format!("(case {}", e(*subject));
            for when in arena.whens(*whens) {
                let values: Vec<String> =
                    arena.expr_list(when.values).iter().map(|&v| e(v)).collect();
                out += &format!(" (when {} {})", values.join(" "), b(when.body));
            }
            if let Some(else_block) = else_block {
                out += &format!(" else {}", b(*else_block));
            }
            out + ")"
        }
        StmtKind::Capture { target, body } => format!("(capture {} {})", e(*target), b(*body)),
        StmtKind::FuncDef { name, params, body } => {
            let params: Vec<&str> = arena.name_list(*params).iter().map(|&p| arena.name(p)).collect();
            format!("(func {}({}) {})", arena.name(*name), params.join(", "), b(*body))
        }
        StmtKind::Break => "break".to_string(),
        StmtKind::Continue => "continue".to_string(),
        StmtKind::Return(None) => "ret".to_string(),
        StmtKind::Return(Some(x)) => format!("(ret {})", e(*x)),
        StmtKind::Import(x) => format!("(import {})", e(*x)),
        StmtKind::Include(x) => format!("(include {})", e(*x)),
        StmtKind::Error => "error".to_string(),
    }
}

fn dump_expr(arena: &TemplateArena, id: ExprId) -> String {
    let e = |id: ExprId| dump_expr(arena, id);
    let list = |range| -> Vec<String> { arena.expr_list(range).iter().map(|&x| e(x)).collect() };
    match &arena.expr(id).kind {
        ExprKind::Null => "null".to_string(),
        ExprKind::Bool(v) => v.to_string(),
        ExprKind::Int(v) => v.to_string(),
        ExprKind::BigInt(v) => format!("{v}n"),
        ExprKind::Float(bits) => format!("{:?}", f64::from_bits(*bits)),
        ExprKind::String(s) => format!("{:?}", arena.name(*s)),
        ExprKind::Ident(n) => arena.name(*n).to_string(),
        ExprKind::Member { receiver, name } => format!("{}.{}", e(*receiver), arena.name(*name)),
        ExprKind::Index { receiver, index } => format!("{}[{}]", e(*receiver), e(*index)),
        ExprKind::Unary { op, operand } => format!("({}{})", op.as_symbol(), e(*operand)),
        ExprKind::Binary { op, left, right } => {
            format!("({} {} {})", op.as_symbol(), e(*left), e(*right))
        }
        ExprKind::Call {
            callee,
            args,
            style: CallStyle::Paren,
        } => format!("{}({})", e(*callee), list(*args).join(", ")),
        ExprKind::Call {
            callee,
            args,
            style: CallStyle::Pipe,
        } => format!("(pipe {} {})", e(*callee), list(*args).join(" ")),
        ExprKind::Range {
            start,
            end,
            inclusive,
        } => {
            let op = if *inclusive { ".." } else { "..<" };
            format!("({op} {} {})", e(*start), e(*end))
        }
        ExprKind::Array(items) => format!("[{}]", list(*items).join(", ")),
        ExprKind::Object(entries) => {
            let entries: Vec<String> = arena
                .entries(*entries)
                .iter()
                .map(|entry| format!("{}: {}", arena.name(entry.key), e(entry.value)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        ExprKind::Lambda { params, body } => {
            let params: Vec<&str> = arena.name_list(*params).iter().map(|&p| arena.name(p)).collect();
            format!("(fn ({}) {})", params.join(", "), e(*body))
        }
        ExprKind::Error => "error".to_string(),
    }
}

fn body(result: &ParseResult) -> String {
    dump_block(&result.template.arena, result.template.body)
}

fn codes(result: &ParseResult) -> Vec<ErrorCode> {
    result.diagnostics.iter().map(|d| d.code).collect()
}

fn native(source: &str) -> ParseResult {
    parse(source, ParseOptions::default())
}

fn liquid(source: &str) -> ParseResult {
    parse(source, ParseOptions::default().with_dialect(Dialect::Liquid))
}

/// Parse and require a clean result.
fn clean(result: ParseResult) -> String {
    assert_eq!(codes(&result), vec![], "{:?}", result.diagnostics);
    body(&result)
}

// Structure

#[test]
fn text_and_output() {
    assert_eq!(
        clean(native("This is a {{ text }} World!")),
        r#"["This is a " out(text) " World!"]"#
    );
}

#[test]
fn trim_markers_strip_adjacent_whitespace() {
    let result = native("a \n{{- x -}}\n b");
    let stmts = result.template.arena.stmt_list(result.template.body).to_vec();
    assert_eq!(clean(result.clone()), r#"["a" out(x) "b"]"#);
    let last = result.template.arena.stmt(stmts[2]);
    assert_eq!(last.span.text(result.template.source()), Some("b"));
}

#[test]
fn whitespace_only_text_trimmed_away() {
    assert_eq!(clean(native("{{ a -}}  \n  {{- b }}")), "[out(a) out(b)]");
}

#[test]
fn raw_blocks() {
    assert_eq!(
        clean(native("a{%{ {{x}} }%}b")),
        r#"["a" raw(" {{x}} ") "b"]"#
    );
    assert_eq!(
        clean(liquid("{% raw %}{{ x }}{% endraw %}")),
        r#"[raw("{{ x }}")]"#
    );
}

#[test]
fn multiple_statements_in_one_code_span() {
    assert_eq!(
        clean(native("{{ x = 1; y = 2\nx + y }}")),
        "[(= x 1) (= y 2) out((+ x y))]"
    );
}

// Native statements

#[test]
fn if_else_if_chain() {
    assert_eq!(
        clean(native("{{ if a }}A{{ else if b }}B{{ else }}C{{ end }}")),
        r#"[(if a ["A"] (if b ["B"] else ["C"]))]"#
    );
}

#[test]
fn for_loop_with_parameters_and_else() {
    assert_eq!(
        clean(native(
            "{{ for x in items limit: 2 offset: 1 reversed }}{{ x }}{{ else }}none{{ end }}"
        )),
        r#"[(for x in items limit=2 offset=1 reversed [out(x)] else ["none"])]"#
    );
}

#[test]
fn loop_companion_object() {
    assert_eq!(
        clean(native("{{ for x in xs }}{{ for.index }}{{ end }}")),
        "[(for x in xs [out(for.index)])]"
    );
}

#[test]
fn case_skips_layout_before_first_when() {
    assert_eq!(
        clean(native(
            "{{ case x }}\n  {{ when 1, 2 }}one{{ when 3 }}three{{ else }}other{{ end }}"
        )),
        r#"[(case x (when 1 2 ["one"]) (when 3 ["three"]) else ["other"])]"#
    );
}

#[test]
fn case_with_content_before_when() {
    let result = native("{{ case x }}oops{{ when 1 }}{{ end }}");
    assert_eq!(codes(&result), vec![ErrorCode::E1001]);
}

#[test]
fn while_with_capture_import_include() {
    assert_eq!(
        clean(native(
            "{{ while i < 3; i = i + 1; end }}{{ with page }}{{ title }}{{ end }}{{ capture c }}x{{ end }}{{ import obj; include 'part' }}"
        )),
        r#"[(while (< i 3) [(= i (+ i 1))]) (with page [out(title)]) (capture c ["x"]) (import obj) (include "part")]"#
    );
}

#[test]
fn function_definition() {
    assert_eq!(
        clean(native("{{ func add(a, b) }}{{ ret a + b }}{{ end }}{{ func hello }}hi{{ end }}")),
        r#"[(func add(a, b) [(ret (+ a b))]) (func hello() ["hi"])]"#
    );
}

#[test]
fn break_continue_and_bare_ret() {
    assert_eq!(
        clean(native("{{ for x in xs; if x; continue; end; break; end; ret }}")),
        "[(for x in xs [(if x [continue]) break]) ret]"
    );
}

#[test]
fn assignment_targets() {
    assert_eq!(clean(native("{{ x.y[0] = 1 }}")), "[(= x.y[0] 1)]");

    let result = native("{{ 1 = 2 }}");
    assert_eq!(codes(&result), vec![ErrorCode::E1006]);
    assert_eq!(body(&result), "[error]");
}

// Expressions

#[test]
fn operator_precedence() {
    assert_eq!(
        clean(native("{{ 1 + 2 * 3 == 7 && !done || not x }}")),
        "[out((|| (&& (== (+ 1 (* 2 3)) 7) (!done)) (!x)))]"
    );
    assert_eq!(
        clean(native("{{ a - b - c; x // 2 % 3 }}")),
        "[out((- (- a b) c)) out((% (// x 2) 3))]"
    );
}

#[test]
fn ranges() {
    assert_eq!(
        clean(native("{{ 1..3; 0..<n + 1 }}")),
        "[out((.. 1 3)) out((..< 0 (+ n 1)))]"
    );
}

#[test]
fn literals() {
    assert_eq!(
        clean(native(r#"{{ [1, 2.5, "s\n", 'q', true, null, nil, 99999999999999999999] }}"#)),
        r#"[out([1, 2.5, "s\n", "q", true, null, null, 99999999999999999999n])]"#
    );
}

#[test]
fn collections_span_lines() {
    assert_eq!(
        clean(native("{{ {a: 1, \"b c\": [1,\n 2,], end: {}} }}")),
        "[out({a: 1, b c: [1, 2], end: {}})]"
    );
}

#[test]
fn keyword_member_names() {
    assert_eq!(clean(native("{{ page.end; x.for }}")), "[out(page.end) out(x.for)]");
}

#[test]
fn native_pipes() {
    assert_eq!(
        clean(native(r#"{{ name | string.upcase | append "!" 1 }}"#)),
        r#"[out((pipe append (pipe string.upcase name) "!" 1))]"#
    );
    assert_eq!(clean(native("{{ x | f(1) 2 }}")), "[out((pipe f x 1 2))]");
}

#[test]
fn pipe_arguments_stop_at_named_parameters() {
    assert_eq!(
        clean(native("{{ for x in items | sort limit: 2 }}{{ end }}")),
        "[(for x in (pipe sort items) limit=2 [])]"
    );
}

#[test]
fn liquid_filters() {
    assert_eq!(
        clean(liquid(r#"{{ name | append: "!", 1 | upcase }}"#)),
        r#"[out((pipe upcase (pipe append name "!" 1)))]"#
    );
}

#[test]
fn paren_call_requires_adjacency() {
    assert_eq!(clean(native("{{ f(1, 2) }}")), "[out(f(1, 2))]");
    let spaced = native("{{ f (1) }}");
    assert_eq!(codes(&spaced), vec![ErrorCode::E1001]);
    assert_eq!(body(&spaced), "[out(f)]");
}

#[test]
fn lambdas() {
    assert_eq!(
        clean(native("{{ xs | map fn(x) => x * 2 }}")),
        "[out((pipe map xs (fn (x) (* x 2))))]"
    );
}

// Liquid

#[test]
fn liquid_for_loop() {
    assert_eq!(
        clean(liquid("{% for p in products %}{{p.name}}{% endfor %}")),
        "[(for p in products [out(p.name)])]"
    );
}

#[test]
fn liquid_if_elsif_else() {
    assert_eq!(
        clean(liquid("{% if a %}A{% elsif b %}B{% else %}C{% endif %}")),
        r#"[(if a ["A"] (if b ["B"] else ["C"]))]"#
    );
}

#[test]
fn liquid_unless_negates() {
    assert_eq!(
        clean(liquid("{% unless a %}x{% endunless %}")),
        r#"[(if (!a) ["x"])]"#
    );
}

#[test]
fn liquid_case_with_or() {
    assert_eq!(
        clean(liquid(
            "{% case x %}\n  {% when 1 or 2 %}one{% else %}other{% endcase %}"
        )),
        r#"[(case x (when 1 2 ["one"]) else ["other"])]"#
    );
}

#[test]
fn liquid_assign_capture_and_extensions() {
    assert_eq!(
        clean(liquid(
            "{% assign x = 1 %}{% capture y %}v{% endcapture %}{% while x < 2 %}{% assign x = x + 1 %}{% endwhile %}{% func f(a) %}{% ret a %}{% endfunc %}"
        )),
        r#"[(= x 1) (capture y ["v"]) (while (< x 2) [(= x (+ x 1))]) (func f(a) [(ret a)])]"#
    );
}

#[test]
fn liquid_comments_trim() {
    assert_eq!(
        clean(liquid("a {%- comment -%} x {%- endcomment -%} b")),
        r#"["a" "b"]"#
    );
    assert_eq!(clean(liquid("a{% # note %}b")), r#"["a" "b"]"#);
}

#[test]
fn liquid_tags_span_lines() {
    assert_eq!(
        clean(liquid("{%- if a\n and b -%}\n  x\n{%- endif -%}")),
        r#"[(if (&& a b) ["x"])]"#
    );
}

// Modes

#[test]
fn front_matter_block() {
    let source = "+++\ntitle = 'Hi'\n+++\n{{ title }}";
    for dialect in [Dialect::Native, Dialect::Liquid] {
        let result = parse(
            source,
            ParseOptions::default()
                .with_dialect(dialect)
                .with_mode(ScriptMode::FrontMatter),
        );
        assert_eq!(codes(&result), vec![]);
        let front = result.template.front_matter.unwrap();
        assert_eq!(
            dump_block(&result.template.arena, front),
            r#"[(= title "Hi")]"#
        );
        assert_eq!(body(&result), "[out(title)]");
    }
}

#[test]
fn script_only_mode() {
    let result = parse(
        "x = 1\nif x\n  'yes'\nend",
        ParseOptions::default().with_mode(ScriptMode::ScriptOnly),
    );
    assert_eq!(clean(result), r#"[(= x 1) (if x [out("yes")])]"#);
}

#[test]
fn trivia_is_kept_for_tools_only() {
    let result = parse("{{ x # note\n}}", ParseOptions::default().with_trivia(true));
    assert!(result.tokens.iter().any(|t| t.kind == stencil_ir::TokenKind::Comment));
    assert_eq!(clean(result), "[out(x)]");
}

// Diagnostics and recovery

#[test]
fn missing_end_keeps_block() {
    let result = native("{{ if a }}x");
    assert_eq!(codes(&result), vec![ErrorCode::E1005]);
    assert_eq!(body(&result), r#"[(if a ["x"])]"#);
}

#[test]
fn stray_end() {
    let result = native("x{{ end }}y");
    assert_eq!(codes(&result), vec![ErrorCode::E1007]);
    assert_eq!(body(&result), r#"["x" "y"]"#);
}

#[test]
fn liquid_mismatched_end_tag() {
    let result = liquid("{% if a %}x{% endfor %}");
    assert_eq!(codes(&result), vec![ErrorCode::E1005, ErrorCode::E1007]);
}

#[test]
fn unknown_liquid_tag() {
    let result = liquid("{% frobnicate x %}after");
    assert_eq!(codes(&result), vec![ErrorCode::E1008]);
    assert_eq!(body(&result), r#"[error "after"]"#);
}

#[test]
fn invalid_character() {
    let result = native("{{ a @ b }}c");
    assert_eq!(codes(&result), vec![ErrorCode::E1009]);
    assert_eq!(body(&result), r#"[out(a) "c"]"#);
}

#[test]
fn recovery_continues_after_error() {
    let result = native("{{ x = }}{{ y }}");
    assert_eq!(codes(&result), vec![ErrorCode::E1002]);
    assert_eq!(body(&result), "[error out(y)]");
    assert!(result.has_errors());
}

#[test]
fn unclosed_delimiter() {
    let result = native("{{ f(1, 2 }}");
    assert_eq!(codes(&result), vec![ErrorCode::E1003]);
    let diag = &result.diagnostics[0];
    assert_eq!(diag.labels.len(), 2);
}

#[test]
fn header_error_still_parses_body() {
    let result = native("{{ if }}x{{ end }}");
    assert_eq!(codes(&result), vec![ErrorCode::E1002]);
    assert_eq!(body(&result), r#"[(if error ["x"])]"#);
}

#[test]
fn unreachable_statement_warning() {
    let result = native("{{ for x in xs }}{{ break }}\n{{ x }}{{ end }}");
    assert_eq!(codes(&result), vec![ErrorCode::W1001]);
    assert!(!result.has_errors());
    assert_eq!(result.warnings().count(), 1);
}

#[test]
fn lex_error_yields_empty_template() {
    let result = native("{{ \"abc }}");
    assert_eq!(codes(&result), vec![ErrorCode::E0001]);
    assert_eq!(body(&result), "[]");
    assert!(result.tokens.is_empty());
}

#[test]
fn deep_nesting_does_not_overflow() {
    let depth = 5_000;
    let source = format!("{{{{ {}1{} }}}}", "(".repeat(depth), ")".repeat(depth));
    let result = native(&source);
    assert_eq!(codes(&result), vec![]);
}

fn all_options() -> impl Strategy<Value = ParseOptions> {
    (
        prop_oneof![Just(Dialect::Native), Just(Dialect::Liquid)],
        prop_oneof![
            Just(ScriptMode::Default),
            Just(ScriptMode::ScriptOnly),
            Just(ScriptMode::FrontMatter)
        ],
    )
        .prop_map(|(dialect, mode)| ParseOptions::default().with_dialect(dialect).with_mode(mode))
}

proptest! {
    #[test]
    fn never_panics(source in "\\PC{0,80}", options in all_options()) {
        let _ = parse(&source, options);
    }

    #[test]
    fn spans_are_valid_boundaries(
        source in "[a-z0-9 {}%|.=+\\-()\\[\\],:\"'\n]{0,64}",
        options in all_options(),
    ) {
        let result = parse(&source, options);
        let arena = &result.template.arena;
        for expr in arena.all_exprs() {
            prop_assert!(expr.span.text(&source).is_some(), "{:?}", expr);
        }
        for stmt in arena.all_stmts() {
            prop_assert!(stmt.span.text(&source).is_some(), "{:?}", stmt);
        }
    }
}
