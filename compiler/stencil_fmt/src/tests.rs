use pretty_assertions::assert_eq;
use stencil_ir::{Dialect, ScriptMode, StmtKind};
use stencil_parse::{parse, ParseOptions, ParseResult};

use super::*;

fn parse_in(source: &str, dialect: Dialect, mode: ScriptMode) -> ParseResult {
    let result = parse(
        source,
        ParseOptions::default().with_dialect(dialect).with_mode(mode),
    );
    assert!(
        !result.has_errors(),
        "{source:?} failed to parse: {:?}",
        result.diagnostics
    );
    result
}

/// Parse `source` as `from`, write it as `to`, and check the output parses
/// cleanly and formats to itself.
fn convert_in(source: &str, from: Dialect, to: Dialect, mode: ScriptMode) -> String {
    let first = parse_in(source, from, mode);
    let output = format_template(&first.template, to, mode);
    let second = parse_in(&output, to, mode);
    assert_eq!(
        format_template(&second.template, to, mode),
        output,
        "formatting is not stable"
    );
    output
}

fn convert(source: &str, from: Dialect, to: Dialect) -> String {
    convert_in(source, from, to, ScriptMode::Default)
}

fn native(source: &str) -> String {
    convert(source, Dialect::Native, Dialect::Native)
}

fn liquid(source: &str) -> String {
    convert(source, Dialect::Liquid, Dialect::Liquid)
}

// Text and outputs

#[test]
fn text_and_outputs() {
    assert_eq!(native("Hello {{ name }}!"), "Hello {{ name }}!");
    assert_eq!(native("{{x+1}}"), "{{ x + 1 }}");
    assert_eq!(liquid("a {{x}} b"), "a {{ x }} b");
}

#[test]
fn trims_are_applied_to_text() {
    assert_eq!(native("a  {{- x -}}  b"), "a{{ x }}b");
    assert_eq!(liquid("a \n{%- assign x = 1 -%}\n b"), "a{% assign x = 1 %}b");
}

#[test]
fn several_statements_split_into_spans() {
    assert_eq!(native("{{ x = 1; y = 2\n x }}"), "{{ x = 1 }}{{ y = 2 }}{{ x }}");
}

// Statements

#[test]
fn if_chains() {
    let source = "{{ if a }}A{{ else if b }}B{{ else }}C{{ end }}";
    assert_eq!(native(source), source);
    assert_eq!(
        liquid("{% if a %}A{% elsif b %}B{% else %}C{% endif %}"),
        "{% if a %}A{% elsif b %}B{% else %}C{% endif %}"
    );
    assert_eq!(
        convert(
            "{% if a %}A{% elsif b %}B{% else %}C{% endif %}",
            Dialect::Liquid,
            Dialect::Native
        ),
        source
    );
}

#[test]
fn unless_becomes_negated_if() {
    assert_eq!(
        convert("{% unless a %}x{% endunless %}", Dialect::Liquid, Dialect::Native),
        "{{ if !a }}x{{ end }}"
    );
}

#[test]
fn for_loops() {
    let source = "{{ for x in items limit: 2 offset: 1 reversed }}{{ x }}{{ else }}none{{ end }}";
    assert_eq!(native(source), source);
    assert_eq!(
        liquid("{% for x in items limit:2 %}{{ x }}{% endfor %}"),
        "{% for x in items limit: 2 %}{{ x }}{% endfor %}"
    );
}

#[test]
fn piped_iterable_keeps_its_parameters_apart() {
    assert_eq!(
        native("{{ for x in (items | sort) reversed }}{{ x }}{{ end }}"),
        "{{ for x in (items | sort) reversed }}{{ x }}{{ end }}"
    );
    assert_eq!(
        native("{{ for x in items | sort }}{{ x }}{{ end }}"),
        "{{ for x in items | sort }}{{ x }}{{ end }}"
    );
}

#[test]
fn case_blocks() {
    assert_eq!(
        native("{{ case x }}\n  {{ when 1, 2 }}one{{ else }}other{{ end }}"),
        "{{ case x }}{{ when 1, 2 }}one{{ else }}other{{ end }}"
    );
    assert_eq!(
        liquid("{% case x %}\n{% when 1 or 2 %}a{% endcase %}"),
        "{% case x %}{% when 1, 2 %}a{% endcase %}"
    );
    assert_eq!(
        native("{{ case x }}{{ when (a || b) }}y{{ end }}"),
        "{{ case x }}{{ when (a || b) }}y{{ end }}"
    );
}

#[test]
fn extension_statements_in_both_dialects() {
    let source = "{{ x = 1 }}{{ while x < 3 }}{{ x = x + 1 }}{{ end }}\
                  {{ with obj }}{{ y = 2 }}{{ end }}\
                  {{ capture out }}hi{{ end }}\
                  {{ func add(a, b) }}{{ ret a + b }}{{ end }}\
                  {{ import lib }}{{ include \"p\" }}";
    assert_eq!(native(source), source);
    assert_eq!(
        convert(source, Dialect::Native, Dialect::Liquid),
        "{% assign x = 1 %}{% while x < 3 %}{% assign x = x + 1 %}{% endwhile %}\
         {% with obj %}{% assign y = 2 %}{% endwith %}\
         {% capture out %}hi{% endcapture %}\
         {% func add(a, b) %}{% ret a + b %}{% endfunc %}\
         {% import lib %}{% include \"p\" %}"
    );
}

#[test]
fn functions_without_parameters_get_parentheses() {
    assert_eq!(native("{{ func f }}x{{ end }}"), "{{ func f() }}x{{ end }}");
}

#[test]
fn loop_control() {
    let source = "{{ for x in xs }}{{ if x }}{{ break }}{{ end }}{{ continue }}{{ end }}{{ ret }}";
    assert_eq!(native(source), source);
}

#[test]
fn echo_is_an_output() {
    assert_eq!(liquid("{% echo x | upcase %}"), "{{ x | upcase }}");
}

// Expressions

#[test]
fn precedence_drives_parentheses() {
    for source in [
        "{{ (a + b) * c }}",
        "{{ a + b * c }}",
        "{{ a - (b - c) }}",
        "{{ -(a + b) }}",
        "{{ !(a && b) }}",
        "{{ a || b && c }}",
        "{{ (a || b) && c }}",
        "{{ a - -b }}",
        "{{ (1..2)..3 }}",
        "{{ a == (b == c) }}",
        "{{ (a + b).c }}",
    ] {
        assert_eq!(native(source), source);
    }
    assert_eq!(native("{{ (a - b) - c }}"), "{{ a - b - c }}");
    assert_eq!(native("{{ ((x)) }}"), "{{ x }}");
    assert_eq!(native("{{ - -x }}"), "{{ -(-x) }}");
}

#[test]
fn logical_operators_use_words_in_liquid() {
    assert_eq!(
        convert("{{ a && !b || c }}", Dialect::Native, Dialect::Liquid),
        "{{ a and not b or c }}"
    );
    assert_eq!(
        convert("{{ a and not b }}", Dialect::Liquid, Dialect::Native),
        "{{ a && !b }}"
    );
}

#[test]
fn literals() {
    let source = r#"{{ [1, 2.5, "a\n", true, null, {a: 1, "b c": 2}, 1e100] }}"#;
    assert_eq!(native(source), source);
    assert_eq!(
        convert("{{ null }}", Dialect::Native, Dialect::Liquid),
        "{{ nil }}"
    );
    assert_eq!(native("{{ 'it\\'s' }}"), r#"{{ "it's" }}"#);
    assert_eq!(native("{{ 99999999999999999999 }}"), "{{ 99999999999999999999 }}");
}

#[test]
fn native_pipes() {
    assert_eq!(native("{{ x | f 1 (a + b) | g }}"), "{{ x | f 1 (a + b) | g }}");
    assert_eq!(native("{{ x | f(1, 2) }}"), "{{ x | f 1 2 }}");
    assert_eq!(native("{{ (x | f) + 1 }}"), "{{ (x | f) + 1 }}");
    assert_eq!(native("{{ x | fns[0] 1 }}"), "{{ x | fns[0] 1 }}");
    assert_eq!(native("{{ x | f -1 }}"), "{{ x | f (-1) }}");
    assert_eq!(native("{{ x | f g(1) }}"), "{{ x | f g(1) }}");
}

#[test]
fn liquid_filters() {
    assert_eq!(liquid("{{ x | plus: 1, y | upcase }}"), "{{ x | plus: 1, y | upcase }}");
    assert_eq!(
        convert("{{ x | plus: 1, y | upcase }}", Dialect::Liquid, Dialect::Native),
        "{{ x | plus 1 y | upcase }}"
    );
    assert_eq!(
        convert("{{ x | f (a + b) }}", Dialect::Native, Dialect::Liquid),
        "{{ x | f: a + b }}"
    );
}

#[test]
fn liquid_cannot_pipe_into_arbitrary_callees() {
    assert_eq!(
        convert("{{ x | fns[0] 1 }}", Dialect::Native, Dialect::Liquid),
        "{{ fns[0](x, 1) }}"
    );
}

#[test]
fn lambdas_are_parenthesized_as_operands() {
    assert_eq!(
        native("{{ map(items, fn(x) => x * 2) }}"),
        "{{ map(items, fn(x) => x * 2) }}"
    );
    assert_eq!(
        native("{{ items | map (fn(x) => x * 2) }}"),
        "{{ items | map (fn(x) => x * 2) }}"
    );
    assert_eq!(
        native("{{ (fn(x) => x)(1) }}"),
        "{{ (fn(x) => x)(1) }}"
    );
}

#[test]
fn keyword_members_and_keys() {
    assert_eq!(native("{{ a.end + for.index }}"), "{{ a.end + for.index }}");
    assert_eq!(native("{{ {if: 1} }}"), "{{ {if: 1} }}");
}

// Text escaping

#[test]
fn raw_blocks_convert_between_dialects() {
    assert_eq!(
        convert("{% raw %}{{ x }}{% endraw %}", Dialect::Liquid, Dialect::Native),
        "{%{{{ x }}}%}"
    );
    assert_eq!(
        convert("{%{ {{ x }} }%}", Dialect::Native, Dialect::Liquid),
        "{% raw %} {{ x }} {% endraw %}"
    );
}

#[test]
fn raw_content_that_cannot_be_a_raw_block_is_escaped() {
    assert_eq!(
        liquid("{% raw %}{% if %}{% endraw %}"),
        "{% raw %}{{% endraw %}% if %}"
    );
    assert_eq!(
        convert("{% raw %}a{{% endraw %}", Dialect::Liquid, Dialect::Native),
        "{%{a{}%}"
    );
}

#[test]
fn trailing_brace_before_code_is_escaped() {
    assert_eq!(native("{{ a }}{"), "{{ a }}{%{{}%}");
    assert_eq!(native("a{%b"), "a{%{{}%}%b");
}

// Modes

#[test]
fn front_matter() {
    let output = convert_in(
        "+++\nx = 1\nif a\n  b = 2\nend\n+++\n{{ x }}",
        Dialect::Native,
        Dialect::Native,
        ScriptMode::FrontMatter,
    );
    assert_eq!(output, "+++\nx = 1\nif a\n  b = 2\nend\n+++\n{{ x }}");
}

#[test]
fn liquid_front_matter_uses_native_statements() {
    let output = convert_in(
        "+++\nx = a | f 1\n+++\n{{ x | g: 2 }}",
        Dialect::Liquid,
        Dialect::Liquid,
        ScriptMode::FrontMatter,
    );
    assert_eq!(output, "+++\nx = a | f 1\n+++\n{{ x | g: 2 }}");
}

#[test]
fn front_matter_is_inlined_outside_its_mode() {
    let result = parse_in("+++\nx = 1\n+++\n{{ x }}", Dialect::Native, ScriptMode::FrontMatter);
    assert_eq!(
        format_template(&result.template, Dialect::Native, ScriptMode::Default),
        "{{ x = 1 }}{{ x }}"
    );
}

#[test]
fn body_text_that_looks_like_a_marker_is_guarded() {
    let result = parse_in("+++\nhello", Dialect::Native, ScriptMode::Default);
    let output = format_template(&result.template, Dialect::Native, ScriptMode::FrontMatter);
    assert_eq!(output, "{%{+}%}++\nhello");
    let reparsed = parse_in(&output, Dialect::Native, ScriptMode::FrontMatter);
    assert!(reparsed.template.front_matter.is_none());
}

#[test]
fn script_only() {
    let output = convert_in(
        "if a\n  'x'\nelse\n  y = 1\nend",
        Dialect::Native,
        Dialect::Native,
        ScriptMode::ScriptOnly,
    );
    assert_eq!(output, "if a\n  \"x\"\nelse\n  y = 1\nend\n");
}

#[test]
fn text_in_script_layout_becomes_a_string_output() {
    let result = parse_in("a{{ x }}", Dialect::Native, ScriptMode::Default);
    assert_eq!(
        format_template(&result.template, Dialect::Native, ScriptMode::ScriptOnly),
        "\"a\"\nx\n"
    );
}

#[test]
fn format_single_expression() {
    let result = parse_in("{{ a.b[c] | f: 1 }}", Dialect::Liquid, ScriptMode::Default);
    let arena = &result.template.arena;
    let &first = arena.stmt_list(result.template.body).first().unwrap();
    let StmtKind::Output(expr) = arena.stmt(first).kind else {
        panic!("expected an output");
    };
    assert_eq!(format_expr(arena, expr, Dialect::Liquid), "a.b[c] | f: 1");
    assert_eq!(format_expr(arena, expr, Dialect::Native), "a.b[c] | f 1");
}
