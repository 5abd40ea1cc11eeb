#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
//! Re-emission round trips.
//!
//! For every template in the corpus, in both target dialects:
//! 1. the output re-parses without errors,
//! 2. formatting the re-parsed template reproduces the output,
//! 3. converting there and back matches formatting in the source dialect.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use stencil_fmt::format_template;
use stencil_ir::{Dialect, ScriptMode};
use stencil_parse::{parse, ParseOptions, ParseResult};

const NATIVE_CORPUS: &[&str] = &[
    "This is a {{ text }} World!",
    "{{ for p in products }}{{ p.name }}{{ end }}",
    "{{ for x in 1..10 limit: 3 offset: 2 reversed }}{{ for.index }}{{ else }}empty{{ end }}",
    "{{ if user.admin && !user.locked }}admin{{ else if user }}user{{ else }}guest{{ end }}",
    "{{ case level }}{{ when 1, 2 }}low{{ when 3 }}mid{{ else }}high{{ end }}",
    "{{ x = 0 }}{{ while x < 5 }}{{ x = x + 1 }}{{ if x == 3 }}{{ continue }}{{ end }}{{ x }}{{ end }}",
    "{{ func greet(name) }}Hello {{ name | upcase }}{{ end }}{{ greet(\"bob\") }}",
    "{{ capture body }}<b>{{ title }}</b>{{ end }}{{ body | size }}",
    "{{ with page }}{{ title = \"x\" }}{{ end }}{{ import helpers }}{{ include \"footer\" }}",
    "{{ items | map (fn(i) => i.price * 1.5) | join \", \" }}",
    "{{ [1, 2, 3][0] + {a: {b: 2}}.a.b - -1 }}",
    "{{ (a || b) && c contains \"x\" }}",
    "{{ 7 // 2 }} {{ 7 / 2 }} {{ 7 % 2 }} {{ 1..<3 }}",
    "{%{ {{ not code }} }%} and {{ \"quote \\\" inside\" }}",
    "{{ func f }}{{ ret 1 }}{{ end }}{{ f() }}",
    "{{ a.b[c] = d | default 0 }}",
];

const LIQUID_CORPUS: &[&str] = &[
    "{% for p in products %}{{p.name}}{% endfor %}",
    "{% assign total = price | times: qty | plus: 1 %}{{ total }}",
    "{% if a and b %}both{% elsif a or b %}one{% else %}none{% endif %}",
    "{% unless done %}pending{% endunless %}",
    "{% case x %}{% when 1 or 2 %}small{% else %}big{% endcase %}",
    "{% capture greeting %}Hi {{ name | capitalize }}{% endcapture %}{{ greeting }}",
    "{% raw %}{{ literally }}{% endraw %}",
    "{% for i in (1..5) reversed %}{% if i == 3 %}{% break %}{% endif %}{{ i }}{% endfor %}",
    "{% comment %}gone{% endcomment %}{{ x | truncate: 5, \"...\" }}",
    "{%- echo x -%} {{- y -}}",
];

fn parse_clean(source: &str, dialect: Dialect) -> ParseResult {
    let result = parse(source, ParseOptions::default().with_dialect(dialect));
    assert!(
        !result.has_errors(),
        "{dialect} source {source:?} has errors: {:?}",
        result.diagnostics
    );
    result
}

fn reformat(source: &str, dialect: Dialect) -> String {
    let result = parse_clean(source, dialect);
    format_template(&result.template, dialect, ScriptMode::Default)
}

fn check_round_trip(source: &str, from: Dialect) {
    let original = parse_clean(source, from);
    let same = format_template(&original.template, from, ScriptMode::Default);
    for to in [Dialect::Native, Dialect::Liquid] {
        let output = format_template(&original.template, to, ScriptMode::Default);
        assert_eq!(reformat(&output, to), output, "unstable {to} output for {source:?}");
        let reparsed = parse_clean(&output, to);
        assert_eq!(
            reparsed.warnings().count(),
            original.warnings().count(),
            "{to} output for {source:?} changed warnings"
        );
        let back = format_template(&reparsed.template, from, ScriptMode::Default);
        assert_eq!(back, same, "{from} -> {to} -> {from} changed {source:?}");
    }
}

#[test]
fn native_corpus_round_trips() {
    for source in NATIVE_CORPUS {
        check_round_trip(source, Dialect::Native);
    }
}

#[test]
fn liquid_corpus_round_trips() {
    for source in LIQUID_CORPUS {
        check_round_trip(source, Dialect::Liquid);
    }
}

#[test]
fn liquid_loop_converts_to_native() {
    let result = parse_clean("{% for p in products %}{{p.name}}{% endfor %}", Dialect::Liquid);
    assert_eq!(
        format_template(&result.template, Dialect::Native, ScriptMode::Default),
        "{{ for p in products }}{{ p.name }}{{ end }}"
    );
}

fn source_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-e {}%|.=0-9\"+\\-\n:,()!]{0,40}").expect("valid regex")
}

proptest! {
    #[test]
    fn clean_native_sources_re_emit_cleanly(source in source_strategy()) {
        let result = parse(&source, ParseOptions::default());
        prop_assume!(!result.has_errors());
        for to in [Dialect::Native, Dialect::Liquid] {
            let output = format_template(&result.template, to, ScriptMode::Default);
            let reparsed = parse(&output, ParseOptions::default().with_dialect(to));
            prop_assert!(!reparsed.has_errors(), "{:?} -> {:?}", source, output);
            prop_assert_eq!(
                format_template(&reparsed.template, to, ScriptMode::Default),
                output
            );
        }
    }

    #[test]
    fn clean_liquid_sources_re_emit_cleanly(source in source_strategy()) {
        let result = parse(&source, ParseOptions::default().with_dialect(Dialect::Liquid));
        prop_assume!(!result.has_errors());
        for to in [Dialect::Native, Dialect::Liquid] {
            let output = format_template(&result.template, to, ScriptMode::Default);
            let reparsed = parse(&output, ParseOptions::default().with_dialect(to));
            prop_assert!(!reparsed.has_errors(), "{:?} -> {:?}", source, output);
        }
    }
}
