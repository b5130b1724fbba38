//! Property-based tests for the BUILD file formatter.
//!
//! - Formatting is a fixed point: format(parse(format(d))) == format(d)
//! - Documents built from rules survive a parse of their rendering unchanged
//! - Hand-written string literals render exactly as written

use gazel_buildfile::{BuildFile, Stmt, format, parse};
use gazel_types::{Rule, RuleKind};
use proptest::prelude::*;

fn arb_text() -> impl Strategy<Value = String> {
    prop::string::string_regex(r#"[a-zA-Z0-9_./:@ "'\\\t\n\x07\x1b-]{0,12}"#).unwrap()
}

/// String literals as a human might write them, escapes included.
fn arb_literal() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "a", "Z", " ", "'", "\\\\", "\\\"", "\\n", "\\t", "\\x41", "\\101", "\\u00e9",
            "\\a", "\\d", "\\x07",
        ]),
        0..6,
    )
    .prop_map(|parts| format!("\"{}\"", parts.concat()))
}

fn arb_rule() -> impl Strategy<Value = Rule> {
    (
        prop::sample::select(RuleKind::ALL.to_vec()),
        arb_text(),
        prop::collection::vec(arb_text(), 0..4),
        prop::option::of(arb_text()),
        prop::option::of(0i64..1000),
    )
        .prop_map(|(kind, name, srcs, library, shard)| {
            let mut rule = Rule::new(kind, name).with_attr("srcs", srcs);
            if let Some(library) = library {
                rule = rule.with_attr("library", library);
            }
            if let Some(shard) = shard {
                rule = rule.with_attr("shard_count", shard);
            }
            rule
        })
}

fn arb_comment() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"# [a-z ]{0,10}[a-z]")
        .unwrap()
}

fn arb_document() -> impl Strategy<Value = BuildFile> {
    prop::collection::vec(
        prop_oneof![
            arb_rule().prop_map(|rule| Stmt::from(&rule)),
            prop::collection::vec(arb_comment(), 1..3).prop_map(Stmt::Comment),
        ],
        0..6,
    )
    .prop_map(|stmts| BuildFile {
        path: "BUILD".to_string(),
        stmts,
    })
}

proptest! {
    #[test]
    fn format_is_a_fixed_point(doc in arb_document()) {
        let first = format(&doc);
        let reparsed = parse("BUILD", first.as_bytes()).expect("formatted output parses");
        prop_assert_eq!(format(&reparsed), first);
    }

    #[test]
    fn hand_written_string_literals_render_as_written(literal in arb_literal()) {
        let src = format!("genrule(\n    name = \"x\",\n    cmd = {literal},\n)\n");
        let doc = parse("BUILD", src.as_bytes()).expect("literal parses");
        prop_assert_eq!(format(&doc), src);
    }

    #[test]
    fn rule_documents_survive_rendering(rules in prop::collection::vec(arb_rule(), 0..5)) {
        let doc = BuildFile {
            path: "BUILD".to_string(),
            stmts: rules.iter().map(Stmt::from).collect(),
        };
        let reparsed = parse("BUILD", format(&doc).as_bytes()).expect("formatted output parses");
        prop_assert_eq!(reparsed, doc);
    }
}
