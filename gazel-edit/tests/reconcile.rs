//! Reconciliation of generated rules with hand-written BUILD content.

use gazel_buildfile::format;
use gazel_edit::{reconcile, reconcile_root};
use gazel_types::{Rule, RuleKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn strings(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn fresh_rules() -> Vec<Rule> {
    vec![
        Rule::new(RuleKind::Library, "go_default_library")
            .with_attr("srcs", strings(&["lib.go", "util.go"])),
        Rule::new(RuleKind::Test, "go_default_test")
            .with_attr("srcs", strings(&["lib_test.go"]))
            .with_attr("library", ":go_default_library"),
    ]
}

const EXISTING: &str = r#"# Package lib.

go_library(
    name = "go_default_library",
    srcs = ["lib.go"],
    visibility = ["//visibility:public"],
)

filegroup(
    name = "testdata",
    srcs = glob(["testdata/**"]),
)

go_binary(
    name = "stale",
    srcs = ["stale.go"],
)
"#;

#[test]
fn hand_written_rules_keep_their_position_and_generated_rules_are_replaced() {
    let doc = reconcile("lib/BUILD", Some(EXISTING.as_bytes()), &fresh_rules()).unwrap();
    assert_eq!(
        format(&doc),
        r#"# Package lib.

filegroup(
    name = "testdata",
    srcs = glob(["testdata/**"]),
)

go_library(
    name = "go_default_library",
    srcs = ["lib.go", "util.go"],
)

go_test(
    name = "go_default_test",
    srcs = ["lib_test.go"],
    library = ":go_default_library",
)
"#
    );
}

#[test]
fn reconcile_is_idempotent() {
    let once = format(&reconcile("BUILD", Some(EXISTING.as_bytes()), &fresh_rules()).unwrap());
    let twice = format(&reconcile("BUILD", Some(once.as_bytes()), &fresh_rules()).unwrap());
    assert_eq!(once, twice);
}

#[test]
fn reconcile_root_is_idempotent() {
    let once = format(
        &reconcile_root("BUILD", Some(EXISTING.as_bytes()), "example.com/repo", &fresh_rules())
            .unwrap(),
    );
    let twice = format(
        &reconcile_root("BUILD", Some(once.as_bytes()), "example.com/repo", &fresh_rules())
            .unwrap(),
    );
    assert_eq!(once, twice);
    assert_eq!(once.matches("go_prefix(").count(), 1);
    let prefix_at = once.find("go_prefix(").unwrap();
    assert!(prefix_at > once.find("filegroup(").unwrap());
    assert!(prefix_at < once.find("go_library(").unwrap());
}

#[test]
fn attached_comments_go_with_the_deleted_rule() {
    let existing = "# about the library\ngo_library(name = \"x\")\n\n# standalone\n";
    let doc = reconcile("BUILD", Some(existing.as_bytes()), &[]).unwrap();
    assert_eq!(format(&doc), "# standalone\n");
}

#[test]
fn hand_written_strings_and_comments_survive_unchanged() {
    let genrule = r#"genrule(
    name = "banner",
    outs = ["banner.txt"],  # generated
    cmd = "printf '\x41\101' > $@",
    tools = [r"\d"],
)
"#;
    let doc = reconcile("lib/BUILD", Some(genrule.as_bytes()), &[]).unwrap();
    assert_eq!(format(&doc), genrule);
}

fn arb_unrelated_stmt() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}".prop_map(|n| format!("filegroup(name = \"{n}\")")),
        "[a-z]{1,6}".prop_map(|n| format!("exports_files([\"{n}\"])")),
        ("[A-Z]{1,4}", 0u32..100).prop_map(|(k, v)| format!("{k} = {v}")),
        "[a-z ]{0,10}".prop_map(|c| format!("# {c}").trim_end().to_string()),
    ]
}

fn arb_generated_stmt() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["go_library", "go_binary", "go_test"]),
        "[a-z_]{1,8}",
    )
        .prop_map(|(kind, name)| format!("{kind}(name = \"{name}\", srcs = [\"{name}.go\"])"))
}

proptest! {
    #[test]
    fn reconcile_preserves_unrelated_statements_in_order(
        stmts in prop::collection::vec(
            prop_oneof![
                arb_unrelated_stmt().prop_map(|s| (s, false)),
                arb_generated_stmt().prop_map(|s| (s, true)),
            ],
            0..8,
        )
    ) {
        let source = stmts
            .iter()
            .map(|(s, _)| s.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let doc = reconcile("BUILD", Some(source.as_bytes()), &fresh_rules()).unwrap();

        let rendered = format(&doc);
        let mut cursor = 0;
        for (stmt, _) in stmts.iter().filter(|(_, generated)| !generated) {
            let formatted = format(&gazel_buildfile::parse("BUILD", stmt.as_bytes()).unwrap());
            let formatted = formatted.trim_end();
            let found = rendered[cursor..].find(formatted);
            prop_assert!(found.is_some(), "{formatted:?} missing after {cursor} in {rendered:?}");
            cursor += found.unwrap_or(0) + formatted.len();
        }

        let again = reconcile("BUILD", Some(rendered.as_bytes()), &fresh_rules()).unwrap();
        prop_assert_eq!(format(&again), rendered);
    }
}
