//! Reconciliation of generated rules with existing BUILD files.
//!
//! Responsibilities:
//! - Load the current build file, if any.
//! - Replace every generated rule (`go_library`, `go_binary`, `go_test`) with freshly generated
//!   ones while keeping hand-written statements in their original order.
//! - Emit the result: print it, replace the file atomically, or show a unified diff.
//!
//! Reconciliation is whole-rule grained: attributes added by hand to a generated rule are lost
//! on the next run.

mod emit;
mod error;

pub use emit::{EmitMode, diff_file, emit, fix_file, print_file};
pub use error::{EditError, EditResult};

use camino::Utf8Path;
use fs_err as fs;
use gazel_buildfile::{Arg, BuildFile, Call, Expr, Stmt};
use gazel_types::{Rule, RuleKind};
use std::io::ErrorKind;
use tracing::debug;

/// Callee of the root build file's import path declaration.
pub const GO_PREFIX_KIND: &str = "go_prefix";

/// Function names of the rules this tool owns.
pub fn generated_kinds() -> [&'static str; 3] {
    RuleKind::ALL.map(RuleKind::function_name)
}

/// Read the current build file. A missing file is `None`.
pub fn load_existing(path: &Utf8Path) -> EditResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(EditError::io("read", path, err)),
    }
}

/// Merge `rules` into the existing build file content.
///
/// Every generated rule kind is deleted regardless of its name, then `rules` are appended in
/// order after the retained statements. Absent or empty content starts an empty document.
pub fn reconcile(path: &str, existing: Option<&[u8]>, rules: &[Rule]) -> EditResult<BuildFile> {
    let mut doc = parse_existing(path, existing)?;
    let removed = doc.delete_rules(&generated_kinds());
    debug!(path, removed, retained = doc.stmts.len(), "reconciling build file");
    append_rules(&mut doc, rules);
    Ok(doc)
}

/// Like [`reconcile`], for the build file at the repository root.
///
/// The root file also declares the import path prefix. Existing `go_prefix` statements are
/// replaced by a single fresh one placed before the generated rules.
pub fn reconcile_root(
    path: &str,
    existing: Option<&[u8]>,
    prefix: &str,
    rules: &[Rule],
) -> EditResult<BuildFile> {
    let mut doc = parse_existing(path, existing)?;
    let mut kinds = generated_kinds().to_vec();
    kinds.push(GO_PREFIX_KIND);
    let removed = doc.delete_rules(&kinds);
    debug!(path, removed, retained = doc.stmts.len(), "reconciling root build file");
    doc.push(go_prefix_stmt(prefix));
    append_rules(&mut doc, rules);
    Ok(doc)
}

fn parse_existing(path: &str, existing: Option<&[u8]>) -> EditResult<BuildFile> {
    match existing {
        Some(bytes) if !bytes.is_empty() => Ok(gazel_buildfile::parse(path, bytes)?),
        _ => Ok(BuildFile::new(path)),
    }
}

fn append_rules(doc: &mut BuildFile, rules: &[Rule]) {
    for rule in rules {
        doc.push(Stmt::from(rule));
    }
}

fn go_prefix_stmt(prefix: &str) -> Stmt {
    Stmt::expr(Expr::Call(Call::new(
        GO_PREFIX_KIND,
        vec![Arg::positional(Expr::Str(prefix.to_string()))],
    )))
}
