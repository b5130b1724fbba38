//! BUILD file grammar for gazel.
//!
//! Responsibilities:
//! - Parse BUILD file bytes into a [`BuildFile`] document (failing on syntax errors).
//! - Render a document back into canonical, deterministic text.
//! - Document edits needed by reconciliation: delete statements by rule kind, append.
//!
//! The grammar is the declarative subset of Starlark found in BUILD files: calls, assignments,
//! literals, lists, dicts and simple arithmetic. `def`, `if` and friends are rejected.

mod ast;
mod error;
mod format;
mod lexer;
mod parser;

pub use ast::{Arg, BuildFile, Call, Expr, Stmt};
pub use error::ParseError;
pub use format::format;

/// Parse `bytes` as the BUILD file named `filename`.
pub fn parse(filename: &str, bytes: &[u8]) -> Result<BuildFile, ParseError> {
    let src = std::str::from_utf8(bytes).map_err(|e| {
        ParseError::at_offset(filename, bytes, e.valid_up_to(), "invalid UTF-8")
    })?;
    parser::parse_file(filename, src)
}
