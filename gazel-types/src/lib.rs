//! Shared value types for the gazel workspace.
//!
//! # Design constraints
//! - Everything here is an immutable value built per generation pass.
//! - No I/O. Parsing source files and build files lives in other crates.

pub mod label;
pub mod package;
pub mod rule;

pub use label::{DEFAULT_LIBRARY_NAME, Label};
pub use package::PackageDescriptor;
pub use rule::{AttrValue, Rule, RuleKind};
