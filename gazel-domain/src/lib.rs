//! Domain logic: turn package metadata into a deterministic list of build rules.
//!
//! This crate owns *what* rules a package gets and how import paths become labels. It does not
//! own how rules are written into build files; that's the `gazel-edit` crate.

mod error;
mod generator;
mod resolver;

pub use error::ResolveError;
pub use generator::{Generator, is_standard};
pub use resolver::{
    ExternalResolver, FlatResolver, ImportResolver, InternalMode, InternalResolver, LabelResolver,
    StructuredResolver,
};
