//! Go package discovery.
//!
//! gazel only needs a package's name, its files split by kind, and its imports. This crate reads
//! just the header of each `.go` file (package clause and import declarations) instead of parsing
//! whole sources.

mod error;
mod import;
mod scan;
mod walk;

pub use error::PackageError;
pub use import::import_dir;
pub use walk::walk;
