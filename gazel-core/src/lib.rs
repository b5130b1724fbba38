//! Embeddable core library for gazel.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking into other tools.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`PackageSource`](ports::PackageSource): discover Go packages
//! - [`BuildFileSink`](ports::BuildFileSink): read current build files and emit reconciled ones
//!
//! The [`adapters`] module provides filesystem-backed and in-memory implementations.
//!
//! # Entry point
//!
//! - [`run`](pipeline::run): generate, reconcile and emit build files for a set of targets

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use pipeline::{GazelError, RunSummary, Target, run};
pub use settings::{Layout, Settings};

// Re-exported so embedders don't need the lower crates directly.
pub use gazel_edit::EmitMode;
pub use gazel_types::PackageDescriptor;
