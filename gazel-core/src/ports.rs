//! Port traits abstracting all I/O away from the pipeline.

use crate::pipeline::GazelError;
use camino::Utf8Path;
use gazel_buildfile::BuildFile;
use gazel_edit::EditError;
use gazel_packages::PackageError;
use gazel_types::PackageDescriptor;

/// Callback receiving a package directory relative to the walk root (`""` for the root itself).
pub type Visit<'a> = dyn FnMut(&str, PackageDescriptor) -> Result<(), GazelError> + 'a;

/// Source of Go package metadata.
pub trait PackageSource {
    /// The package in `dir`, or `None` when it has no buildable sources.
    fn import_dir(&self, dir: &Utf8Path) -> Result<Option<PackageDescriptor>, PackageError>;

    /// Every package at or below `root`, in traversal order.
    fn walk(&self, root: &Utf8Path, visit: &mut Visit<'_>) -> Result<(), GazelError>;
}

/// Destination of reconciled build files.
pub trait BuildFileSink {
    /// Current content of the build file at `path`, `None` when there is none.
    fn load(&self, path: &Utf8Path) -> Result<Option<Vec<u8>>, EditError>;

    fn emit(&mut self, path: &Utf8Path, doc: &BuildFile) -> Result<(), EditError>;
}
