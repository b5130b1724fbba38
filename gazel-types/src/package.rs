use camino::Utf8PathBuf;

/// Dependency metadata of one Go package directory.
///
/// Produced by package introspection and consumed read-only by the generator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Directory containing the package sources.
    pub dir: Utf8PathBuf,
    /// Package name from the package clause (without the `_test` suffix of external tests).
    pub name: String,
    pub source_files: Vec<String>,
    pub test_source_files: Vec<String>,
    pub external_test_source_files: Vec<String>,
    pub imports: Vec<String>,
    pub test_imports: Vec<String>,
    pub external_test_imports: Vec<String>,
    pub is_executable: bool,
}

impl PackageDescriptor {
    /// Last path component of the package directory, if any.
    pub fn dir_base_name(&self) -> Option<&str> {
        self.dir.file_name()
    }
}
