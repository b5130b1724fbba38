use super::LabelResolver;
use crate::error::ResolveError;
use gazel_types::{DEFAULT_LIBRARY_NAME, Label};

/// Resolves import paths hosted outside the current repository.
///
/// The host segment is reversed into a repository name (`example.com` becomes `com_example`);
/// the rest of the path is the package. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalResolver;

impl ExternalResolver {
    pub fn repository_name(host: &str) -> String {
        host.split('.').rev().collect::<Vec<_>>().join("_")
    }
}

impl LabelResolver for ExternalResolver {
    fn resolve(&self, import_path: &str, _dir: &str) -> Result<Label, ResolveError> {
        let (host, pkg) = import_path.split_once('/').unwrap_or((import_path, ""));
        Ok(Label::external(
            Self::repository_name(host),
            pkg,
            DEFAULT_LIBRARY_NAME,
        ))
    }
}
