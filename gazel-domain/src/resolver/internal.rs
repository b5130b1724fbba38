use super::{LabelResolver, strip_prefix};
use crate::error::ResolveError;
use gazel_types::{DEFAULT_LIBRARY_NAME, Label};

/// Resolves import paths under the go prefix into absolute labels.
///
/// Every path maps to exactly one label; the referencing directory is ignored.
#[derive(Debug, Clone)]
pub struct InternalResolver {
    prefix: String,
}

impl InternalResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl LabelResolver for InternalResolver {
    fn resolve(&self, import_path: &str, _dir: &str) -> Result<Label, ResolveError> {
        match strip_prefix(&self.prefix, import_path) {
            Some(pkg) => Ok(Label::absolute(pkg, DEFAULT_LIBRARY_NAME)),
            None => Err(ResolveError::unresolved(import_path, &self.prefix)),
        }
    }
}
