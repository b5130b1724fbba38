use super::{LabelResolver, expand_relative, strip_prefix};
use crate::error::ResolveError;
use gazel_types::{DEFAULT_LIBRARY_NAME, Label};

/// Resolves internal import paths assuming a single build file for the whole repository.
///
/// Every internal target lives in that one file, so labels are always relative and the package
/// path below the prefix becomes the target name.
#[derive(Debug, Clone)]
pub struct FlatResolver {
    prefix: String,
}

impl FlatResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl LabelResolver for FlatResolver {
    fn resolve(&self, import_path: &str, dir: &str) -> Result<Label, ResolveError> {
        let import_path = expand_relative(&self.prefix, dir, import_path);
        match strip_prefix(&self.prefix, &import_path) {
            Some("") => Ok(Label::relative(DEFAULT_LIBRARY_NAME)),
            Some(pkg) => Ok(Label::relative(pkg)),
            None => Err(ResolveError::unresolved(&import_path, &self.prefix)),
        }
    }
}
