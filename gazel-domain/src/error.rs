use thiserror::Error;

/// Failure to map an import path onto a label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The import path is neither the prefix nor below it.
    #[error("import path {import_path:?} does not start with go prefix {prefix:?}")]
    Unresolved { import_path: String, prefix: String },
}

impl ResolveError {
    pub(crate) fn unresolved(import_path: &str, prefix: &str) -> Self {
        ResolveError::Unresolved {
            import_path: import_path.to_string(),
            prefix: prefix.to_string(),
        }
    }

    pub fn import_path(&self) -> &str {
        match self {
            ResolveError::Unresolved { import_path, .. } => import_path,
        }
    }
}
