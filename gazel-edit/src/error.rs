//! Error types for gazel-edit.

use camino::Utf8PathBuf;
use gazel_buildfile::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    /// The existing build file is malformed. Reconciliation never repairs it.
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to {action} {path}")]
    Io {
        /// What was being attempted, e.g. "read" or "replace".
        action: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EditError {
    pub(crate) fn io(
        action: &'static str,
        path: impl Into<Utf8PathBuf>,
        source: std::io::Error,
    ) -> Self {
        EditError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Result type alias using EditError.
pub type EditResult<T> = Result<T, EditError>;
