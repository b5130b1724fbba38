use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("failed to read {path}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header of a Go file could not be understood.
    #[error("{file}:{line}: {message}")]
    Syntax {
        file: Utf8PathBuf,
        line: usize,
        message: String,
    },

    #[error("found packages {first} ({first_file}) and {second} ({second_file}) in {dir}")]
    MultiplePackages {
        dir: Utf8PathBuf,
        first: String,
        first_file: String,
        second: String,
        second_file: String,
    },
}

impl PackageError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        PackageError::Io {
            path: path.into(),
            source,
        }
    }
}
