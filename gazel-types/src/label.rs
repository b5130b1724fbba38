use std::fmt;

/// Target name used for the library rule of a Go package.
pub const DEFAULT_LIBRARY_NAME: &str = "go_default_library";

/// Address of one buildable target.
///
/// String forms:
/// - relative: `:name`
/// - same repository: `//pkg:name`
/// - external repository: `@repo//pkg:name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label {
    /// Repository name. Empty means the current repository.
    pub repo: String,
    /// Slash-separated package path. May be empty.
    pub pkg: String,
    pub name: String,
    pub relative: bool,
}

impl Label {
    /// A label relative to the build file that references it.
    pub fn relative(name: impl Into<String>) -> Self {
        Self {
            repo: String::new(),
            pkg: String::new(),
            name: name.into(),
            relative: true,
        }
    }

    /// An absolute label in the current repository.
    pub fn absolute(pkg: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            repo: String::new(),
            pkg: pkg.into(),
            name: name.into(),
            relative: false,
        }
    }

    /// An absolute label in another repository.
    pub fn external(
        repo: impl Into<String>,
        pkg: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            repo: repo.into(),
            pkg: pkg.into(),
            name: name.into(),
            relative: false,
        }
    }

    pub fn is_external(&self) -> bool {
        !self.relative && !self.repo.is_empty()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.relative {
            return write!(f, ":{}", self.name);
        }
        if !self.repo.is_empty() {
            return write!(f, "@{}//{}:{}", self.repo, self.pkg, self.name);
        }
        write!(f, "//{}:{}", self.pkg, self.name)
    }
}
