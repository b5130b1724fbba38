use crate::error::ResolveError;
use gazel_types::Label;

mod external;
mod flat;
mod internal;
mod structured;

pub use external::ExternalResolver;
pub use flat::FlatResolver;
pub use internal::InternalResolver;
pub use structured::StructuredResolver;

/// Resolves a Go import path into a label.
pub trait LabelResolver {
    /// Resolve `import_path` as referenced from the package directory `dir`.
    ///
    /// `dir` is a slash-delimited path relative to the repository root; `""` is the root.
    fn resolve(&self, import_path: &str, dir: &str) -> Result<Label, ResolveError>;
}

/// How labels inside the current repository are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InternalMode {
    /// Absolute labels, one per import path.
    Internal,
    /// One build file per package directory.
    #[default]
    Structured,
    /// One build file for the whole repository.
    Flat,
}

/// Top-level resolver: internal paths go to the configured mode, everything else is external.
pub struct ImportResolver {
    prefix: String,
    internal: Box<dyn LabelResolver>,
    external: ExternalResolver,
}

impl ImportResolver {
    pub fn new(prefix: impl Into<String>, mode: InternalMode) -> Self {
        let prefix = prefix.into();
        let internal: Box<dyn LabelResolver> = match mode {
            InternalMode::Internal => Box::new(InternalResolver::new(prefix.clone())),
            InternalMode::Structured => Box::new(StructuredResolver::new(prefix.clone())),
            InternalMode::Flat => Box::new(FlatResolver::new(prefix.clone())),
        };
        Self::with_internal(prefix, internal)
    }

    pub fn with_internal(prefix: impl Into<String>, internal: Box<dyn LabelResolver>) -> Self {
        Self {
            prefix: prefix.into(),
            internal,
            external: ExternalResolver,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl LabelResolver for ImportResolver {
    fn resolve(&self, import_path: &str, dir: &str) -> Result<Label, ResolveError> {
        let expanded = expand_relative(&self.prefix, dir, import_path);
        if is_internal(&self.prefix, &expanded) {
            self.internal.resolve(&expanded, dir)
        } else {
            self.external.resolve(&expanded, dir)
        }
    }
}

/// True when `import_path` is the prefix itself or lies below it.
///
/// A prefix never matches without its separator: `foo` does not cover `foobar`.
pub(crate) fn is_internal(prefix: &str, import_path: &str) -> bool {
    strip_prefix(prefix, import_path).is_some()
}

/// `Some("")` for the prefix itself, `Some(rest)` for `prefix/rest`, otherwise `None`.
pub(crate) fn strip_prefix<'a>(prefix: &str, import_path: &'a str) -> Option<&'a str> {
    if import_path == prefix {
        return Some("");
    }
    import_path
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
}

/// Expand an intra-package relative import (`./x`) into `prefix/dir/x`.
pub(crate) fn expand_relative(prefix: &str, dir: &str, import_path: &str) -> String {
    match import_path.strip_prefix("./") {
        Some(rest) => join_clean(&[prefix, dir, rest]),
        None => import_path.to_string(),
    }
}

/// Join slash paths, dropping empty and `.` segments and folding `..`.
pub(crate) fn join_clean(parts: &[&str]) -> String {
    let mut out: Vec<&str> = Vec::new();
    for seg in parts.iter().flat_map(|p| p.split('/')) {
        match seg {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            s => out.push(s),
        }
    }
    out.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazel_types::DEFAULT_LIBRARY_NAME;

    const PREFIX: &str = "example.com/repo";

    #[test]
    fn strip_prefix_requires_separator() {
        assert_eq!(strip_prefix(PREFIX, PREFIX), Some(""));
        assert_eq!(strip_prefix(PREFIX, "example.com/repo/lib"), Some("lib"));
        assert_eq!(strip_prefix(PREFIX, "example.com/repo_suffix"), None);
        assert_eq!(strip_prefix(PREFIX, "example.com/repository/lib"), None);
        assert_eq!(strip_prefix("foo", "foobar"), None);
    }

    #[test]
    fn join_clean_folds_dots() {
        assert_eq!(join_clean(&[PREFIX, "", "sub"]), "example.com/repo/sub");
        assert_eq!(join_clean(&[PREFIX, "lib", "../other"]), "example.com/repo/other");
        assert_eq!(join_clean(&[PREFIX, "lib", "."]), "example.com/repo/lib");
    }

    #[test]
    fn relative_import_is_expanded_against_dir() {
        assert_eq!(expand_relative(PREFIX, "lib", "./deep"), "example.com/repo/lib/deep");
        assert_eq!(expand_relative(PREFIX, "", "./deep"), "example.com/repo/deep");
        assert_eq!(expand_relative(PREFIX, "lib", "fmt"), "fmt");
    }

    #[test]
    fn dispatch_sends_prefixed_paths_to_internal_mode() {
        let r = ImportResolver::new(PREFIX, InternalMode::Structured);
        assert_eq!(
            r.resolve("example.com/repo/lib", "").unwrap(),
            Label::absolute("lib", DEFAULT_LIBRARY_NAME)
        );
        assert_eq!(
            r.resolve("./sub", "lib").unwrap(),
            Label::absolute("lib/sub", DEFAULT_LIBRARY_NAME)
        );
    }

    #[test]
    fn dispatch_sends_other_paths_to_external() {
        let r = ImportResolver::new(PREFIX, InternalMode::Flat);
        assert_eq!(
            r.resolve("example.com/repo_suffix/x", "").unwrap(),
            Label::external("com_example", "repo_suffix/x", DEFAULT_LIBRARY_NAME)
        );
        assert_eq!(
            r.resolve("github.com/org/pkg", "lib").unwrap().to_string(),
            "@com_github//org/pkg:go_default_library"
        );
    }

    #[test]
    fn internal_mode_gives_absolute_labels_everywhere() {
        let r = ImportResolver::new(PREFIX, InternalMode::Internal);
        assert_eq!(
            r.resolve("example.com/repo/lib", "lib").unwrap(),
            Label::absolute("lib", DEFAULT_LIBRARY_NAME)
        );
        assert_eq!(r.prefix(), PREFIX);
    }
}
