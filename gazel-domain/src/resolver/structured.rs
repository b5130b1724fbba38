use super::{LabelResolver, expand_relative, strip_prefix};
use crate::error::ResolveError;
use gazel_types::{DEFAULT_LIBRARY_NAME, Label};

/// Resolves internal import paths assuming one build file per package directory.
///
/// Same as [`InternalResolver`](super::InternalResolver), except a reference to the package in
/// the referencing directory itself stays relative. That includes the root package referenced
/// from the root directory.
#[derive(Debug, Clone)]
pub struct StructuredResolver {
    prefix: String,
}

impl StructuredResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl LabelResolver for StructuredResolver {
    fn resolve(&self, import_path: &str, dir: &str) -> Result<Label, ResolveError> {
        let import_path = expand_relative(&self.prefix, dir, import_path);
        let Some(pkg) = strip_prefix(&self.prefix, &import_path) else {
            return Err(ResolveError::unresolved(&import_path, &self.prefix));
        };
        if pkg == dir {
            return Ok(Label::relative(DEFAULT_LIBRARY_NAME));
        }
        Ok(Label::absolute(pkg, DEFAULT_LIBRARY_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_to_current_package() {
        let r = StructuredResolver::new("example.com/repo");
        for (import_path, cur_pkg, want) in [
            ("example.com/repo", "", Label::relative(DEFAULT_LIBRARY_NAME)),
            ("example.com/repo/lib", "", Label::absolute("lib", DEFAULT_LIBRARY_NAME)),
            ("example.com/repo/another", "", Label::absolute("another", DEFAULT_LIBRARY_NAME)),
            ("example.com/repo", "lib", Label::absolute("", DEFAULT_LIBRARY_NAME)),
            ("example.com/repo/lib", "lib", Label::relative(DEFAULT_LIBRARY_NAME)),
            ("example.com/repo/lib/sub", "lib", Label::absolute("lib/sub", DEFAULT_LIBRARY_NAME)),
            ("example.com/repo/another", "lib", Label::absolute("another", DEFAULT_LIBRARY_NAME)),
        ] {
            let got = r
                .resolve(import_path, cur_pkg)
                .unwrap_or_else(|e| panic!("resolve({import_path:?}, {cur_pkg:?}) failed: {e}"));
            assert_eq!(got, want, "resolve({import_path:?}, {cur_pkg:?})");
        }
    }

    #[test]
    fn self_import_through_dot_slash_stays_relative() {
        let r = StructuredResolver::new("example.com/repo");
        assert_eq!(
            r.resolve("./", "lib").unwrap(),
            Label::relative(DEFAULT_LIBRARY_NAME)
        );
        assert_eq!(
            r.resolve("./deep", "lib").unwrap(),
            Label::absolute("lib/deep", DEFAULT_LIBRARY_NAME)
        );
    }

    #[test]
    fn rejects_paths_outside_prefix() {
        let r = StructuredResolver::new("example.com/repo");
        for import_path in [
            "example.com/another",
            "example.com/another/sub",
            "example.com/repo_suffix",
        ] {
            assert!(r.resolve(import_path, "").is_err(), "{import_path}");
        }
    }
}
