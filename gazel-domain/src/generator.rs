use crate::error::ResolveError;
use crate::resolver::{ImportResolver, InternalMode, LabelResolver, join_clean};
use gazel_types::{DEFAULT_LIBRARY_NAME, PackageDescriptor, Rule, RuleKind};
use tracing::debug;

const DEFAULT_TEST_NAME: &str = "go_default_test";
const DEFAULT_XTEST_NAME: &str = "go_default_xtest";

/// Generates build rules for Go packages.
///
/// The resolver is injected at construction; generation itself is a pure function of the
/// directory and the package descriptor.
pub struct Generator {
    prefix: String,
    resolver: Box<dyn LabelResolver>,
}

impl Generator {
    pub fn new(prefix: impl Into<String>, resolver: Box<dyn LabelResolver>) -> Self {
        Self {
            prefix: prefix.into(),
            resolver,
        }
    }

    /// Generator with the standard import dispatch for `mode`.
    pub fn for_mode(prefix: impl Into<String>, mode: InternalMode) -> Self {
        let prefix = prefix.into();
        let resolver = ImportResolver::new(prefix.clone(), mode);
        Self::new(prefix, Box::new(resolver))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Generate the rules for the package in `dir`.
    ///
    /// `dir` is slash-delimited and relative to the repository root; `""` (or `"."`) is the root.
    /// Rules come out as: primary library or binary, then test, then external test.
    pub fn generate(&self, dir: &str, pkg: &PackageDescriptor) -> Result<Vec<Rule>, ResolveError> {
        let dir = normalize_dir(dir);

        let primary = self.generate_primary(dir, pkg)?;
        let primary_name = primary.name.clone();
        let mut rules = vec![primary];

        if !pkg.test_source_files.is_empty() {
            rules.push(self.generate_test(
                dir,
                &pkg.test_source_files,
                &pkg.test_imports,
                &primary_name,
            )?);
        }

        if !pkg.external_test_source_files.is_empty() {
            rules.push(self.generate_xtest(
                dir,
                &pkg.external_test_source_files,
                &pkg.external_test_imports,
                &primary_name,
            )?);
        }

        debug!(dir, rules = rules.len(), "generated rules");
        Ok(rules)
    }

    fn generate_primary(&self, dir: &str, pkg: &PackageDescriptor) -> Result<Rule, ResolveError> {
        let own = self.resolver.resolve(&join_clean(&[&self.prefix, dir]), dir)?;

        let (kind, name) = if pkg.is_executable {
            (RuleKind::Binary, binary_name(dir, pkg, &self.prefix))
        } else if dir.is_empty() {
            (RuleKind::Library, DEFAULT_LIBRARY_NAME.to_string())
        } else {
            (RuleKind::Library, own.name)
        };

        let mut rule = Rule::new(kind, name).with_attr("srcs", pkg.source_files.clone());
        let deps = self.dependencies(&pkg.imports, dir)?;
        if !deps.is_empty() {
            rule.set_attr("deps", deps);
        }
        Ok(rule)
    }

    fn generate_test(
        &self,
        dir: &str,
        srcs: &[String],
        imports: &[String],
        primary: &str,
    ) -> Result<Rule, ResolveError> {
        let mut rule = Rule::new(RuleKind::Test, derived_name(primary, "_test", DEFAULT_TEST_NAME))
            .with_attr("srcs", srcs.to_vec())
            .with_attr("library", format!(":{primary}"));
        let deps = self.dependencies(imports, dir)?;
        if !deps.is_empty() {
            rule.set_attr("deps", deps);
        }
        Ok(rule)
    }

    /// External tests compile against the public interface only: no `library`, `deps` always set.
    fn generate_xtest(
        &self,
        dir: &str,
        srcs: &[String],
        imports: &[String],
        primary: &str,
    ) -> Result<Rule, ResolveError> {
        let deps = self.dependencies(imports, dir)?;
        Ok(
            Rule::new(RuleKind::Test, derived_name(primary, "_xtest", DEFAULT_XTEST_NAME))
                .with_attr("srcs", srcs.to_vec())
                .with_attr("deps", deps),
        )
    }

    /// Labels for the non-standard imports, in import order.
    fn dependencies(&self, imports: &[String], dir: &str) -> Result<Vec<String>, ResolveError> {
        let mut deps = Vec::new();
        for import_path in imports {
            if is_standard(import_path) {
                continue;
            }
            deps.push(self.resolver.resolve(import_path, dir)?.to_string());
        }
        Ok(deps)
    }
}

/// Whether `import_path` names a Go standard library package.
///
/// Heuristic: every externally hosted path starts with a dotted host, so a first segment
/// without a dot is standard.
pub fn is_standard(import_path: &str) -> bool {
    let first = import_path.split('/').next().unwrap_or(import_path);
    !first.contains('.')
}

fn normalize_dir(dir: &str) -> &str {
    let dir = dir.trim_matches('/');
    if dir == "." { "" } else { dir }
}

fn derived_name(primary: &str, suffix: &str, default: &str) -> String {
    if primary == DEFAULT_LIBRARY_NAME {
        default.to_string()
    } else {
        format!("{primary}{suffix}")
    }
}

/// Executables are invoked by name: use the directory's last segment.
fn binary_name(dir: &str, pkg: &PackageDescriptor, prefix: &str) -> String {
    dir.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .or_else(|| pkg.dir_base_name())
        .or_else(|| prefix.rsplit('/').next())
        .unwrap_or(DEFAULT_LIBRARY_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazel_types::AttrValue;
    use pretty_assertions::assert_eq;

    const PREFIX: &str = "example.com/repo";

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn list(v: &[&str]) -> AttrValue {
        AttrValue::StringList(strings(v))
    }

    #[test]
    fn standard_library_heuristic() {
        assert!(is_standard("fmt"));
        assert!(is_standard("net/http"));
        assert!(is_standard("C"));
        assert!(!is_standard("example.com/repo/lib"));
        assert!(!is_standard("gopkg.in/yaml.v2"));
    }

    #[test]
    fn dot_dir_is_root() {
        assert_eq!(normalize_dir("."), "");
        assert_eq!(normalize_dir("lib/"), "lib");
    }

    #[test]
    fn library_in_subdir_uses_resolver_name() {
        let g = Generator::for_mode(PREFIX, InternalMode::Structured);
        let pkg = PackageDescriptor {
            source_files: strings(&["lib.go"]),
            imports: strings(&["example.com/repo/lib/deep", "fmt"]),
            ..Default::default()
        };
        let rules = g.generate("lib", &pkg).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].kind, RuleKind::Library);
        assert_eq!(rules[0].name, "go_default_library");
        assert_eq!(rules[0].attr("deps"), Some(&list(&["//lib/deep:go_default_library"])));
    }

    #[test]
    fn flat_mode_names_packages_by_path() {
        let g = Generator::for_mode(PREFIX, InternalMode::Flat);
        let pkg = PackageDescriptor {
            source_files: strings(&["lib.go"]),
            test_source_files: strings(&["lib_test.go"]),
            imports: strings(&["example.com/repo/lib/deep"]),
            ..Default::default()
        };
        let rules = g.generate("lib", &pkg).unwrap();
        assert_eq!(rules[0].name, "lib");
        assert_eq!(rules[0].attr("deps"), Some(&list(&[":lib/deep"])));
        assert_eq!(rules[1].name, "lib_test");
        assert_eq!(rules[1].attr("library"), Some(&AttrValue::from(":lib")));
    }

    #[test]
    fn binary_takes_directory_name_and_drives_test_names() {
        let g = Generator::for_mode(PREFIX, InternalMode::Structured);
        let pkg = PackageDescriptor {
            source_files: strings(&["main.go"]),
            test_source_files: strings(&["main_test.go"]),
            is_executable: true,
            ..Default::default()
        };
        let rules = g.generate("cmd/tool", &pkg).unwrap();
        assert_eq!(rules[0].kind, RuleKind::Binary);
        assert_eq!(rules[0].name, "tool");
        assert_eq!(rules[0].attr("deps"), None);
        assert_eq!(rules[1].name, "tool_test");
        assert_eq!(rules[1].attr("library"), Some(&AttrValue::from(":tool")));
    }

    #[test]
    fn root_binary_falls_back_to_directory_base_name() {
        let g = Generator::for_mode(PREFIX, InternalMode::Structured);
        let pkg = PackageDescriptor {
            dir: "/src/mytool".into(),
            source_files: strings(&["main.go"]),
            is_executable: true,
            ..Default::default()
        };
        let rules = g.generate("", &pkg).unwrap();
        assert_eq!(rules[0].name, "mytool");
    }

    #[test]
    fn xtest_always_has_deps_and_no_library() {
        let g = Generator::for_mode(PREFIX, InternalMode::Structured);
        let pkg = PackageDescriptor {
            source_files: strings(&["lib.go"]),
            external_test_source_files: strings(&["lib_external_test.go"]),
            external_test_imports: strings(&["testing"]),
            ..Default::default()
        };
        let rules = g.generate("", &pkg).unwrap();
        assert_eq!(rules[1].name, "go_default_xtest");
        assert_eq!(rules[1].attr_keys(), vec!["name", "srcs", "deps"]);
        assert_eq!(rules[1].attr("deps"), Some(&list(&[])));
    }

    #[test]
    fn resolution_failure_aborts_whole_package() {
        struct Refuse;
        impl LabelResolver for Refuse {
            fn resolve(
                &self,
                import_path: &str,
                _dir: &str,
            ) -> Result<gazel_types::Label, ResolveError> {
                if import_path.ends_with("/bad") {
                    Err(ResolveError::unresolved(import_path, PREFIX))
                } else {
                    Ok(gazel_types::Label::relative(DEFAULT_LIBRARY_NAME))
                }
            }
        }

        let g = Generator::new(PREFIX, Box::new(Refuse));
        let pkg = PackageDescriptor {
            source_files: strings(&["lib.go"]),
            test_source_files: strings(&["lib_test.go"]),
            test_imports: strings(&["example.com/x/bad"]),
            ..Default::default()
        };
        let err = g.generate("lib", &pkg).unwrap_err();
        assert_eq!(err.import_path(), "example.com/x/bad");
    }
}
