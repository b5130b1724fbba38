use crate::error::PackageError;
use crate::scan::scan_header;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use gazel_types::PackageDescriptor;
use glob::{Pattern, glob};
use std::collections::BTreeSet;
use tracing::debug;

/// Describe the Go package in `dir`.
///
/// Returns `Ok(None)` when the directory has no buildable Go files. Files whose names start with
/// `.` or `_` and files constrained with `ignore` are not buildable.
pub fn import_dir(dir: &Utf8Path) -> Result<Option<PackageDescriptor>, PackageError> {
    let mut sources = Sources::default();

    for (path, file_name) in go_files(dir)? {
        let src = fs::read_to_string(&path).map_err(|e| PackageError::io(&path, e))?;
        let header = scan_header(&path, &src)?;
        if header.ignored {
            debug!(path = %path, "skipping ignored file");
            continue;
        }
        sources.add(file_name, header.package, header.imports);
    }

    if sources.is_empty() {
        debug!(dir = %dir, "no buildable Go files");
        return Ok(None);
    }
    sources.into_descriptor(dir).map(Some)
}

/// `*.go` files directly in `dir`, sorted by name.
fn go_files(dir: &Utf8Path) -> Result<Vec<(Utf8PathBuf, String)>, PackageError> {
    let pattern = format!("{}/*.go", Pattern::escape(dir.as_str()));
    let paths = glob(&pattern).map_err(|e| {
        PackageError::io(dir, std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
    })?;

    let mut out = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| {
            let path = Utf8PathBuf::from(e.path().to_string_lossy().into_owned());
            PackageError::io(path, e.into_error())
        })?;
        let path = Utf8PathBuf::from_path_buf(path).map_err(|p| {
            PackageError::io(
                p.to_string_lossy().into_owned(),
                std::io::Error::new(std::io::ErrorKind::InvalidData, "path is not valid UTF-8"),
            )
        })?;
        let Some(file_name) = path.file_name().map(str::to_string) else {
            continue;
        };
        if file_name.starts_with('.') || file_name.starts_with('_') || !path.is_file() {
            continue;
        }
        out.push((path, file_name));
    }
    out.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(out)
}

/// One file's package clause, remembered for error reporting.
struct Declared {
    package: String,
    file: String,
}

#[derive(Default)]
struct Sources {
    source_files: Vec<String>,
    test_source_files: Vec<String>,
    external_test_source_files: Vec<String>,
    imports: BTreeSet<String>,
    test_imports: BTreeSet<String>,
    external_test_imports: BTreeSet<String>,
    /// Package clauses of non-test files.
    library: Vec<Declared>,
    /// Package clauses of internal test files.
    tests: Vec<Declared>,
    /// Package clauses of external test files, without the `_test` suffix.
    external_tests: Vec<Declared>,
}

impl Sources {
    fn add(&mut self, file: String, package: String, imports: Vec<String>) {
        if !file.ends_with("_test.go") {
            self.imports.extend(imports);
            self.library.push(Declared {
                package,
                file: file.clone(),
            });
            self.source_files.push(file);
        } else if let Some(base) = package.strip_suffix("_test") {
            self.external_test_imports.extend(imports);
            self.external_tests.push(Declared {
                package: base.to_string(),
                file: file.clone(),
            });
            self.external_test_source_files.push(file);
        } else {
            self.test_imports.extend(imports);
            self.tests.push(Declared {
                package,
                file: file.clone(),
            });
            self.test_source_files.push(file);
        }
    }

    fn is_empty(&self) -> bool {
        self.source_files.is_empty()
            && self.test_source_files.is_empty()
            && self.external_test_source_files.is_empty()
    }

    /// Every file must agree on one package name; external tests may add `_test`.
    fn package_name(&self, dir: &Utf8Path) -> Result<String, PackageError> {
        let mut declared = self
            .library
            .iter()
            .chain(&self.tests)
            .chain(&self.external_tests);
        let Some(first) = declared.next() else {
            return Ok(String::new());
        };
        for other in declared {
            if other.package != first.package {
                return Err(PackageError::MultiplePackages {
                    dir: dir.to_path_buf(),
                    first: first.package.clone(),
                    first_file: first.file.clone(),
                    second: other.package.clone(),
                    second_file: other.file.clone(),
                });
            }
        }
        Ok(first.package.clone())
    }

    fn into_descriptor(self, dir: &Utf8Path) -> Result<PackageDescriptor, PackageError> {
        let name = self.package_name(dir)?;
        Ok(PackageDescriptor {
            dir: dir.to_path_buf(),
            is_executable: name == "main",
            name,
            source_files: self.source_files,
            test_source_files: self.test_source_files,
            external_test_source_files: self.external_test_source_files,
            imports: self.imports.into_iter().collect(),
            test_imports: self.test_imports.into_iter().collect(),
            external_test_imports: self.external_test_imports.into_iter().collect(),
        })
    }
}
