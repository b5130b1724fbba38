//! Default port implementations: filesystem-backed and in-memory.

use crate::pipeline::GazelError;
use crate::ports::{BuildFileSink, PackageSource, Visit};
use camino::{Utf8Path, Utf8PathBuf};
use gazel_buildfile::{BuildFile, format};
use gazel_edit::{EditError, EmitMode};
use gazel_packages::PackageError;
use gazel_types::PackageDescriptor;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::debug;

/// Reads Go packages from disk via `gazel_packages`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPackageSource;

impl PackageSource for FsPackageSource {
    fn import_dir(&self, dir: &Utf8Path) -> Result<Option<PackageDescriptor>, PackageError> {
        gazel_packages::import_dir(dir)
    }

    fn walk(&self, root: &Utf8Path, visit: &mut Visit<'_>) -> Result<(), GazelError> {
        gazel_packages::walk(root, |rel, pkg| visit(rel, pkg))
    }
}

/// Emits build files on disk according to an [`EmitMode`].
///
/// Print and diff output goes to `out`.
#[derive(Debug)]
pub struct EmitterSink<W> {
    mode: EmitMode,
    out: W,
}

impl<W: Write> EmitterSink<W> {
    pub fn new(mode: EmitMode, out: W) -> Self {
        Self { mode, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> BuildFileSink for EmitterSink<W> {
    fn load(&self, path: &Utf8Path) -> Result<Option<Vec<u8>>, EditError> {
        gazel_edit::load_existing(path)
    }

    fn emit(&mut self, path: &Utf8Path, doc: &BuildFile) -> Result<(), EditError> {
        gazel_edit::emit(self.mode, &mut self.out, path, doc)
    }
}

/// In-memory package source for embedding and testing.
///
/// Packages are keyed by their `dir`; walks visit them in path order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPackageSource {
    packages: BTreeMap<Utf8PathBuf, PackageDescriptor>,
}

impl InMemoryPackageSource {
    pub fn new(packages: impl IntoIterator<Item = PackageDescriptor>) -> Self {
        Self {
            packages: packages
                .into_iter()
                .map(|pkg| (pkg.dir.clone(), pkg))
                .collect(),
        }
    }
}

impl PackageSource for InMemoryPackageSource {
    fn import_dir(&self, dir: &Utf8Path) -> Result<Option<PackageDescriptor>, PackageError> {
        Ok(self.packages.get(dir).cloned())
    }

    fn walk(&self, root: &Utf8Path, visit: &mut Visit<'_>) -> Result<(), GazelError> {
        for (dir, pkg) in &self.packages {
            let Ok(rel) = dir.strip_prefix(root) else {
                continue;
            };
            let rel = rel
                .components()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join("/");
            visit(&rel, pkg.clone())?;
        }
        Ok(())
    }
}

/// In-memory build file store for embedding and testing.
///
/// Seeded files are the "existing" content; emitted files replace them and are recorded in
/// emission order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    files: BTreeMap<Utf8PathBuf, String>,
    emitted: Vec<Utf8PathBuf>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed existing content for `path`.
    pub fn with_file(mut self, path: impl Into<Utf8PathBuf>, contents: impl Into<String>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    pub fn file(&self, path: impl AsRef<Utf8Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    /// Paths passed to `emit`, in order.
    pub fn emitted(&self) -> &[Utf8PathBuf] {
        &self.emitted
    }
}

impl BuildFileSink for RecordingSink {
    fn load(&self, path: &Utf8Path) -> Result<Option<Vec<u8>>, EditError> {
        Ok(self.files.get(path).map(|s| s.as_bytes().to_vec()))
    }

    fn emit(&mut self, path: &Utf8Path, doc: &BuildFile) -> Result<(), EditError> {
        debug!(path = %path, "recording build file");
        self.files.insert(path.to_path_buf(), format(doc));
        self.emitted.push(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pkg(dir: &str, name: &str) -> PackageDescriptor {
        PackageDescriptor {
            dir: dir.into(),
            name: name.into(),
            source_files: vec![format!("{name}.go")],
            ..Default::default()
        }
    }

    #[test]
    fn in_memory_walk_is_ordered_and_scoped() {
        let source = InMemoryPackageSource::new([
            pkg("/repo/b", "b"),
            pkg("/repo", "repo"),
            pkg("/repo/a/nested", "nested"),
            pkg("/repo/a", "a"),
            pkg("/repository", "other"),
        ]);

        let mut seen = Vec::new();
        source
            .walk(Utf8Path::new("/repo"), &mut |rel: &str, pkg| {
                seen.push((rel.to_string(), pkg.name));
                Ok(())
            })
            .unwrap();
        let seen: Vec<_> = seen.iter().map(|(r, n)| (r.as_str(), n.as_str())).collect();
        assert_eq!(
            seen,
            vec![("", "repo"), ("a", "a"), ("a/nested", "nested"), ("b", "b")]
        );

        assert!(source.import_dir(Utf8Path::new("/repo/a")).unwrap().is_some());
        assert!(source.import_dir(Utf8Path::new("/repo/c")).unwrap().is_none());
    }

    #[test]
    fn recording_sink_replaces_seeded_content() {
        let mut sink = RecordingSink::new().with_file("/repo/BUILD", "x = 1\n");
        assert_eq!(
            sink.load(Utf8Path::new("/repo/BUILD")).unwrap(),
            Some(b"x = 1\n".to_vec())
        );
        let doc = gazel_buildfile::parse("BUILD", b"y = 2\n").unwrap();
        sink.emit(Utf8Path::new("/repo/BUILD"), &doc).unwrap();
        assert_eq!(sink.file("/repo/BUILD"), Some("y = 2\n"));
        assert_eq!(sink.emitted(), [Utf8PathBuf::from("/repo/BUILD")]);
    }

    #[test]
    fn emitter_sink_prints_to_its_writer() {
        let mut sink = EmitterSink::new(EmitMode::Print, Vec::new());
        let doc = gazel_buildfile::parse("BUILD", b"y = 2\n").unwrap();
        sink.emit(Utf8Path::new("/nonexistent/BUILD"), &doc).unwrap();
        assert_eq!(sink.into_inner(), b"y = 2\n");
    }
}
