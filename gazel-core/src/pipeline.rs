//! The generation pipeline, extracted from the CLI.
//!
//! I/O-agnostic: package discovery and build file emission go through the port traits.

use crate::ports::{BuildFileSink, PackageSource};
use crate::settings::{Layout, Settings};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use gazel_domain::{Generator, ResolveError};
use gazel_edit::{EditError, reconcile, reconcile_root};
use gazel_packages::PackageError;
use gazel_types::{PackageDescriptor, Rule};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GazelError {
    #[error("a go prefix is required")]
    MissingPrefix,

    #[error("failed to generate rules for package {dir:?}")]
    Generate {
        /// Package directory relative to the base directory.
        dir: String,
        #[source]
        source: ResolveError,
    },

    #[error("dir {dir} is not under the base dir {base}")]
    OutsideBase { dir: Utf8PathBuf, base: Utf8PathBuf },

    #[error("failed to resolve {path}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error(transparent)]
    Edit(#[from] EditError),
}

/// One command-line package directory. A trailing `/...` requests every package below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub dir: Utf8PathBuf,
    pub recursive: bool,
}

impl Target {
    pub fn parse(arg: &str) -> Self {
        let trimmed = arg.trim_end_matches('/');
        let (dir, recursive) = match trimmed.strip_suffix("...") {
            Some(rest) if rest.is_empty() || rest.ends_with('/') => {
                (rest.trim_end_matches('/'), true)
            }
            _ => (trimmed, false),
        };
        let dir = if dir.is_empty() {
            if arg.starts_with('/') { "/" } else { "." }
        } else {
            dir
        };
        Self {
            dir: Utf8PathBuf::from(dir),
            recursive,
        }
    }
}

/// What a run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Packages rules were generated for.
    pub packages: usize,
    /// Build files passed to the sink.
    pub files_emitted: usize,
    pub rules_generated: usize,
}

/// Generate and emit build files for every target.
///
/// Targets are processed in order. In the structured layout each package's build file is emitted
/// as soon as its rules exist, so a failure leaves earlier directories emitted. The first error
/// stops the run.
pub fn run(
    settings: &Settings,
    targets: &[Target],
    source: &dyn PackageSource,
    sink: &mut dyn BuildFileSink,
) -> Result<RunSummary, GazelError> {
    if settings.go_prefix.is_empty() {
        return Err(GazelError::MissingPrefix);
    }

    let mut run = Run {
        settings,
        generator: Generator::for_mode(settings.go_prefix.clone(), settings.layout.internal_mode()),
        base: absolute(&settings.base_dir)?,
        sink,
        summary: RunSummary::default(),
    };
    for target in targets {
        run.target(target, source)?;
    }
    Ok(run.summary)
}

struct Run<'a> {
    settings: &'a Settings,
    generator: Generator,
    base: Utf8PathBuf,
    sink: &'a mut dyn BuildFileSink,
    summary: RunSummary,
}

impl Run<'_> {
    fn target(&mut self, target: &Target, source: &dyn PackageSource) -> Result<(), GazelError> {
        let root = absolute(&target.dir)?;
        let root_rel = relative_dir(&self.base, &root).ok_or_else(|| GazelError::OutsideBase {
            dir: root.clone(),
            base: self.base.clone(),
        })?;
        debug!(root = %root, recursive = target.recursive, "processing target");

        let mut collected: Vec<Rule> = Vec::new();
        let mut root_emitted = false;
        let mut on_package = |rel: &str, pkg: PackageDescriptor| -> Result<(), GazelError> {
            let dir = join_rel(&root_rel, rel);
            let rules = self.generate(&dir, &pkg)?;
            match self.settings.layout {
                Layout::Structured => {
                    root_emitted |= dir.is_empty();
                    self.emit(&dir, &rules)
                }
                Layout::Flat => {
                    collected.extend(rules);
                    Ok(())
                }
            }
        };

        if target.recursive {
            source.walk(&root, &mut on_package)?;
        } else if let Some(pkg) = source.import_dir(&root)? {
            on_package("", pkg)?;
        } else {
            debug!(root = %root, "no buildable Go files");
        }

        match self.settings.layout {
            Layout::Structured if root_rel.is_empty() && !root_emitted => self.emit("", &[]),
            Layout::Structured => Ok(()),
            Layout::Flat => self.emit(&root_rel, &collected),
        }
    }

    fn generate(&mut self, dir: &str, pkg: &PackageDescriptor) -> Result<Vec<Rule>, GazelError> {
        let rules = self
            .generator
            .generate(dir, pkg)
            .map_err(|source| GazelError::Generate {
                dir: dir.to_string(),
                source,
            })?;
        self.summary.packages += 1;
        self.summary.rules_generated += rules.len();
        Ok(rules)
    }

    /// Reconcile and emit the build file of `dir`, relative to the base directory.
    fn emit(&mut self, dir: &str, rules: &[Rule]) -> Result<(), GazelError> {
        let dir_path = if dir.is_empty() {
            self.base.clone()
        } else {
            self.base.join(dir)
        };
        let path = dir_path.join(&self.settings.build_file_name);
        let existing = self.sink.load(&path)?;
        let doc = if dir.is_empty() {
            reconcile_root(path.as_str(), existing.as_deref(), &self.settings.go_prefix, rules)?
        } else {
            reconcile(path.as_str(), existing.as_deref(), rules)?
        };
        self.sink.emit(&path, &doc)?;
        self.summary.files_emitted += 1;
        Ok(())
    }
}

/// Absolute, lexically cleaned form of `path`. Symlinks are not resolved.
fn absolute(path: &Utf8Path) -> Result<Utf8PathBuf, GazelError> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let io_err = |source| GazelError::Io {
            path: path.to_path_buf(),
            source,
        };
        let cwd = std::env::current_dir().map_err(io_err)?;
        let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(|_| {
            io_err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "current directory is not valid UTF-8",
            ))
        })?;
        cwd.join(path)
    };

    let mut out = Utf8PathBuf::new();
    for component in joined.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_str()),
        }
    }
    Ok(out)
}

/// `dir` relative to `base`, slash separated; `None` when `dir` is outside `base`.
fn relative_dir(base: &Utf8Path, dir: &Utf8Path) -> Option<String> {
    let rel = dir.strip_prefix(base).ok()?;
    Some(
        rel.components()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join("/"),
    )
}

fn join_rel(root: &str, rel: &str) -> String {
    match (root.is_empty(), rel.is_empty()) {
        (true, _) => rel.to_string(),
        (false, true) => root.to_string(),
        (false, false) => format!("{root}/{rel}"),
    }
}
