//! Emission policies for reconciled build files.

use crate::error::{EditError, EditResult};
use crate::load_existing;
use camino::Utf8Path;
use diffy::PatchFormatter;
use fs_err as fs;
use gazel_buildfile::{BuildFile, format};
use std::fmt;
use std::io::{ErrorKind, Write};
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// What to do with a reconciled build file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitMode {
    /// Write the result to standard output.
    #[default]
    Print,
    /// Create or replace the file in place.
    Fix,
    /// Show a unified diff against the current file.
    Diff,
}

impl EmitMode {
    pub const ALL: [EmitMode; 3] = [EmitMode::Print, EmitMode::Fix, EmitMode::Diff];

    pub fn as_str(self) -> &'static str {
        match self {
            EmitMode::Print => "print",
            EmitMode::Fix => "fix",
            EmitMode::Diff => "diff",
        }
    }

    /// Whether emitting in this mode changes files on disk.
    pub fn mutates(self) -> bool {
        self == EmitMode::Fix
    }
}

impl fmt::Display for EmitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown mode {s:?} (expected print, fix or diff)"))
    }
}

/// Emit `doc`, the reconciled content of `path`, according to `mode`.
///
/// `out` receives the printed file or the diff; it is unused in fix mode.
pub fn emit(
    mode: EmitMode,
    out: &mut dyn Write,
    path: &Utf8Path,
    doc: &BuildFile,
) -> EditResult<()> {
    match mode {
        EmitMode::Print => print_file(out, doc),
        EmitMode::Fix => fix_file(path, doc),
        EmitMode::Diff => diff_file(out, path, doc),
    }
}

/// Write the formatted document to `out`.
pub fn print_file(out: &mut dyn Write, doc: &BuildFile) -> EditResult<()> {
    out.write_all(format(doc).as_bytes())
        .and_then(|()| out.flush())
        .map_err(|e| EditError::io("print", doc.path.as_str(), e))
}

/// Replace `path` with the formatted document.
///
/// The content goes to a temporary file in the same directory which is then renamed over the
/// target, so the target is never observed half-written.
pub fn fix_file(path: &Utf8Path, doc: &BuildFile) -> EditResult<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or(Utf8Path::new("."));
    let mut tmp =
        NamedTempFile::new_in(dir).map_err(|e| EditError::io("create temporary file in", dir, e))?;
    tmp.write_all(format(doc).as_bytes())
        .map_err(|e| EditError::io("write temporary file for", path, e))?;
    keep_permissions(path, &tmp)?;
    tmp.persist(path)
        .map_err(|e| EditError::io("replace", path, e.error))?;
    info!(path = %path, "wrote build file");
    Ok(())
}

/// Temporary files are private; give the result the permissions of the file it replaces.
#[cfg(unix)]
fn keep_permissions(path: &Utf8Path, tmp: &NamedTempFile) -> EditResult<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = existing_mode(path)?.unwrap_or(0o644);
    tmp.as_file()
        .set_permissions(std::fs::Permissions::from_mode(mode))
        .map_err(|e| EditError::io("set permissions for", path, e))
}

/// Mode bits of `path`, or `None` when it doesn't exist yet.
#[cfg(unix)]
fn existing_mode(path: &Utf8Path) -> EditResult<Option<u32>> {
    use std::os::unix::fs::PermissionsExt;

    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.permissions().mode())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(EditError::io("stat", path, e)),
    }
}

#[cfg(not(unix))]
fn keep_permissions(_path: &Utf8Path, _tmp: &NamedTempFile) -> EditResult<()> {
    Ok(())
}

/// Write a unified diff between the current `path` and the formatted document to `out`.
///
/// The formatted result goes through a scratch file; `path` itself is never touched. Nothing is
/// written when the content is unchanged.
pub fn diff_file(out: &mut dyn Write, path: &Utf8Path, doc: &BuildFile) -> EditResult<()> {
    let mut scratch =
        NamedTempFile::new().map_err(|e| EditError::io("create scratch file for", path, e))?;
    scratch
        .write_all(format(doc).as_bytes())
        .map_err(|e| EditError::io("write scratch file for", path, e))?;
    let new = fs::read_to_string(scratch.path())
        .map_err(|e| EditError::io("read scratch file for", path, e))?;

    let old = load_existing(path)?.map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
    if old.as_deref() == Some(new.as_str()) {
        debug!(path = %path, "build file unchanged");
        return Ok(());
    }

    let patch = render_patch(path, old.as_deref(), &new);
    out.write_all(patch.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|e| EditError::io("print diff for", path, e))
}

fn render_patch(path: &Utf8Path, old: Option<&str>, new: &str) -> String {
    let original = match old {
        Some(_) => format!("a/{path}"),
        None => "/dev/null".to_string(),
    };
    let patch = diffy::create_patch(old.unwrap_or(""), new);
    let body = PatchFormatter::new().fmt_patch(&patch).to_string();
    let hunks: String = body
        .split_inclusive('\n')
        .skip_while(|line| line.starts_with("--- ") || line.starts_with("+++ "))
        .collect();

    let mut out = format!("--- {original}\n+++ b/{path}\n{hunks}");
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}
