use crate::error::PackageError;
use crate::import::import_dir;
use camino::{Utf8Path, Utf8PathBuf};
use gazel_types::PackageDescriptor;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Visit every Go package under `root`, depth first in file name order.
///
/// `visit` receives the package directory relative to `root`, slash separated, with `""` for
/// `root` itself. Directories named `testdata` or starting with `.` or `_` are not entered,
/// except `root`. The first error from introspection or from `visit` stops the walk.
pub fn walk<F, E>(root: &Utf8Path, mut visit: F) -> Result<(), E>
where
    F: FnMut(&str, PackageDescriptor) -> Result<(), E>,
    E: From<PackageError>,
{
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e));

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(|p| Utf8PathBuf::from(p.to_string_lossy().into_owned()))
                .unwrap_or_else(|| root.to_path_buf());
            PackageError::io(path, e.into())
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let dir = Utf8Path::from_path(entry.path()).ok_or_else(|| {
            PackageError::io(
                entry.path().to_string_lossy().into_owned(),
                std::io::Error::new(std::io::ErrorKind::InvalidData, "path is not valid UTF-8"),
            )
        })?;
        let rel = relative_dir(root, dir);
        match import_dir(dir)? {
            Some(pkg) => visit(&rel, pkg)?,
            None => debug!(dir = %rel, "skipping directory without Go package"),
        }
    }
    Ok(())
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name == "testdata" || name.starts_with('.') || name.starts_with('_'))
}

fn relative_dir(root: &Utf8Path, dir: &Utf8Path) -> String {
    dir.strip_prefix(root)
        .map(|rel| {
            rel.components()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default()
}
