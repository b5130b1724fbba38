//! Clap-free settings for the generation pipeline.

use camino::Utf8PathBuf;
use gazel_domain::InternalMode;
use gazel_edit::EmitMode;

/// Build file used when nothing else is configured.
pub const DEFAULT_BUILD_FILE_NAME: &str = "BUILD";

/// How build files are laid out across the repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// One build file per package directory.
    #[default]
    Structured,
    /// A single build file at the target root for every package below it.
    Flat,
}

impl Layout {
    pub fn internal_mode(self) -> InternalMode {
        match self {
            Layout::Structured => InternalMode::Structured,
            Layout::Flat => InternalMode::Flat,
        }
    }
}

/// Settings for [`run`](crate::pipeline::run).
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory corresponding to `go_prefix`.
    pub base_dir: Utf8PathBuf,
    /// Import path of the repository root.
    pub go_prefix: String,
    pub layout: Layout,
    pub mode: EmitMode,
    pub build_file_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: Utf8PathBuf::from("."),
            go_prefix: String::new(),
            layout: Layout::default(),
            mode: EmitMode::default(),
            build_file_name: DEFAULT_BUILD_FILE_NAME.to_string(),
        }
    }
}
