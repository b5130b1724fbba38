//! Configuration file loading for gazel.
//!
//! Discovers and loads `gazel.toml` from the base directory.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use gazel_core::settings::DEFAULT_BUILD_FILE_NAME;
use gazel_core::{EmitMode, Layout};
use serde::{Deserialize, Deserializer};
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "gazel.toml";

/// Top-level configuration from gazel.toml.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GazelConfig {
    /// Import path of the repository root.
    pub go_prefix: Option<String>,

    /// Generate a single build file at the top of each target.
    pub flat: bool,

    /// Emission mode: `print`, `fix` or `diff`.
    #[serde(deserialize_with = "deserialize_mode")]
    pub mode: Option<EmitMode>,

    /// Name of generated build files.
    pub build_file_name: Option<String>,
}

fn deserialize_mode<'de, D>(deserializer: D) -> Result<Option<EmitMode>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|s| s.parse().map_err(serde::de::Error::custom))
        .transpose()
}

/// Discover the gazel.toml config file.
///
/// Returns `None` if `base_dir` has no config file.
pub fn discover_config(base_dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = base_dir.join(CONFIG_FILE_NAME);
    if config_path.is_file() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a gazel.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<GazelConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<GazelConfig> {
    let config: GazelConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the base directory, or return default if not found.
pub fn load_or_default(base_dir: &Utf8Path) -> anyhow::Result<GazelConfig> {
    match discover_config(base_dir) {
        Some(path) => load_config(&path),
        None => Ok(GazelConfig::default()),
    }
}

/// Configuration after merging the config file with CLI arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedConfig {
    /// `None` when neither the CLI nor the config file names a prefix.
    pub go_prefix: Option<String>,
    pub layout: Layout,
    pub mode: EmitMode,
    pub build_file_name: String,
}

/// CLI values that take part in the merge. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides<'a> {
    pub go_prefix: Option<&'a str>,
    pub flat: bool,
    pub mode: Option<EmitMode>,
    pub build_file_name: Option<&'a str>,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: GazelConfig,
}

impl ConfigMerger {
    /// Create a new merger from a loaded config.
    pub fn new(config: GazelConfig) -> Self {
        Self { config }
    }

    /// Merge with CLI arguments.
    ///
    /// Values given on the command line replace the config file's. `--flat` can only turn the
    /// flat layout on. Empty strings count as absent.
    pub fn merge_args(self, cli: &CliOverrides<'_>) -> MergedConfig {
        let go_prefix = non_empty(cli.go_prefix.map(str::to_string))
            .or_else(|| non_empty(self.config.go_prefix));
        let layout = if cli.flat || self.config.flat {
            Layout::Flat
        } else {
            Layout::Structured
        };
        let build_file_name = non_empty(cli.build_file_name.map(str::to_string))
            .or_else(|| non_empty(self.config.build_file_name))
            .unwrap_or_else(|| DEFAULT_BUILD_FILE_NAME.to_string());

        MergedConfig {
            go_prefix,
            layout,
            mode: cli.mode.or(self.config.mode).unwrap_or_default(),
            build_file_name,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
