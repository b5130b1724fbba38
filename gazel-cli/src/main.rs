mod config;

use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Parser;
use config::{CliOverrides, ConfigMerger};
use gazel_core::adapters::{EmitterSink, FsPackageSource};
use gazel_core::{EmitMode, Settings, Target};
use std::io::Write;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "gazel",
    version,
    about = "BUILD file generator for Go projects.",
    long_about = "BUILD file generator for Go projects.\n\n\
        Takes a list of Go package directories. A directory ending in \"/...\" also \
        processes every package below it. All directories must be under --base-dir.\n\n\
        In print mode, reconciled BUILD files are written to stdout. In fix mode, BUILD \
        files are created or updated in place. In diff mode, the changes are shown as a \
        unified diff."
)]
struct Cli {
    /// go_prefix of the target workspace.
    #[arg(long, env = "GAZEL_GO_PREFIX")]
    go_prefix: Option<String>,

    /// Directory which corresponds to go_prefix (default: the only package directory).
    #[arg(long)]
    base_dir: Option<Utf8PathBuf>,

    /// Create one large BUILD file at the top of the target instead of one per Go package.
    #[arg(long, default_value_t = false)]
    flat: bool,

    /// print, fix or diff (default: print).
    #[arg(long)]
    mode: Option<EmitMode>,

    /// Name of the generated build files (default: BUILD).
    #[arg(long)]
    build_file_name: Option<String>,

    /// Go package directories.
    dirs: Vec<String>,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let base_dir = match &cli.base_dir {
        Some(dir) => dir.clone(),
        None => match cli.dirs.as_slice() {
            [only] => Target::parse(only).dir,
            _ => bail!("--base-dir is required unless exactly one package directory is given"),
        },
    };

    let file_config = config::load_or_default(&base_dir)?;
    let merged = ConfigMerger::new(file_config).merge_args(&CliOverrides {
        go_prefix: cli.go_prefix.as_deref(),
        flat: cli.flat,
        mode: cli.mode,
        build_file_name: cli.build_file_name.as_deref(),
    });
    debug!(?merged, base_dir = %base_dir, "resolved configuration");

    let Some(go_prefix) = merged.go_prefix else {
        bail!("--go-prefix is required");
    };
    if cli.dirs.len() > 1 && merged.layout == gazel_core::Layout::Flat {
        bail!("can have only one package directory with --flat");
    }

    let settings = Settings {
        base_dir,
        go_prefix,
        layout: merged.layout,
        mode: merged.mode,
        build_file_name: merged.build_file_name,
    };
    let targets: Vec<Target> = cli.dirs.iter().map(|d| Target::parse(d)).collect();

    let stdout = std::io::stdout();
    let mut sink = EmitterSink::new(settings.mode, stdout.lock());
    let summary = gazel_core::run(&settings, &targets, &FsPackageSource, &mut sink)
        .with_context(|| format!("generate build files under {}", settings.base_dir))?;
    sink.into_inner().flush().context("flush stdout")?;

    info!(
        packages = summary.packages,
        files = summary.files_emitted,
        rules = summary.rules_generated,
        mode = %settings.mode,
        "done"
    );
    Ok(())
}
