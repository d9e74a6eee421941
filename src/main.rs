//! Command-line entry point: run one completion pass from a metafile on disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use inject_preload::asset_paths::absolutize;
use inject_preload::config::DEFAULT_CONFIG_FILE;
use inject_preload::{BuildContext, BuildOptions, BuildResult, InjectConfig, InjectPreloadPlugin};

/// Inject references to a bundler's output files into HTML template placeholders.
#[derive(Debug, Parser)]
#[command(name = "inject-preload", version, about)]
struct Cli {
  /// Metafile JSON written by the bundler.
  #[arg(long)]
  metafile: PathBuf,

  /// Rule configuration file.
  #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
  config: PathBuf,

  /// Bundler output directory. Overrides `outdir` from the configuration file.
  #[arg(long)]
  outdir: Option<String>,

  /// Public path prefix. Overrides `publicPath` from the configuration file.
  #[arg(long)]
  public_path: Option<String>,

  /// Directory relative paths in the metafile and configuration are resolved against.
  #[arg(long)]
  working_dir: Option<PathBuf>,
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  if let Err(err) = run(Cli::parse()) {
    eprintln!("Error: {err:#}");
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  let cwd = std::env::current_dir().context("failed to determine the working directory")?;
  let working_dir = match cli.working_dir {
    Some(dir) => absolutize(&cwd, &dir),
    None => cwd,
  };

  let config_path = anchor(&working_dir, &cli.config);
  let config = InjectConfig::from_path(&config_path)?;
  let rules = config
    .rules(&working_dir)
    .with_context(|| format!("invalid rules in {}", config_path.display()))?;
  let plugin = InjectPreloadPlugin::new(rules)?;

  let options = build_options(cli.outdir, cli.public_path, &config, &working_dir)?;

  let mut build = BuildContext::new(options);
  build.register(&plugin)?;

  let result = BuildResult::from_metafile_path(&anchor(&working_dir, &cli.metafile))?;
  build.finish(&result)?;
  Ok(())
}

/// Merge command-line flags over the configuration file. Flags win.
fn build_options(
  outdir: Option<String>,
  public_path: Option<String>,
  config: &InjectConfig,
  working_dir: &Path,
) -> Result<BuildOptions> {
  let outdir = outdir
    .or_else(|| config.outdir.clone())
    .ok_or_else(|| anyhow!("no output directory: pass --outdir or set \"outdir\" in the config"))?;

  Ok(BuildOptions {
    metafile: true,
    outdir: Some(outdir),
    public_path: public_path.or_else(|| config.public_path.clone()),
    abs_working_dir: Some(working_dir.to_path_buf()),
  })
}

fn anchor(base: &Path, path: &Path) -> PathBuf {
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    base.join(path)
  }
}
