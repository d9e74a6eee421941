//! The slice of the host bundler's plugin protocol this crate relies on.
//!
//! A host exposes its resolved build options and a completion hook. [`BuildContext`] is a small
//! in-process host that drives registered plugins; the CLI uses it to run a completion pass from
//! a metafile written to disk, and embedders can use it from their own build loop.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{InjectError, Result};

/// Build options as resolved by the host bundler.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildOptions {
  /// Whether the bundler produces a metafile describing its outputs.
  pub metafile: bool,
  /// Directory the bundler writes its outputs to.
  pub outdir: Option<String>,
  /// Prefix prepended to output paths when they are referenced from HTML.
  pub public_path: Option<String>,
  /// Directory relative manifest paths are expressed against. Defaults to the process
  /// working directory.
  pub abs_working_dir: Option<PathBuf>,
}

/// Output manifest produced by the bundler for a single build.
///
/// Only the keys of `outputs` matter here; their order follows the metafile on disk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metafile {
  /// Metadata for every input file. Carried for completeness, never inspected.
  #[serde(default)]
  pub inputs: Map<String, Value>,
  /// Metadata keyed by output file path.
  #[serde(default)]
  pub outputs: Map<String, Value>,
}

impl Metafile {
  /// Build a metafile from bare output paths, keeping their order.
  pub fn from_outputs<I, S>(outputs: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      inputs: Map::new(),
      outputs: outputs
        .into_iter()
        .map(|path| (path.into(), Value::Object(Map::new())))
        .collect(),
    }
  }

  /// Output paths in manifest order.
  pub fn output_paths(&self) -> impl Iterator<Item = &str> {
    self.outputs.keys().map(String::as_str)
  }
}

/// Result handed to completion hooks after each build or rebuild.
#[derive(Debug, Clone, Default)]
pub struct BuildResult {
  /// Manifest for the build, present when manifest generation is enabled.
  pub metafile: Option<Metafile>,
}

impl BuildResult {
  /// Wrap a manifest in a build result.
  pub fn with_metafile(metafile: Metafile) -> Self {
    Self {
      metafile: Some(metafile),
    }
  }

  /// Load a metafile JSON document written by the bundler.
  pub fn from_metafile_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path).map_err(|source| InjectError::ConfigRead {
      path: path.to_path_buf(),
      source,
    })?;
    let metafile: Metafile =
      serde_json::from_str(&content).map_err(|source| InjectError::ConfigParse {
        path: path.to_path_buf(),
        source,
      })?;
    Ok(Self::with_metafile(metafile))
  }
}

/// Callback invoked once per completed build.
pub type OnEndCallback = Box<dyn FnMut(&BuildResult) -> Result<()> + Send>;

/// Build-context handle passed to [`Plugin::setup`].
pub trait PluginBuild {
  /// Options the build was started with.
  fn initial_options(&self) -> &BuildOptions;

  /// Register a callback to run after every build completes.
  fn on_end(&mut self, callback: OnEndCallback);
}

/// A plugin recognised by the host: a name plus a setup callback.
pub trait Plugin {
  /// Identifier reported to the host.
  fn name(&self) -> &str;

  /// Inspect the build options and attach hooks.
  fn setup(&self, build: &mut dyn PluginBuild) -> Result<()>;
}

/// Minimal host that owns build options and runs completion hooks in registration order.
pub struct BuildContext {
  options: BuildOptions,
  on_end: Vec<OnEndCallback>,
}

impl BuildContext {
  /// Create a context for a build configured with `options`.
  pub fn new(options: BuildOptions) -> Self {
    Self {
      options,
      on_end: Vec::new(),
    }
  }

  /// Run the plugin's setup against this context.
  pub fn register(&mut self, plugin: &dyn Plugin) -> Result<()> {
    tracing::debug!(plugin = plugin.name(), "Registering plugin");
    plugin.setup(self)
  }

  /// Signal a completed build. Hooks run in order and the first failure is returned.
  ///
  /// Calling this again models a rebuild in a watch session.
  pub fn finish(&mut self, result: &BuildResult) -> Result<()> {
    for callback in &mut self.on_end {
      callback(result)?;
    }
    Ok(())
  }
}

impl PluginBuild for BuildContext {
  fn initial_options(&self) -> &BuildOptions {
    &self.options
  }

  fn on_end(&mut self, callback: OnEndCallback) {
    self.on_end.push(callback);
  }
}
