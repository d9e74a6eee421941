//! The plugin object handed to the host bundler.

use std::sync::Arc;

use crate::PLUGIN_NAME;
use crate::asset_paths::PathResolver;
use crate::error::Result;
use crate::host::{BuildResult, Plugin, PluginBuild};
use crate::options::{InjectRule, validate_rules};
use crate::template::{PreparedRule, rewrite_templates};
use crate::validators::{SetupConfig, validate_result, validate_setup};

/// Fills template placeholders from the bundler's output manifest after every build.
#[derive(Debug, Clone)]
pub struct InjectPreloadPlugin {
  rules: Arc<[PreparedRule]>,
}

/// Shorthand for [`InjectPreloadPlugin::new`].
pub fn inject_preload(rules: Vec<InjectRule>) -> Result<InjectPreloadPlugin> {
  InjectPreloadPlugin::new(rules)
}

impl InjectPreloadPlugin {
  /// Validate `rules` and prepare their placeholder patterns.
  ///
  /// Fails with [`InjectError::InvalidOptions`](crate::InjectError::InvalidOptions) before the
  /// host is involved at all.
  pub fn new(rules: Vec<InjectRule>) -> Result<Self> {
    validate_rules(&rules)?;
    let rules = rules
      .into_iter()
      .map(PreparedRule::new)
      .collect::<Result<Vec<_>>>()?;

    Ok(Self {
      rules: rules.into(),
    })
  }

  /// Prepared rules, in processing order.
  pub fn rules(&self) -> &[PreparedRule] {
    &self.rules
  }
}

impl Plugin for InjectPreloadPlugin {
  fn name(&self) -> &str {
    PLUGIN_NAME
  }

  fn setup(&self, build: &mut dyn PluginBuild) -> Result<()> {
    let config = validate_setup(build.initial_options())?;
    let rules = Arc::clone(&self.rules);

    build.on_end(Box::new(move |result: &BuildResult| on_end(&config, &rules, result)));
    Ok(())
  }
}

/// Completion hook: validate the result, resolve every output path, rewrite each template.
fn on_end(config: &SetupConfig, rules: &[PreparedRule], result: &BuildResult) -> Result<()> {
  let metafile = validate_result(result)?;

  let resolver = PathResolver::new(
    &config.working_dir,
    &config.outdir,
    config.public_path.as_deref(),
  );
  let paths: Vec<String> = metafile
    .output_paths()
    .map(|output| resolver.resolve(output))
    .collect();

  rewrite_templates(rules, &paths)?;

  tracing::info!(
    outdir = %resolver.outdir().display(),
    outputs = paths.len(),
    rules = rules.len(),
    "Injected build outputs into templates"
  );
  Ok(())
}
