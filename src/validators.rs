//! Guards on the host's configuration and on each build result.

use std::env;
use std::path::PathBuf;

use crate::asset_paths::{absolutize, normalize};
use crate::error::{InjectError, Result};
use crate::host::{BuildOptions, BuildResult, Metafile};

/// Build options narrowed to the fields the plugin depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupConfig {
  /// Non-empty output directory, as written in the build options.
  pub outdir: String,
  /// Public path prefix, if any.
  pub public_path: Option<String>,
  /// Absolute directory relative paths are resolved against.
  pub working_dir: PathBuf,
}

/// Check that manifest generation is on and an output directory is configured.
pub fn validate_setup(options: &BuildOptions) -> Result<SetupConfig> {
  if !options.metafile {
    return Err(InjectError::MissingManifest);
  }

  let outdir = match options.outdir.as_deref() {
    Some(outdir) if !outdir.is_empty() => outdir.to_string(),
    _ => return Err(InjectError::MissingOutdir),
  };

  let working_dir = match options.abs_working_dir.as_deref() {
    Some(dir) if dir.is_absolute() => normalize(dir),
    dir => {
      let cwd = env::current_dir().map_err(InjectError::WorkingDir)?;
      match dir {
        Some(dir) => absolutize(&cwd, dir),
        None => cwd,
      }
    }
  };

  Ok(SetupConfig {
    outdir,
    public_path: options.public_path.clone(),
    working_dir,
  })
}

/// Check that a completed build carries its manifest.
pub fn validate_result(result: &BuildResult) -> Result<&Metafile> {
  result.metafile.as_ref().ok_or(InjectError::MissingManifest)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::asset_paths::PathResolver;

  fn options(metafile: bool, outdir: Option<&str>) -> BuildOptions {
    BuildOptions {
      metafile,
      outdir: outdir.map(str::to_string),
      public_path: None,
      abs_working_dir: Some(PathBuf::from("/work")),
    }
  }

  #[test]
  fn accepts_complete_options() {
    let config = validate_setup(&options(true, Some("1"))).unwrap();
    assert_eq!(config.outdir, "1");
    assert_eq!(config.working_dir, PathBuf::from("/work"));
    assert_eq!(config.public_path, None);
  }

  #[test]
  fn requires_metafile() {
    let error = validate_setup(&options(false, Some("1"))).unwrap_err();
    assert!(matches!(error, InjectError::MissingManifest));
    assert_eq!(
      error.to_string(),
      "inject-preload: \"metafile\" parameter must be set to \"true\" in build config"
    );
  }

  #[test]
  fn requires_non_empty_outdir() {
    for outdir in [None, Some("")] {
      let error = validate_setup(&options(true, outdir)).unwrap_err();
      assert!(matches!(error, InjectError::MissingOutdir), "{outdir:?}");
    }
  }

  #[test]
  fn checks_metafile_before_outdir() {
    assert!(matches!(
      validate_setup(&options(false, None)),
      Err(InjectError::MissingManifest)
    ));
  }

  #[test]
  fn falls_back_to_process_working_directory() {
    let mut options = options(true, Some("dist"));
    options.abs_working_dir = None;
    let config = validate_setup(&options).unwrap();
    assert_eq!(config.working_dir, env::current_dir().unwrap());
  }

  #[test]
  fn anchors_relative_working_directory_on_process_directory() {
    let mut options = options(true, Some("dist"));
    options.abs_working_dir = Some(PathBuf::from("proj/./site/.."));
    let config = validate_setup(&options).unwrap();
    assert_eq!(config.working_dir, env::current_dir().unwrap().join("proj"));
    assert!(config.working_dir.is_absolute());
  }

  #[test]
  fn outdir_spelling_does_not_matter_with_relative_working_directory() {
    let absolute_outdir = env::current_dir().unwrap().join("proj").join("dist");
    let resolve = |outdir: &str| {
      let mut options = options(true, Some(outdir));
      options.abs_working_dir = Some(PathBuf::from("proj"));
      let config = validate_setup(&options).unwrap();
      PathResolver::new(&config.working_dir, &config.outdir, None).resolve("dist/js/entry.js")
    };

    assert_eq!(resolve("dist"), "js/entry.js");
    assert_eq!(resolve(absolute_outdir.to_str().unwrap()), "js/entry.js");
  }

  #[test]
  fn result_must_carry_manifest() {
    assert!(validate_result(&BuildResult::with_metafile(Metafile::default())).is_ok());
    assert!(matches!(
      validate_result(&BuildResult::default()),
      Err(InjectError::MissingManifest)
    ));
  }
}
