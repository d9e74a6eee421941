//! Error type shared by validation, configuration loading and template rewriting.

use std::path::PathBuf;

use crate::PLUGIN_NAME;

/// Convenience alias used throughout the crate.
pub type Result<T, E = InjectError> = std::result::Result<T, E>;

/// Errors raised while constructing the plugin or processing a build.
///
/// Every message is prefixed with [`PLUGIN_NAME`] so the host can attribute the failure.
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
  /// The rule set handed to the plugin is malformed.
  #[error("{prefix}: {0}", prefix = PLUGIN_NAME)]
  InvalidOptions(String),

  /// Manifest generation is disabled or the build result carries no manifest.
  #[error(
    "{prefix}: \"metafile\" parameter must be set to \"true\" in build config",
    prefix = PLUGIN_NAME
  )]
  MissingManifest,

  /// The build was configured without an output directory.
  #[error("{prefix}: \"outdir\" parameter must be set in build config", prefix = PLUGIN_NAME)]
  MissingOutdir,

  /// A template file could not be read.
  #[error("{prefix}: failed to read {}: {source}", .path.display(), prefix = PLUGIN_NAME)]
  FileRead {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },

  /// A template file could not be written back.
  #[error("{prefix}: failed to write {}: {source}", .path.display(), prefix = PLUGIN_NAME)]
  FileWrite {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },

  /// The process working directory could not be determined.
  #[error("{prefix}: failed to determine the working directory: {0}", prefix = PLUGIN_NAME)]
  WorkingDir(#[source] std::io::Error),

  /// A JSON configuration or metafile could not be read from disk.
  #[error("{prefix}: failed to read {}: {source}", .path.display(), prefix = PLUGIN_NAME)]
  ConfigRead {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },

  /// A JSON configuration or metafile could not be parsed.
  #[error("{prefix}: failed to parse {}: {source}", .path.display(), prefix = PLUGIN_NAME)]
  ConfigParse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
}

impl InjectError {
  pub(crate) fn invalid_options(message: impl Into<String>) -> Self {
    Self::InvalidOptions(message.into())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn messages_carry_plugin_prefix() {
    let error = InjectError::invalid_options("Options must be an array");
    assert_eq!(error.to_string(), "inject-preload: Options must be an array");

    assert_eq!(
      InjectError::MissingOutdir.to_string(),
      "inject-preload: \"outdir\" parameter must be set in build config"
    );
    assert_eq!(
      InjectError::MissingManifest.to_string(),
      "inject-preload: \"metafile\" parameter must be set to \"true\" in build config"
    );
  }

  #[test]
  fn io_errors_name_the_template() {
    let error = InjectError::FileRead {
      path: PathBuf::from("public/index.html"),
      source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
    };

    let message = error.to_string();
    assert!(message.starts_with("inject-preload: failed to read public/index.html"));
    assert!(message.ends_with("missing"));
  }

  #[test]
  fn working_dir_error_keeps_source() {
    let error = InjectError::WorkingDir(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
    assert_eq!(
      error.to_string(),
      "inject-preload: failed to determine the working directory: gone"
    );
    assert!(std::error::Error::source(&error).is_some());
  }
}
