#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod config;
pub mod error;
pub mod formatters;
pub mod host;
pub mod options;
pub mod plugin;
pub mod template;
pub mod validators;

/// Identifier reported to the host and prefixed to every error message.
pub const PLUGIN_NAME: &str = "inject-preload";

pub use config::InjectConfig;
pub use error::{InjectError, Result};
pub use formatters::{AssetFilter, PreloadLink, ScriptTag, TemplateFormatter};
pub use host::{BuildContext, BuildOptions, BuildResult, Metafile, Plugin, PluginBuild};
pub use options::{InjectRule, PathFormatter};
pub use plugin::{InjectPreloadPlugin, inject_preload};
