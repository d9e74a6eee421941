//! Rule sets described in a JSON file instead of Rust code.
//!
//! The file carries the same information as a programmatic rule set, with the per-path formatter
//! expressed declaratively (see [`FormatterConfig`]). Because the input is untyped JSON, its shape
//! is checked field by field before deserialization so callers get a precise message.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{InjectError, Result};
use crate::formatters::{AssetFilter, PreloadLink, ScriptTag, TemplateFormatter};
use crate::options::{InjectRule, PathFormatter, validate_replace};

/// File name looked up when no configuration path is given.
pub const DEFAULT_CONFIG_FILE: &str = "inject-preload.json";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InjectConfig {
  /// Output directory of the bundler, when not supplied elsewhere.
  pub outdir: Option<String>,
  /// Public path prefix, when not supplied elsewhere.
  pub public_path: Option<String>,
  /// Raw rule set. Checked with [`validate_options_value`] before use.
  pub rules: Value,
}

impl InjectConfig {
  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path).map_err(|source| InjectError::ConfigRead {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| InjectError::ConfigParse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Build the rule set. Relative template paths are joined onto `base_dir`.
  pub fn rules(&self, base_dir: &Path) -> Result<Vec<InjectRule>> {
    Ok(
      rules_from_value(&self.rules)?
        .into_iter()
        .map(|rule| rule.relative_to(base_dir))
        .collect(),
    )
  }
}

/// Declarative replacement for the per-path formatter function.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FormatterConfig {
  /// `<link rel="preload">` tags.
  Preload {
    /// Required file suffix.
    #[serde(default)]
    ext: Option<String>,
    /// Regular expression the path must match.
    #[serde(default)]
    test: Option<String>,
    /// Value of the `as` attribute.
    #[serde(rename = "linkType")]
    link_type: String,
    /// Emit `crossorigin="anonymous"`.
    #[serde(default = "enabled")]
    crossorigin: bool,
  },
  /// `<script src>` tags.
  Script {
    /// Required file suffix.
    #[serde(default)]
    ext: Option<String>,
    /// Regular expression the path must match.
    #[serde(default)]
    test: Option<String>,
    /// Emit `defer=""`.
    #[serde(default = "enabled")]
    defer: bool,
  },
  /// Free-form markup with `[path]` tokens.
  Template {
    /// Required file suffix.
    #[serde(default)]
    ext: Option<String>,
    /// Regular expression the path must match.
    #[serde(default)]
    test: Option<String>,
    /// Markup to render per path.
    template: String,
  },
}

fn enabled() -> bool {
  true
}

impl FormatterConfig {
  /// Compile into a formatter usable by an [`InjectRule`].
  pub fn into_formatter(self) -> Result<Arc<dyn PathFormatter>> {
    let formatter: Arc<dyn PathFormatter> = match self {
      Self::Preload {
        ext,
        test,
        link_type,
        crossorigin,
      } => Arc::new(PreloadLink {
        filter: compile_filter(ext, test)?,
        link_type,
        crossorigin,
      }),
      Self::Script { ext, test, defer } => Arc::new(ScriptTag {
        filter: compile_filter(ext, test)?,
        defer,
      }),
      Self::Template {
        ext,
        test,
        template,
      } => Arc::new(TemplateFormatter {
        filter: compile_filter(ext, test)?,
        template,
      }),
    };
    Ok(formatter)
  }
}

fn compile_filter(ext: Option<String>, test: Option<String>) -> Result<AssetFilter> {
  let test = test
    .map(|pattern| {
      Regex::new(&pattern).map_err(|err| {
        InjectError::invalid_options(format!("The \"test\" pattern {pattern:?} is invalid: {err}"))
      })
    })
    .transpose()?;
  Ok(AssetFilter { ext, test })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleConfig {
  template_path: PathBuf,
  replace: String,
  #[serde(rename = "as")]
  formatter: FormatterConfig,
}

/// Check the shape of an untyped rule set.
pub fn validate_options_value(value: &Value) -> Result<()> {
  let items = value
    .as_array()
    .ok_or_else(|| InjectError::invalid_options("Options must be an array"))?;

  for item in items {
    let record = item
      .as_object()
      .ok_or_else(|| InjectError::invalid_options("Option item must be a plain object"))?;

    let template_path = record
      .get("templatePath")
      .and_then(Value::as_str)
      .ok_or_else(|| {
        InjectError::invalid_options("The \"templatePath\" parameter must be a string")
      })?;
    if template_path.is_empty() {
      return Err(InjectError::invalid_options(
        "The \"templatePath\" parameter must be a non-empty string",
      ));
    }

    let replace = record
      .get("replace")
      .and_then(Value::as_str)
      .ok_or_else(|| InjectError::invalid_options("The \"replace\" parameter must be a string"))?;
    validate_replace(replace)?;

    let is_formatter = record
      .get("as")
      .and_then(Value::as_object)
      .is_some_and(|formatter| formatter.get("kind").is_some_and(Value::is_string));
    if !is_formatter {
      return Err(InjectError::invalid_options(
        "The \"as\" parameter must be a formatter object",
      ));
    }
  }

  Ok(())
}

/// Validate and compile an untyped rule set, keeping template paths as written.
pub fn rules_from_value(value: &Value) -> Result<Vec<InjectRule>> {
  validate_options_value(value)?;

  let configs: Vec<RuleConfig> = serde_json::from_value(value.clone()).map_err(|err| {
    InjectError::invalid_options(format!("The \"as\" parameter is not a valid formatter: {err}"))
  })?;

  configs
    .into_iter()
    .map(|config| {
      let formatter = config.formatter.into_formatter()?;
      Ok(InjectRule::with_formatter(
        config.template_path,
        config.replace,
        formatter,
      ))
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use tempfile::tempdir;

  fn non_arrays() -> Vec<Value> {
    vec![json!(0), json!(true), Value::Null, json!(""), json!({})]
  }

  fn non_objects() -> Vec<Value> {
    vec![json!(0), json!(true), Value::Null, json!(""), json!([])]
  }

  fn non_strings() -> Vec<Value> {
    vec![json!(0), json!(true), Value::Null, json!([]), json!({})]
  }

  fn non_formatters() -> Vec<Value> {
    vec![
      json!(0),
      json!(true),
      Value::Null,
      json!([]),
      json!(""),
      json!({}),
      json!({"kind": 1}),
    ]
  }

  fn rule_with(field: &str, value: Value) -> Value {
    let mut rule = json!({
      "templatePath": "1",
      "replace": "<!-- ENTRY_SCRIPT --><!-- /ENTRY_SCRIPT -->",
      "as": {"kind": "script"}
    });
    rule[field] = value;
    json!([rule])
  }

  fn message(value: &Value) -> String {
    validate_options_value(value).unwrap_err().to_string()
  }

  #[test]
  fn options_must_be_an_array() {
    for value in non_arrays() {
      assert_eq!(message(&value), "inject-preload: Options must be an array", "{value}");
    }
    assert!(validate_options_value(&json!([])).is_ok());
  }

  #[test]
  fn option_items_must_be_objects() {
    for value in non_objects() {
      assert_eq!(
        message(&json!([value])),
        "inject-preload: Option item must be a plain object"
      );
    }
    assert!(validate_options_value(&rule_with("templatePath", json!("1"))).is_ok());
  }

  #[test]
  fn template_path_must_be_a_full_string() {
    assert_eq!(
      message(&rule_with("templatePath", json!(""))),
      "inject-preload: The \"templatePath\" parameter must be a non-empty string"
    );
    for value in non_strings() {
      assert_eq!(
        message(&rule_with("templatePath", value)),
        "inject-preload: The \"templatePath\" parameter must be a string"
      );
    }
  }

  #[test]
  fn replace_must_be_a_closed_html_comment() {
    assert_eq!(
      message(&rule_with("replace", json!(""))),
      "inject-preload: The \"replace\" parameter must be a non-empty string"
    );
    assert_eq!(
      message(&rule_with("replace", json!("1"))),
      "inject-preload: The \"replace\" parameter must be a closed html comment"
    );
    for value in non_strings() {
      assert_eq!(
        message(&rule_with("replace", value)),
        "inject-preload: The \"replace\" parameter must be a string"
      );
    }
  }

  #[test]
  fn as_must_be_a_formatter() {
    for value in non_formatters() {
      assert_eq!(
        message(&rule_with("as", value.clone())),
        "inject-preload: The \"as\" parameter must be a formatter object",
        "{value}"
      );
    }
  }

  #[test]
  fn missing_fields_are_reported_as_wrong_type() {
    let value = json!([{"replace": "<!-- A --><!-- /A -->", "as": {"kind": "script"}}]);
    assert_eq!(
      message(&value),
      "inject-preload: The \"templatePath\" parameter must be a string"
    );
  }

  #[test]
  fn unknown_formatter_kind_is_rejected() {
    let error = rules_from_value(&rule_with("as", json!({"kind": "style"}))).unwrap_err();
    assert!(matches!(error, InjectError::InvalidOptions(_)));
    assert!(error.to_string().contains("not a valid formatter"));
  }

  #[test]
  fn invalid_test_pattern_is_rejected() {
    let error =
      rules_from_value(&rule_with("as", json!({"kind": "script", "test": "("}))).unwrap_err();
    assert!(error.to_string().contains("The \"test\" pattern \"(\" is invalid"));
  }

  #[test]
  fn builds_rules_from_declarative_formatters() {
    let value = json!([
      {
        "templatePath": "index.html",
        "replace": "<!-- FONT_PRELOAD --><!-- /FONT_PRELOAD -->",
        "as": {"kind": "preload", "ext": ".woff2", "linkType": "font"}
      },
      {
        "templatePath": "index.html",
        "replace": "<!-- ENTRY_SCRIPT --><!-- /ENTRY_SCRIPT -->",
        "as": {"kind": "script", "test": "entry([^.]+)?\\.js$", "defer": false}
      },
      {
        "templatePath": "index.html",
        "replace": "<!-- STYLES --><!-- /STYLES -->",
        "as": {"kind": "template", "ext": ".css", "template": "<link href=\"[path]\" rel=\"stylesheet\">"}
      }
    ]);

    let rules = rules_from_value(&value).unwrap();
    assert_eq!(rules.len(), 3);
    assert_eq!(
      rules[0].format("/static/Inter.woff2").as_deref(),
      Some("<link as=\"font\" crossorigin=\"anonymous\" href=\"/static/Inter.woff2\" rel=\"preload\">")
    );
    assert_eq!(rules[0].format("Inter.ttf"), None);
    assert_eq!(
      rules[1].format("js/entry-43Y4EPON.js").as_deref(),
      Some("<script src=\"js/entry-43Y4EPON.js\"></script>")
    );
    assert_eq!(
      rules[2].format("app.css").as_deref(),
      Some("<link href=\"app.css\" rel=\"stylesheet\">")
    );
  }

  #[test]
  fn loads_configuration_file_and_anchors_template_paths() {
    let temp = tempdir().expect("failed to create temp dir");
    let path = temp.path().join(DEFAULT_CONFIG_FILE);
    fs::write(
      &path,
      r#"{
        "outdir": "dist",
        "publicPath": "/static/",
        "rules": [
          {
            "templatePath": "public/index.html",
            "replace": "<!-- ENTRY_SCRIPT --><!-- /ENTRY_SCRIPT -->",
            "as": {"kind": "script"}
          },
          {
            "templatePath": "/abs/index.html",
            "replace": "<!-- ENTRY_SCRIPT --><!-- /ENTRY_SCRIPT -->",
            "as": {"kind": "script"}
          }
        ]
      }"#,
    )
    .expect("failed to write config");

    let config = InjectConfig::from_path(&path).expect("configuration should load");
    assert_eq!(config.outdir.as_deref(), Some("dist"));
    assert_eq!(config.public_path.as_deref(), Some("/static/"));

    let rules = config.rules(temp.path()).unwrap();
    assert_eq!(rules[0].template_path(), temp.path().join("public/index.html"));
    assert_eq!(rules[1].template_path(), Path::new("/abs/index.html"));
  }

  #[test]
  fn missing_rules_are_not_an_array() {
    let config = InjectConfig::default();
    let error = config.rules(Path::new(".")).unwrap_err();
    assert_eq!(error.to_string(), "inject-preload: Options must be an array");
  }

  #[test]
  fn reports_unreadable_configuration() {
    let temp = tempdir().unwrap();
    let error = InjectConfig::from_path(&temp.path().join("missing.json")).unwrap_err();
    assert!(matches!(error, InjectError::ConfigRead { .. }));
  }
}
