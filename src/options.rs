//! Substitution rules and the checks applied to them before any build work starts.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::error::{InjectError, Result};

fn marker_pair() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"^<!-- (\w+) --><!-- /(\w+) -->$").expect("invalid marker pair regex")
  })
}

/// Renders the markup contributed by a single resolved output path.
///
/// Returning `None` (or an empty string) skips the asset for the rule. Implemented for every
/// `Fn(&str) -> Option<String>` so plain closures can be passed straight to [`InjectRule::new`].
pub trait PathFormatter: Send + Sync {
  /// Markup for `path`, or `None` when the asset does not belong in this placeholder.
  fn format(&self, path: &str) -> Option<String>;
}

impl<F> PathFormatter for F
where
  F: Fn(&str) -> Option<String> + Send + Sync,
{
  fn format(&self, path: &str) -> Option<String> {
    self(path)
  }
}

/// One placeholder region to fill after every build.
#[derive(Clone)]
pub struct InjectRule {
  template_path: PathBuf,
  replace: String,
  formatter: Arc<dyn PathFormatter>,
}

impl InjectRule {
  /// Create a rule targeting `replace` (e.g. `<!-- ENTRY --><!-- /ENTRY -->`) in `template_path`.
  pub fn new(
    template_path: impl Into<PathBuf>,
    replace: impl Into<String>,
    formatter: impl PathFormatter + 'static,
  ) -> Self {
    Self::with_formatter(template_path, replace, Arc::new(formatter))
  }

  /// Same as [`InjectRule::new`] for an already shared formatter.
  pub fn with_formatter(
    template_path: impl Into<PathBuf>,
    replace: impl Into<String>,
    formatter: Arc<dyn PathFormatter>,
  ) -> Self {
    Self {
      template_path: template_path.into(),
      replace: replace.into(),
      formatter,
    }
  }

  /// Template file rewritten by this rule.
  pub fn template_path(&self) -> &Path {
    &self.template_path
  }

  /// Raw marker pair as supplied by the caller.
  pub fn replace(&self) -> &str {
    &self.replace
  }

  /// Anchor a relative template path onto `base_dir`. Absolute paths are kept.
  pub fn relative_to(self, base_dir: &Path) -> Self {
    Self {
      template_path: base_dir.join(&self.template_path),
      ..self
    }
  }

  /// Markup for a single resolved path.
  pub fn format(&self, path: &str) -> Option<String> {
    self.formatter.format(path)
  }
}

impl fmt::Debug for InjectRule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("InjectRule")
      .field("template_path", &self.template_path)
      .field("replace", &self.replace)
      .finish_non_exhaustive()
  }
}

/// Opening and closing halves of a placeholder, rendered as they appear in the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
  /// Opening comment, e.g. `<!-- ENTRY -->`.
  pub open: String,
  /// Closing comment, e.g. `<!-- /ENTRY -->`.
  pub close: String,
}

impl Marker {
  /// Split a `replace` string on `><` into its two halves.
  ///
  /// Returns `None` unless the split yields exactly two non-empty fragments.
  pub fn parse(replace: &str) -> Option<Self> {
    let mut halves = replace.split("><");
    let (Some(first), Some(second), None) = (halves.next(), halves.next(), halves.next()) else {
      return None;
    };
    if first.is_empty() || second.is_empty() {
      return None;
    }

    Some(Self {
      open: format!("{first}>"),
      close: format!("<{second}"),
    })
  }
}

/// Check a rule set for structural correctness.
///
/// Runs at plugin construction so malformed configuration fails before the host starts building.
pub fn validate_rules(rules: &[InjectRule]) -> Result<()> {
  rules.iter().try_for_each(validate_rule)
}

fn validate_rule(rule: &InjectRule) -> Result<()> {
  if rule.template_path.as_os_str().is_empty() {
    return Err(InjectError::invalid_options(
      "The \"templatePath\" parameter must be a non-empty string",
    ));
  }

  validate_replace(&rule.replace)
}

/// Check the `replace` marker of a rule.
pub(crate) fn validate_replace(replace: &str) -> Result<()> {
  if replace.is_empty() {
    return Err(InjectError::invalid_options(
      "The \"replace\" parameter must be a non-empty string",
    ));
  }

  let paired = marker_pair()
    .captures(replace)
    .is_some_and(|caps| caps[1] == caps[2]);
  if !paired || Marker::parse(replace).is_none() {
    return Err(InjectError::invalid_options(
      "The \"replace\" parameter must be a closed html comment",
    ));
  }

  Ok(())
}
