//! Ready-made [`PathFormatter`]s for the common placeholder shapes.

use regex::Regex;

use crate::options::PathFormatter;

/// Token replaced by the resolved path in [`TemplateFormatter`] templates.
pub const PATH_TOKEN: &str = "[path]";

/// Selects which resolved paths a formatter renders.
///
/// An empty filter matches every path.
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
  /// Required suffix, e.g. `.woff2`.
  pub ext: Option<String>,
  /// Pattern that must match somewhere in the path.
  pub test: Option<Regex>,
}

impl AssetFilter {
  /// Filter on a file suffix.
  pub fn ext(ext: impl Into<String>) -> Self {
    Self {
      ext: Some(ext.into()),
      test: None,
    }
  }

  /// Filter on a regular expression.
  pub fn test(test: Regex) -> Self {
    Self {
      ext: None,
      test: Some(test),
    }
  }

  /// Whether `path` passes every configured condition.
  pub fn matches(&self, path: &str) -> bool {
    let ext_ok = self.ext.as_deref().is_none_or(|ext| path.ends_with(ext));
    let test_ok = self.test.as_ref().is_none_or(|test| test.is_match(path));
    ext_ok && test_ok
  }
}

/// Renders `<link rel="preload">` tags.
#[derive(Debug, Clone)]
pub struct PreloadLink {
  /// Paths to preload.
  pub filter: AssetFilter,
  /// Value of the `as` attribute (`font`, `script`, `style`, ...).
  pub link_type: String,
  /// Emit `crossorigin="anonymous"`, which fonts require.
  pub crossorigin: bool,
}

impl PreloadLink {
  /// Preload every path accepted by `filter` as `link_type`, with `crossorigin` set.
  pub fn new(filter: AssetFilter, link_type: impl Into<String>) -> Self {
    Self {
      filter,
      link_type: link_type.into(),
      crossorigin: true,
    }
  }
}

impl PathFormatter for PreloadLink {
  fn format(&self, path: &str) -> Option<String> {
    if !self.filter.matches(path) {
      return None;
    }
    let crossorigin = if self.crossorigin {
      " crossorigin=\"anonymous\""
    } else {
      ""
    };
    Some(format!(
      "<link as=\"{}\"{crossorigin} href=\"{path}\" rel=\"preload\">",
      self.link_type
    ))
  }
}

/// Renders classic `<script src>` tags.
#[derive(Debug, Clone, Default)]
pub struct ScriptTag {
  /// Scripts to include.
  pub filter: AssetFilter,
  /// Emit `defer=""`.
  pub defer: bool,
}

impl PathFormatter for ScriptTag {
  fn format(&self, path: &str) -> Option<String> {
    if !self.filter.matches(path) {
      return None;
    }
    let defer = if self.defer { " defer=\"\"" } else { "" };
    Some(format!("<script src=\"{path}\"{defer}></script>"))
  }
}

/// Renders an arbitrary template, substituting every [`PATH_TOKEN`].
#[derive(Debug, Clone)]
pub struct TemplateFormatter {
  /// Paths to render.
  pub filter: AssetFilter,
  /// Markup containing one or more [`PATH_TOKEN`]s.
  pub template: String,
}

impl PathFormatter for TemplateFormatter {
  fn format(&self, path: &str) -> Option<String> {
    self
      .filter
      .matches(path)
      .then(|| self.template.replace(PATH_TOKEN, path))
  }
}
