//! Rewriting placeholder regions inside template files.

use std::borrow::Cow;
use std::fs;

use regex::{NoExpand, Regex};

use crate::error::{InjectError, Result};
use crate::options::{InjectRule, Marker};

/// A rule with its marker split and its search pattern compiled.
#[derive(Debug, Clone)]
pub struct PreparedRule {
  rule: InjectRule,
  marker: Marker,
  pattern: Regex,
}

impl PreparedRule {
  /// Compile the placeholder pattern for `rule`.
  pub fn new(rule: InjectRule) -> Result<Self> {
    let marker = Marker::parse(rule.replace()).ok_or_else(|| {
      InjectError::invalid_options("The \"replace\" parameter must be a closed html comment")
    })?;
    let pattern = Regex::new(&format!(
      "(?s){}.*?{}",
      regex::escape(&marker.open),
      regex::escape(&marker.close)
    ))
    .map_err(|err| InjectError::invalid_options(format!("invalid placeholder pattern: {err}")))?;

    Ok(Self {
      rule,
      marker,
      pattern,
    })
  }

  /// Concatenate the formatter output for every path, in order, skipping empty contributions.
  pub fn render(&self, paths: &[String]) -> String {
    paths
      .iter()
      .filter_map(|path| self.rule.format(path))
      .filter(|markup| !markup.is_empty())
      .collect()
  }

  /// Replace the content of the first placeholder in `template` with `markup`.
  ///
  /// Returns `None` when the template has no such placeholder.
  pub fn apply(&self, template: &str, markup: &str) -> Option<String> {
    let replacement = format!("{}{}{}", self.marker.open, markup, self.marker.close);
    match self
      .pattern
      .replacen(template, 1, NoExpand(&replacement))
    {
      Cow::Borrowed(_) => None,
      Cow::Owned(updated) => Some(updated),
    }
  }

  /// Read the template, fill the placeholder from `paths` and write the result back.
  pub fn rewrite(&self, paths: &[String]) -> Result<()> {
    let path = self.rule.template_path();
    let template = fs::read_to_string(path).map_err(|source| InjectError::FileRead {
      path: path.to_path_buf(),
      source,
    })?;

    let markup = self.render(paths);
    let updated = match self.apply(&template, &markup) {
      Some(updated) => updated,
      None => {
        tracing::warn!(
          template = %path.display(),
          marker = self.rule.replace(),
          "Placeholder not found, template left unchanged"
        );
        template
      }
    };

    tracing::debug!(
      template = %path.display(),
      marker = %self.marker.open,
      markup_bytes = markup.len(),
      "Writing placeholder"
    );
    fs::write(path, updated).map_err(|source| InjectError::FileWrite {
      path: path.to_path_buf(),
      source,
    })
  }
}

/// Run every rule against the same resolved paths, strictly in order.
///
/// Each rule re-reads its template, so rules sharing a file see each other's edits. The first
/// failure stops the pass; templates already written stay written.
pub fn rewrite_templates(rules: &[PreparedRule], paths: &[String]) -> Result<()> {
  rules.iter().try_for_each(|rule| rule.rewrite(paths))
}
