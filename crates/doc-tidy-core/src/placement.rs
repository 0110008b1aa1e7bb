//! Placement resolution for classified documents.
//!
//! Maps a category to its expected storage directory through the
//! configured path templates, and decides whether a document's current
//! directory already matches the expected one. Comparison is purely
//! textual; no filesystem access happens here.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::OrganizeConfig;

/// Canonical marker for the scan root directory
pub const ROOT_DIR: &str = ".";

/// Template key used when a category has no explicit mapping
const ROOT_TEMPLATE_KEY: &str = "root";

/// Last-resort template when the configuration lacks a root entry
const FALLBACK_TEMPLATE: &str = "{aiDocs}/";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder pattern is valid"));

/// カテゴリ→期待ディレクトリの解決器
pub struct PlacementResolver {
    templates: HashMap<String, String>,
    variables: HashMap<String, String>,
}

impl PlacementResolver {
    pub fn new(config: &OrganizeConfig) -> Self {
        Self {
            templates: config.templates.clone(),
            variables: config.path_variables.clone(),
        }
    }

    /// Resolve the expected directory for a category.
    ///
    /// Pure string substitution over the category's template (falling
    /// back to the `root` template). Never fails: unknown placeholder
    /// names are left as-is.
    pub fn resolve_directory(&self, category: &str) -> String {
        let template = self
            .templates
            .get(category)
            .or_else(|| self.templates.get(ROOT_TEMPLATE_KEY))
            .map(String::as_str)
            .unwrap_or(FALLBACK_TEMPLATE);

        let resolved = PLACEHOLDER.replace_all(template, |caps: &regex::Captures| {
            match self.variables.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        });

        normalize_dir(&resolved)
    }

    /// Whether `current_dir` already is the expected directory.
    ///
    /// Both sides are normalized first, so textual variants of the same
    /// location (trailing slash, leading `./`) compare equal.
    pub fn is_correctly_placed(&self, current_dir: &str, expected_dir: &str) -> bool {
        normalize_dir(current_dir) == normalize_dir(expected_dir)
    }
}

/// Normalize a directory string for comparison: strip a leading `./`,
/// map the empty string to the root marker, and give every non-root
/// directory exactly one trailing separator.
pub fn normalize_dir(dir: &str) -> String {
    let d = dir.strip_prefix("./").unwrap_or(dir);
    let d = d.trim_end_matches('/');
    if d.is_empty() || d == ROOT_DIR {
        ROOT_DIR.to_string()
    } else {
        format!("{}/", d)
    }
}
