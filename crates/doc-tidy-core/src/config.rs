use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builtin::{
    BUILTIN_PATH_VARIABLES, BUILTIN_RULES, BUILTIN_TEMPLATES, DEFAULT_CONTENT_EXCLUDED,
    DEFAULT_EXCLUDED_DIRS, DEFAULT_PROTECTED_FILES,
};
use crate::error::{DocTidyError, Result};
use crate::llm::LlmConfig;

/// Global config file name (inside the base directory)
const CONFIG_FILE: &str = "config.toml";

/// Per-project config file name (inside the target directory)
const PROJECT_CONFIG_FILE: &str = "doc-tidy.toml";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# doc-tidy configuration file
# Location: ~/.doc-tidy/config.toml (global) or <project>/doc-tidy.toml
#
# Every section is optional; anything you leave out keeps its builtin
# default. The resulting configuration is fixed for the whole run.

# Classification rules, evaluated IN ORDER - the first matching rule wins.
# Patterns are case-insensitive regular expressions tested against the
# start of the file name (content is tried as a fallback). Put broad
# patterns last: an early broad rule will shadow a later, more specific
# one for the same file.
#
# [[rules]]
# category = "features"
# pattern = "feature[-._]"

# Where each category lives. "{aiDocs}" expands via [path_variables].
# The "root" entry is the fallback for categories without a template.
#
# [templates]
# features = "{aiDocs}/features/"
# root = "{aiDocs}/"

# [path_variables]
# aiDocs = "docs"

[thresholds]
# Confidence assigned to a filename match / content match
# filename_match = 0.9
# content_match = 0.5
# Minimum confidence to report a relocation / to execute it
# suggest = 0.7
# auto_apply = 0.8
# Below this confidence the AI fallback is consulted (when enabled)
# ai_fallback = 0.8

# Files never relocated, by exact name or exact relative path
# protected = ["README.md", "LICENSE.md"]

[llm]
# Ask Claude CLI to classify low-confidence documents
enabled = false
"#;

/// A single classification rule. Order in the `rules` array is
/// significant: matching stops at the first accepting rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleEntry {
    pub category: String,
    pub pattern: String,
    /// Shown to the AI fallback when describing the category set
    #[serde(default)]
    pub description: String,
}

/// Confidence thresholds, all in [0, 1]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub filename_match: f32,
    pub content_match: f32,
    pub suggest: f32,
    pub auto_apply: f32,
    pub ai_fallback: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            filename_match: 0.9,
            content_match: 0.5,
            suggest: 0.7,
            auto_apply: 0.8,
            ai_fallback: 0.8,
        }
    }
}

/// Document enumeration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File extension to consider (without the dot)
    pub extension: String,
    /// Directory names skipped anywhere in the walk
    pub exclude_dirs: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extension: "md".to_string(),
            exclude_dirs: DEFAULT_EXCLUDED_DIRS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Naming-convention check settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// File stems flagged as too generic (exact match)
    pub generic_stems: Vec<String>,
    /// Inside a features directory, a stem longer than this with no
    /// word separator is flagged
    pub max_unseparated_len: usize,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            generic_stems: vec![
                "doc".to_string(),
                "file".to_string(),
                "guide".to_string(),
            ],
            max_unseparated_len: 10,
        }
    }
}

/// Health-check settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// A document not modified for this many days counts as stale
    pub stale_days: i64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { stale_days: 180 }
    }
}

/// Resolved runtime configuration
///
/// Built once at startup from builtin defaults plus an optional TOML
/// override file; immutable for the rest of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizeConfig {
    pub rules: Vec<RuleEntry>,
    pub templates: HashMap<String, String>,
    pub path_variables: HashMap<String, String>,
    pub thresholds: Thresholds,
    pub protected: Vec<String>,
    /// Categories never assigned from content matches
    pub content_excluded: Vec<String>,
    pub scan: ScanConfig,
    pub naming: NamingConfig,
    pub health: HealthConfig,
    pub llm: LlmConfig,
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            rules: BUILTIN_RULES
                .iter()
                .map(|r| RuleEntry {
                    category: r.category.to_string(),
                    pattern: r.pattern.to_string(),
                    description: r.description.to_string(),
                })
                .collect(),
            templates: BUILTIN_TEMPLATES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            path_variables: BUILTIN_PATH_VARIABLES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            thresholds: Thresholds::default(),
            protected: DEFAULT_PROTECTED_FILES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            content_excluded: DEFAULT_CONTENT_EXCLUDED
                .iter()
                .map(|s| s.to_string())
                .collect(),
            scan: ScanConfig::default(),
            naming: NamingConfig::default(),
            health: HealthConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl OrganizeConfig {
    /// Parse a config file. Any field left out keeps its builtin default.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: OrganizeConfig =
            toml::from_str(&content).map_err(|e| DocTidyError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(config)
    }

    /// Resolve the config for a target directory.
    ///
    /// Order: explicit path > `<target>/doc-tidy.toml` > global
    /// `~/.doc-tidy/config.toml` > builtin defaults.
    pub fn discover(target_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let project = target_dir.join(PROJECT_CONFIG_FILE);
        if project.exists() {
            return Self::load(&project);
        }

        if let Ok(base) = Self::global_base_dir() {
            let global = base.join(CONFIG_FILE);
            if global.exists() {
                return Self::load(&global);
            }
        }

        Ok(Self::default())
    }

    /// Global base directory (~/.doc-tidy)
    pub fn global_base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(DocTidyError::HomeNotFound)?;
        Ok(home.join(".doc-tidy"))
    }

    /// Save config to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the global config file path
    pub fn global_path() -> Result<PathBuf> {
        Ok(Self::global_base_dir()?.join(CONFIG_FILE))
    }

    /// Initialize the global config with the commented template
    pub fn init() -> Result<PathBuf> {
        let base = Self::global_base_dir()?;
        fs::create_dir_all(&base)?;

        let path = base.join(CONFIG_FILE);
        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "thresholds.filename_match" => Some(self.thresholds.filename_match.to_string()),
            "thresholds.content_match" => Some(self.thresholds.content_match.to_string()),
            "thresholds.suggest" => Some(self.thresholds.suggest.to_string()),
            "thresholds.auto_apply" => Some(self.thresholds.auto_apply.to_string()),
            "thresholds.ai_fallback" => Some(self.thresholds.ai_fallback.to_string()),
            "scan.extension" => Some(self.scan.extension.clone()),
            "scan.exclude_dirs" => Some(format!("{:?}", self.scan.exclude_dirs)),
            "protected" => Some(format!("{:?}", self.protected)),
            "health.stale_days" => Some(self.health.stale_days.to_string()),
            "llm.enabled" => Some(self.llm.enabled.to_string()),
            _ => None,
        }
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "thresholds.filename_match" => {
                self.thresholds.filename_match = parse_confidence(key, value)?;
            }
            "thresholds.content_match" => {
                self.thresholds.content_match = parse_confidence(key, value)?;
            }
            "thresholds.suggest" => {
                self.thresholds.suggest = parse_confidence(key, value)?;
            }
            "thresholds.auto_apply" => {
                self.thresholds.auto_apply = parse_confidence(key, value)?;
            }
            "thresholds.ai_fallback" => {
                self.thresholds.ai_fallback = parse_confidence(key, value)?;
            }
            "scan.extension" => {
                self.scan.extension = value.trim().trim_start_matches('.').to_string();
            }
            "scan.exclude_dirs" => {
                self.scan.exclude_dirs = parse_string_list(value);
            }
            "protected" => {
                self.protected = parse_string_list(value);
            }
            "health.stale_days" => {
                self.health.stale_days =
                    value
                        .trim()
                        .parse()
                        .map_err(|_| DocTidyError::ConfigValue {
                            key: key.to_string(),
                            value: value.to_string(),
                        })?;
            }
            "llm.enabled" => {
                self.llm.enabled = matches!(value.trim(), "true" | "1" | "yes");
            }
            _ => {
                return Err(DocTidyError::ConfigKeyNotFound {
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// List all settable keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        [
            "thresholds.filename_match",
            "thresholds.content_match",
            "thresholds.suggest",
            "thresholds.auto_apply",
            "thresholds.ai_fallback",
            "scan.extension",
            "scan.exclude_dirs",
            "protected",
            "health.stale_days",
            "llm.enabled",
        ]
        .iter()
        .filter_map(|k| self.get(k).map(|v| (k.to_string(), v)))
        .collect()
    }

    /// Category names known to this configuration, rule order first
    pub fn category_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for rule in &self.rules {
            if !names.contains(&rule.category) {
                names.push(rule.category.clone());
            }
        }
        for key in self.templates.keys() {
            if key != "root" && !names.contains(key) {
                names.push(key.clone());
            }
        }
        names
    }
}

fn parse_confidence(key: &str, value: &str) -> Result<f32> {
    let parsed: f32 = value.trim().parse().map_err(|_| DocTidyError::ConfigValue {
        key: key.to_string(),
        value: value.to_string(),
    })?;
    Ok(parsed.clamp(0.0, 1.0))
}

/// Parse a comma-separated or JSON-like list string
fn parse_string_list(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    let inner = if trimmed.starts_with('[') && trimmed.ends_with(']') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    inner
        .split(',')
        .map(|s| s.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_ordered() {
        let config = OrganizeConfig::default();
        assert!(!config.rules.is_empty());
        // guides is the deliberately broad catch-all and must stay last
        assert_eq!(config.rules.last().unwrap().category, "guides");
        assert_eq!(config.rules.first().unwrap().category, "instructions");
    }

    #[test]
    fn test_default_templates_have_root() {
        let config = OrganizeConfig::default();
        assert_eq!(config.templates.get("root"), Some(&"{aiDocs}/".to_string()));
        assert_eq!(
            config.templates.get("features"),
            Some(&"{aiDocs}/features/".to_string())
        );
        assert_eq!(
            config.path_variables.get("aiDocs"),
            Some(&"docs".to_string())
        );
    }

    #[test]
    fn test_partial_toml_overrides_only_named_fields() {
        let toml_str = r#"
            [thresholds]
            suggest = 0.5

            [llm]
            enabled = true
        "#;
        let config: OrganizeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.thresholds.suggest, 0.5);
        assert!(config.llm.enabled);
        // Untouched fields keep builtin defaults
        assert_eq!(config.thresholds.auto_apply, 0.8);
        assert_eq!(config.scan.extension, "md");
        assert!(!config.rules.is_empty());
    }

    #[test]
    fn test_rules_override_preserves_order() {
        let toml_str = r#"
            [[rules]]
            category = "alpha"
            pattern = "a"

            [[rules]]
            category = "beta"
            pattern = "b"
        "#;
        let config: OrganizeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].category, "alpha");
        assert_eq!(config.rules[1].category, "beta");
    }

    #[test]
    fn test_get_set_roundtrip() {
        let mut config = OrganizeConfig::default();

        config.set("thresholds.suggest", "0.6").unwrap();
        assert_eq!(config.get("thresholds.suggest").unwrap(), "0.6");

        config.set("llm.enabled", "true").unwrap();
        assert_eq!(config.get("llm.enabled").unwrap(), "true");

        config.set("protected", "README.md,NOTICE.md").unwrap();
        assert_eq!(config.protected, vec!["README.md", "NOTICE.md"]);

        assert!(config.set("no.such.key", "x").is_err());
    }

    #[test]
    fn test_confidence_clamped() {
        let mut config = OrganizeConfig::default();
        config.set("thresholds.suggest", "1.5").unwrap();
        assert_eq!(config.thresholds.suggest, 1.0);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc-tidy.toml");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(f, "rules = \"not an array\"").unwrap();

        let err = OrganizeConfig::load(&path).unwrap_err();
        assert!(matches!(err, DocTidyError::ConfigParse { .. }));
    }

    #[test]
    fn test_category_names_rule_order_first() {
        let config = OrganizeConfig::default();
        let names = config.category_names();
        assert_eq!(names[0], "instructions");
        assert!(names.contains(&"guides".to_string()));
        assert!(!names.contains(&"root".to_string()));
    }

    #[test]
    fn test_default_template_parses() {
        let config: OrganizeConfig = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert!(!config.llm.enabled);
    }
}
