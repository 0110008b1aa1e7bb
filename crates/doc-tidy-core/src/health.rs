//! Documentation health check.
//!
//! A read-only pass over the document tree, independent of the
//! suggestion pipeline: it never relocates anything. Produces naming
//! findings, stale and orphaned document lists, a misplacement count,
//! and an aggregate score.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::classify::PatternClassifier;
use crate::config::OrganizeConfig;
use crate::error::Result;
use crate::placement::PlacementResolver;
use crate::scan::DocumentScanner;

/// Score weights, in percent of the maximum deduction per finding kind
const WEIGHT_MISPLACED: f32 = 40.0;
const WEIGHT_ORPHANED: f32 = 25.0;
const WEIGHT_STALE: f32 = 20.0;
const WEIGHT_NAMING: f32 = 15.0;

/// Directory name treated as the feature-spec area for naming checks
const FEATURES_DIR: &str = "features";

/// A naming-convention finding. Reporting only.
#[derive(Debug, Clone, Serialize)]
pub struct NamingFinding {
    pub path: PathBuf,
    pub message: String,
}

/// ヘルスチェック結果
#[derive(Debug, Default, Serialize)]
pub struct HealthReport {
    /// 0-100（高いほど良い）
    pub score: u8,
    pub scanned: usize,
    pub misplaced: usize,
    pub stale: Vec<PathBuf>,
    pub orphaned: Vec<PathBuf>,
    pub naming: Vec<NamingFinding>,
    pub warnings: Vec<String>,
}

/// ドキュメントツリーのヘルスチェッカー
pub struct HealthChecker {
    config: OrganizeConfig,
    classifier: PatternClassifier,
    resolver: PlacementResolver,
    scanner: DocumentScanner,
}

impl HealthChecker {
    pub fn new(config: OrganizeConfig) -> Result<Self> {
        let classifier = PatternClassifier::new(&config)?;
        let resolver = PlacementResolver::new(&config);
        let scanner = DocumentScanner::new(&config.scan);
        Ok(Self {
            config,
            classifier,
            resolver,
            scanner,
        })
    }

    /// Run the full health pass over `root`
    pub fn check(&self, root: &Path) -> Result<HealthReport> {
        let scan = self.scanner.scan(root)?;
        let mut report = HealthReport {
            scanned: scan.documents.len(),
            warnings: scan.warnings,
            ..Default::default()
        };

        let mut contents: HashMap<&PathBuf, String> = HashMap::new();
        for rel in &scan.documents {
            match fs::read_to_string(root.join(rel)) {
                Ok(c) => {
                    contents.insert(rel, c);
                }
                Err(e) => {
                    report
                        .warnings
                        .push(format!("failed to read {}: {}", rel.display(), e));
                }
            }
        }

        let stale_cutoff = Utc::now() - Duration::days(self.config.health.stale_days);

        for rel in &scan.documents {
            let name = rel
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let rel_str = rel.to_string_lossy().to_string();

            if let Some(finding) = self.check_naming(rel) {
                report.naming.push(finding);
            }

            if self.config.health.stale_days > 0 {
                match fs::metadata(root.join(rel)).and_then(|m| m.modified()) {
                    Ok(modified) => {
                        let modified: DateTime<Utc> = modified.into();
                        if modified < stale_cutoff {
                            report.stale.push(rel.clone());
                        }
                    }
                    Err(e) => {
                        report
                            .warnings
                            .push(format!("failed to stat {}: {}", rel.display(), e));
                    }
                }
            }

            if !self.classifier.is_protected(&name, &rel_str) {
                if self.is_orphaned(rel, &name, &scan.documents, &contents) {
                    report.orphaned.push(rel.clone());
                }

                let content = contents.get(rel).map(String::as_str).unwrap_or("");
                let classification = self.classifier.classify(&name, content);
                if let Some(category) = &classification.category {
                    let current_dir = rel
                        .parent()
                        .map(|p| p.to_string_lossy().to_string())
                        .unwrap_or_default();
                    let expected_dir = self.resolver.resolve_directory(category);
                    if !self.resolver.is_correctly_placed(&current_dir, &expected_dir)
                        && classification.confidence >= self.config.thresholds.suggest
                    {
                        report.misplaced += 1;
                    }
                }
            }
        }

        report.score = compute_score(&report);
        Ok(report)
    }

    /// Naming-convention check for one document. Flags overly generic
    /// stems, and unseparated over-long stems inside a features
    /// directory.
    pub fn check_naming(&self, rel: &Path) -> Option<NamingFinding> {
        let stem = rel.file_stem()?.to_string_lossy().to_string();

        if self
            .config
            .naming
            .generic_stems
            .iter()
            .any(|g| g == &stem)
        {
            return Some(NamingFinding {
                path: rel.to_path_buf(),
                message: format!("name '{}' is too generic", stem),
            });
        }

        let in_features_dir = rel
            .parent()
            .map(|p| p.components().any(|c| c.as_os_str() == FEATURES_DIR))
            .unwrap_or(false);
        if in_features_dir
            && stem.len() > self.config.naming.max_unseparated_len
            && !stem.contains('-')
            && !stem.contains('_')
        {
            return Some(NamingFinding {
                path: rel.to_path_buf(),
                message: format!(
                    "feature doc name '{}' has no word separator; prefer kebab-case",
                    stem
                ),
            });
        }

        None
    }

    /// A document is orphaned when no other scanned document mentions
    /// its file name.
    fn is_orphaned(
        &self,
        rel: &PathBuf,
        name: &str,
        documents: &[PathBuf],
        contents: &HashMap<&PathBuf, String>,
    ) -> bool {
        if name.is_empty() {
            return false;
        }
        !documents.iter().any(|other| {
            other != rel
                && contents
                    .get(other)
                    .map(|c| c.contains(name))
                    .unwrap_or(false)
        })
    }
}

/// Weighted score over finding ratios, clamped to [0, 100]
fn compute_score(report: &HealthReport) -> u8 {
    if report.scanned == 0 {
        return 100;
    }
    let total = report.scanned as f32;
    let deduction = WEIGHT_MISPLACED * (report.misplaced as f32 / total)
        + WEIGHT_ORPHANED * (report.orphaned.len() as f32 / total)
        + WEIGHT_STALE * (report.stale.len() as f32 / total)
        + WEIGHT_NAMING * (report.naming.len() as f32 / total);
    (100.0 - deduction).clamp(0.0, 100.0).round() as u8
}
