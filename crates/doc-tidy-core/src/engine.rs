//! Organization engine.
//!
//! Drives the per-document pipeline: protected-check, pattern
//! classification, optional AI enhancement, placement check. Misplaced
//! documents above the suggest threshold become relocation suggestions;
//! `apply_moves` executes the subset above the auto-apply threshold.
//! Every non-fatal problem lands in a flat warning list instead of
//! aborting the batch.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::classify::PatternClassifier;
use crate::config::OrganizeConfig;
use crate::enhance::{maybe_enhance, should_enhance, AiRequest, ExternalClassifier, EXCERPT_CHARS};
use crate::error::Result;
use crate::placement::{PlacementResolver, ROOT_DIR};
use crate::scan::DocumentScanner;

/// A proposed relocation for one document
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub current_path: PathBuf,
    pub suggested_path: PathBuf,
    pub category: String,
    pub confidence: f32,
    pub reasons: Vec<String>,
    pub ai_enhanced: bool,
}

/// Result of an analysis run
#[derive(Debug, Default, Serialize)]
pub struct AnalyzeReport {
    pub scanned: usize,
    pub protected: usize,
    /// Correctly placed, unclassified, or below the suggest threshold
    pub placement_ok: usize,
    pub suggestions: Vec<Suggestion>,
    pub warnings: Vec<String>,
}

/// Result of one attempted (or previewed) move
#[derive(Debug, Clone, Serialize)]
pub struct MoveOutcome {
    pub from: PathBuf,
    pub to: PathBuf,
    /// True only when the file was actually renamed
    pub applied: bool,
    pub error: Option<String>,
}

/// Result of a move-execution run
#[derive(Debug, Default, Serialize)]
pub struct ApplyReport {
    pub dry_run: bool,
    /// Suggestions at or above the auto-apply threshold
    pub selected: usize,
    pub applied: usize,
    pub failed: usize,
    /// Suggestions below the auto-apply threshold
    pub skipped: usize,
    pub outcomes: Vec<MoveOutcome>,
}

/// ドキュメント整理エンジン
///
/// インスタンスごとにサジェスト・警告リストを所有する。
/// 同一プロセス内の複数インスタンスは互いに干渉しない。
pub struct OrganizeEngine {
    config: OrganizeConfig,
    classifier: PatternClassifier,
    resolver: PlacementResolver,
    scanner: DocumentScanner,
    external: Option<Box<dyn ExternalClassifier>>,
    suggestions: Vec<Suggestion>,
    warnings: Vec<String>,
}

impl OrganizeEngine {
    /// Build an engine from a resolved configuration.
    ///
    /// Pattern compilation happens here; a malformed pattern fails the
    /// run before any document is touched.
    pub fn new(config: OrganizeConfig) -> Result<Self> {
        let classifier = PatternClassifier::new(&config)?;
        let resolver = PlacementResolver::new(&config);
        let scanner = DocumentScanner::new(&config.scan);

        Ok(Self {
            config,
            classifier,
            resolver,
            scanner,
            external: None,
            suggestions: Vec::new(),
            warnings: Vec::new(),
        })
    }

    /// Attach an external classifier for the AI fallback path
    pub fn with_external_classifier(mut self, external: Box<dyn ExternalClassifier>) -> Self {
        self.external = Some(external);
        self
    }

    pub fn config(&self) -> &OrganizeConfig {
        &self.config
    }

    /// Suggestions from the most recent analysis run
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Analyze all documents under `root` and build the suggestion list.
    ///
    /// Suggestion lists are fresh per run. Documents are processed one
    /// at a time in enumeration order; when the AI fallback is enabled,
    /// each external call completes before the next document starts, so
    /// suggestion order stays deterministic.
    pub fn generate_suggestions(&mut self, root: &Path) -> Result<AnalyzeReport> {
        self.suggestions.clear();
        self.warnings.clear();

        let scan = self.scanner.scan(root)?;
        self.warnings.extend(scan.warnings);

        let categories = self.config.category_names();
        let mut report = AnalyzeReport {
            scanned: scan.documents.len(),
            ..Default::default()
        };

        for rel in &scan.documents {
            let name = rel
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let rel_str = rel.to_string_lossy().to_string();

            if self.classifier.is_protected(&name, &rel_str) {
                report.protected += 1;
                continue;
            }

            let content = match fs::read_to_string(root.join(rel)) {
                Ok(c) => c,
                Err(e) => {
                    self.warnings.push(format!("failed to read {}: {}", rel_str, e));
                    continue;
                }
            };

            let mut classification = self.classifier.classify(&name, &content);

            if self.config.llm.enabled {
                if let Some(external) = &self.external {
                    if should_enhance(&classification, &self.config.thresholds) {
                        let excerpt: String = content.chars().take(EXCERPT_CHARS).collect();
                        let request = AiRequest {
                            name: &name,
                            path: &rel_str,
                            excerpt: &excerpt,
                            categories: &categories,
                            prior: &classification,
                        };
                        let (enhanced, warning) =
                            maybe_enhance(classification.clone(), &request, external.as_ref());
                        if let Some(w) = warning {
                            self.warnings.push(w);
                        }
                        classification = enhanced;
                    }
                }
            }

            let Some(category) = classification.category.clone() else {
                report.placement_ok += 1;
                continue;
            };

            let current_dir = rel
                .parent()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default();
            let expected_dir = self.resolver.resolve_directory(&category);

            if self.resolver.is_correctly_placed(&current_dir, &expected_dir) {
                report.placement_ok += 1;
                continue;
            }

            // Nonzero-but-below-threshold documents are dropped here,
            // not reported as low-confidence noise.
            if classification.confidence < self.config.thresholds.suggest {
                report.placement_ok += 1;
                continue;
            }

            self.suggestions.push(Suggestion {
                current_path: rel.clone(),
                suggested_path: join_dir(&expected_dir, &name),
                category,
                confidence: classification.confidence,
                reasons: classification.reasons,
                ai_enhanced: classification.ai_enhanced,
            });
        }

        report.suggestions = self.suggestions.clone();
        report.warnings = self.warnings.clone();
        Ok(report)
    }

    /// Execute the current suggestions at or above the auto-apply
    /// threshold.
    ///
    /// Failure is per-document: a collision or OS error is recorded in
    /// that move's outcome and the batch continues. Moves are not
    /// transactional; documents already renamed stay renamed.
    pub fn apply_moves(&mut self, root: &Path, dry_run: bool) -> Result<ApplyReport> {
        let mut report = ApplyReport {
            dry_run,
            ..Default::default()
        };

        for suggestion in &self.suggestions {
            if suggestion.confidence < self.config.thresholds.auto_apply {
                report.skipped += 1;
                continue;
            }
            report.selected += 1;

            if dry_run {
                report.outcomes.push(MoveOutcome {
                    from: suggestion.current_path.clone(),
                    to: suggestion.suggested_path.clone(),
                    applied: false,
                    error: None,
                });
                continue;
            }

            let from = root.join(&suggestion.current_path);
            let to = root.join(&suggestion.suggested_path);

            match move_document(&from, &to) {
                Ok(()) => {
                    report.applied += 1;
                    report.outcomes.push(MoveOutcome {
                        from: suggestion.current_path.clone(),
                        to: suggestion.suggested_path.clone(),
                        applied: true,
                        error: None,
                    });
                }
                Err(message) => {
                    report.failed += 1;
                    report.outcomes.push(MoveOutcome {
                        from: suggestion.current_path.clone(),
                        to: suggestion.suggested_path.clone(),
                        applied: false,
                        error: Some(message),
                    });
                }
            }
        }

        Ok(report)
    }
}

/// Join a normalized directory (trailing separator or the root marker)
/// with a file name
fn join_dir(dir: &str, name: &str) -> PathBuf {
    if dir == ROOT_DIR {
        PathBuf::from(name)
    } else {
        PathBuf::from(format!("{}{}", dir, name))
    }
}

fn move_document(from: &Path, to: &Path) -> std::result::Result<(), String> {
    if to.exists() {
        return Err(format!("destination already exists: {}", to.display()));
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("create {}: {}", parent.display(), e))?;
    }
    fs::rename(from, to).map_err(|e| format!("rename: {}", e))
}
