//! Pattern Classifier
//!
//! ファイル名とコンテンツ先頭を設定ルールに基づいて分類する。
//! ルールは設定順に評価され、最初にマッチしたルールで確定する（first-match-wins）。

use regex::{Regex, RegexBuilder};

use crate::config::{OrganizeConfig, Thresholds};
use crate::error::{DocTidyError, Result};

/// コンテンツマッチで参照する先頭文字数
pub const CONTENT_PREFIX_CHARS: usize = 200;

/// 単一ドキュメントの分類結果
///
/// 不変条件: `category` がNoneのとき `confidence` は0.0。
/// None結果からサジェストを生成してはならない。
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: Option<String>,
    /// 分類の確信度（0.0-1.0）
    pub confidence: f32,
    pub reasons: Vec<String>,
    /// AIフォールバックの結果が反映されたか
    pub ai_enhanced: bool,
}

impl Classification {
    /// 「分類なし」結果
    pub fn none() -> Self {
        Self {
            category: None,
            confidence: 0.0,
            reasons: Vec::new(),
            ai_enhanced: false,
        }
    }

    pub fn is_none(&self) -> bool {
        self.category.is_none()
    }
}

struct CompiledRule {
    category: String,
    matcher: Regex,
}

/// パターン分類器
pub struct PatternClassifier {
    rules: Vec<CompiledRule>,
    protected: Vec<String>,
    content_excluded: Vec<String>,
    thresholds: Thresholds,
}

impl PatternClassifier {
    /// 設定からルールをコンパイルして分類器を作成
    ///
    /// 不正なパターンは起動時エラー（ドキュメント処理前に失敗する）。
    pub fn new(config: &OrganizeConfig) -> Result<Self> {
        let mut rules = Vec::with_capacity(config.rules.len());

        for rule in &config.rules {
            // Patterns are applied as a case-insensitive prefix test,
            // not a substring search. A rule may end with `$` to demand
            // a whole-name match.
            let matcher = RegexBuilder::new(&format!("^(?:{})", rule.pattern))
                .case_insensitive(true)
                .build()
                .map_err(|e| DocTidyError::InvalidPattern {
                    category: rule.category.clone(),
                    pattern: rule.pattern.clone(),
                    message: e.to_string(),
                })?;

            rules.push(CompiledRule {
                category: rule.category.clone(),
                matcher,
            });
        }

        Ok(Self {
            rules,
            protected: config.protected.clone(),
            content_excluded: config.content_excluded.clone(),
            thresholds: config.thresholds.clone(),
        })
    }

    /// 保護対象かどうか（名前または相対パスの完全一致）
    pub fn is_protected(&self, name: &str, rel_path: &str) -> bool {
        self.protected
            .iter()
            .any(|p| p == name || p == rel_path)
    }

    /// ドキュメントを分類
    ///
    /// 1. 保護対象なら即None結果（パターンより優先）
    /// 2. ファイル名スキャン（first-match-wins）
    /// 3. コンテンツ先頭スキャン（content_excludedカテゴリは除外）
    /// 4. どちらもマッチしなければNone結果
    pub fn classify(&self, name: &str, content_prefix: &str) -> Classification {
        if self.protected.iter().any(|p| p == name) {
            return Classification::none();
        }

        // An earlier broad rule shadows later, more specific ones; rule
        // order is the configuration author's contract.
        for rule in &self.rules {
            if rule.matcher.is_match(name) {
                return Classification {
                    category: Some(rule.category.clone()),
                    confidence: self.thresholds.filename_match,
                    reasons: vec!["filename match".to_string()],
                    ai_enhanced: false,
                };
            }
        }

        let prefix: String = content_prefix.chars().take(CONTENT_PREFIX_CHARS).collect();
        if !prefix.is_empty() {
            for rule in &self.rules {
                if self.content_excluded.contains(&rule.category) {
                    continue;
                }
                if rule.matcher.is_match(&prefix) {
                    return Classification {
                        category: Some(rule.category.clone()),
                        confidence: self.thresholds.content_match,
                        reasons: vec!["content match".to_string()],
                        ai_enhanced: false,
                    };
                }
            }
        }

        Classification::none()
    }
}
