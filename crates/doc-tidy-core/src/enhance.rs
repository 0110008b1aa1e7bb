//! AI Fallback Classification
//!
//! 確信度が低い分類結果を外部分類器（LLM）で補強する。
//! 外部分類器は単一メソッドのトレイトとして注入され、マージ処理は
//! ネットワーク依存なしで単体テストできる。
//! 外部呼び出しの失敗は致命的ではなく、常にパターン分類結果へ
//! 劣化する（graceful degradation）。

use serde::Deserialize;

use crate::classify::Classification;
use crate::config::Thresholds;
use crate::error::Result;

/// 外部分類器に渡すコンテンツ抜粋の最大文字数
pub const EXCERPT_CHARS: usize = 2000;

/// 外部とパターン分類が同一カテゴリで一致したときの確信度ブースト
const AI_AGREE_BOOST: f32 = 0.1;

/// 外部分類リクエスト
#[derive(Debug)]
pub struct AiRequest<'a> {
    pub name: &'a str,
    pub path: &'a str,
    /// コンテンツ抜粋（呼び出し側でEXCERPT_CHARSに切り詰め済み）
    pub excerpt: &'a str,
    /// 利用可能なカテゴリ集合
    pub categories: &'a [String],
    /// 既存のパターン分類結果（コンテキストとして渡す）
    pub prior: &'a Classification,
}

/// 外部分類器の応答
#[derive(Debug, Clone, Deserialize)]
pub struct AiVerdict {
    pub category: String,
    /// 確信度（0.0-1.0、パース時に検証済み）
    pub confidence: f32,
    pub reason: String,
    #[serde(default)]
    pub alternatives: Vec<AiAlternative>,
}

/// 代替カテゴリ候補
#[derive(Debug, Clone, Deserialize)]
pub struct AiAlternative {
    pub category: String,
    pub confidence: f32,
}

/// 外部分類器のcapabilityインターフェース
///
/// リクエストを受けて結果または失敗を返す。副作用なし、レイテンシ保証なし。
pub trait ExternalClassifier {
    fn classify(&self, request: &AiRequest<'_>) -> Result<AiVerdict>;
}

/// 既存結果がAIフォールバックの対象かどうか
pub fn should_enhance(existing: &Classification, thresholds: &Thresholds) -> bool {
    existing.confidence < thresholds.ai_fallback
}

/// 外部分類結果を既存結果にマージ
///
/// 優先順位:
/// 1. 外部の確信度が厳密に高い → 外部カテゴリを採用、AI理由を先頭に
/// 2. 同一カテゴリ → 確信度を+0.1（上限1.0）、確認理由を追記
/// 3. 不一致かつ外部が高くない → 値は変えず、代替案の記録のみ追記
pub fn merge(existing: &Classification, verdict: &AiVerdict) -> Classification {
    if verdict.confidence > existing.confidence {
        let mut reasons = vec![format!(
            "ai: {} ({:.2})",
            verdict.reason, verdict.confidence
        )];
        reasons.extend(existing.reasons.iter().cloned());
        return Classification {
            category: Some(verdict.category.clone()),
            confidence: verdict.confidence,
            reasons,
            ai_enhanced: true,
        };
    }

    let mut merged = existing.clone();
    merged.ai_enhanced = true;

    if existing.category.as_deref() == Some(verdict.category.as_str()) {
        merged.confidence = (merged.confidence + AI_AGREE_BOOST).min(1.0);
        merged
            .reasons
            .push(format!("ai confirmed: {}", verdict.reason));
    } else {
        merged.reasons.push(format!(
            "ai suggested '{}' ({:.2}) - not adopted",
            verdict.category, verdict.confidence
        ));
    }

    merged
}

/// 外部分類器を呼び出してマージする。
///
/// 失敗時は既存結果をそのまま返し、警告文字列を添える（呼び出し側が
/// 実行レベルの警告リストに記録する）。
pub fn maybe_enhance(
    existing: Classification,
    request: &AiRequest<'_>,
    classifier: &dyn ExternalClassifier,
) -> (Classification, Option<String>) {
    match classifier.classify(request) {
        Ok(verdict) => (merge(&existing, &verdict), None),
        Err(e) => {
            let warning = format!("ai classification failed for {}: {}", request.path, e);
            (existing, Some(warning))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocTidyError;

    struct Fixed(AiVerdict);

    impl ExternalClassifier for Fixed {
        fn classify(&self, _request: &AiRequest<'_>) -> Result<AiVerdict> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    impl ExternalClassifier for Failing {
        fn classify(&self, _request: &AiRequest<'_>) -> Result<AiVerdict> {
            Err(DocTidyError::ClaudeExecutionFailed {
                message: "network down".to_string(),
            })
        }
    }

    fn existing(category: &str, confidence: f32) -> Classification {
        Classification {
            category: Some(category.to_string()),
            confidence,
            reasons: vec!["content match".to_string()],
            ai_enhanced: false,
        }
    }

    fn verdict(category: &str, confidence: f32) -> AiVerdict {
        AiVerdict {
            category: category.to_string(),
            confidence,
            reason: "semantic analysis".to_string(),
            alternatives: Vec::new(),
        }
    }

    fn request<'a>(prior: &'a Classification, categories: &'a [String]) -> AiRequest<'a> {
        AiRequest {
            name: "notes.md",
            path: "notes.md",
            excerpt: "some text",
            categories,
            prior,
        }
    }

    #[test]
    fn test_higher_ai_confidence_adopts_ai_category() {
        let prior = existing("guides", 0.6);
        let merged = merge(&prior, &verdict("architecture", 0.9));

        assert_eq!(merged.category.as_deref(), Some("architecture"));
        assert_eq!(merged.confidence, 0.9);
        assert!(merged.ai_enhanced);
        // AI reason is prepended, existing reasons kept after
        assert!(merged.reasons[0].starts_with("ai:"));
        assert_eq!(merged.reasons[1], "content match");
    }

    #[test]
    fn test_disagreement_without_higher_confidence_keeps_existing() {
        let prior = existing("guides", 0.9);
        let merged = merge(&prior, &verdict("architecture", 0.5));

        assert_eq!(merged.category.as_deref(), Some("guides"));
        assert_eq!(merged.confidence, 0.9);
        assert!(merged.ai_enhanced);
        // The alternative is recorded for visibility, not adopted
        assert!(merged.reasons.last().unwrap().contains("architecture"));
        assert!(merged.reasons.last().unwrap().contains("not adopted"));
    }

    #[test]
    fn test_agreement_boosts_confidence() {
        let prior = existing("guides", 0.5);
        let merged = merge(&prior, &verdict("guides", 0.5));

        assert_eq!(merged.category.as_deref(), Some("guides"));
        assert!((merged.confidence - 0.6).abs() < 1e-6);
        assert!(merged.reasons.last().unwrap().starts_with("ai confirmed"));
    }

    #[test]
    fn test_agreement_boost_capped_at_one() {
        let prior = existing("guides", 0.95);
        let merged = merge(&prior, &verdict("guides", 0.95));
        assert_eq!(merged.confidence, 1.0);
    }

    #[test]
    fn test_none_result_adopts_any_positive_verdict() {
        let prior = Classification::none();
        let merged = merge(&prior, &verdict("api", 0.4));
        assert_eq!(merged.category.as_deref(), Some("api"));
        assert_eq!(merged.confidence, 0.4);
    }

    #[test]
    fn test_failure_returns_existing_unchanged_with_warning() {
        let prior = existing("guides", 0.5);
        let categories = vec!["guides".to_string()];
        let (result, warning) = maybe_enhance(prior.clone(), &request(&prior, &categories), &Failing);

        assert_eq!(result, prior);
        assert!(!result.ai_enhanced);
        assert!(warning.unwrap().contains("network down"));
    }

    #[test]
    fn test_success_sets_enhanced_and_no_warning() {
        let prior = existing("guides", 0.5);
        let categories = vec!["guides".to_string()];
        let (result, warning) =
            maybe_enhance(prior.clone(), &request(&prior, &categories), &Fixed(verdict("guides", 0.4)));

        assert!(result.ai_enhanced);
        assert!(warning.is_none());
    }

    #[test]
    fn test_should_enhance_is_strictly_below_threshold() {
        let thresholds = Thresholds::default();
        assert!(should_enhance(&existing("x", 0.5), &thresholds));
        assert!(should_enhance(&existing("x", 0.79), &thresholds));
        assert!(!should_enhance(&existing("x", 0.8), &thresholds));
        assert!(!should_enhance(&existing("x", 0.9), &thresholds));
    }
}
