//! LLM Integration Module
//!
//! Claude CLIを使用した外部分類器の実装を提供する。
//!
//! ## 使用方法
//!
//! ### Claude CLI可用性チェック
//!
//! ```rust
//! use doc_tidy_core::check_claude_cli;
//!
//! let available = check_claude_cli();
//! println!("Claude CLI available: {}", available);
//! ```
//!
//! ### LlmConfig
//!
//! ```rust
//! use doc_tidy_core::LlmConfig;
//!
//! let config = LlmConfig::default();
//! assert!(!config.enabled);
//! ```

use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::enhance::{AiRequest, AiVerdict, ExternalClassifier};
use crate::error::{DocTidyError, Result};

// ============================================================================
// Configuration
// ============================================================================

/// LLM機能の設定
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM機能を有効にするか（デフォルト: false）
    #[serde(default)]
    pub enabled: bool,
}

// ============================================================================
// CLI Operations
// ============================================================================

/// Claude CLIが利用可能かチェック
///
/// `claude --version` を実行して成功すればtrue
pub fn check_claude_cli() -> bool {
    Command::new("claude")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Claude CLIを実行してプロンプトを処理
///
/// # Arguments
/// * `working_dir` - 作業ディレクトリ
/// * `prompt` - 送信するプロンプト
///
/// # Returns
/// Claude CLIの出力（stdout）
///
/// # Errors
/// * `ClaudeExecutionFailed` - 実行に失敗した場合
pub fn execute_claude(working_dir: &Path, prompt: &str) -> Result<String> {
    let mut cmd = Command::new("claude");
    cmd.arg("--print");
    cmd.arg("--dangerously-skip-permissions");
    cmd.current_dir(working_dir);
    cmd.stdin(Stdio::piped());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .map_err(|e| DocTidyError::ClaudeExecutionFailed {
            message: format!("Failed to spawn claude: {}", e),
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(prompt.as_bytes())
            .map_err(|e| DocTidyError::ClaudeExecutionFailed {
                message: format!("Failed to write prompt: {}", e),
            })?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| DocTidyError::ClaudeExecutionFailed {
            message: format!("Execution failed: {}", e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DocTidyError::ClaudeExecutionFailed {
            message: format!("Claude exited with error: {}", stderr),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Claude CLIの存在を確認し、なければエラーを返す
pub fn require_claude_cli() -> Result<()> {
    if !check_claude_cli() {
        return Err(DocTidyError::ClaudeNotFound);
    }
    Ok(())
}

// ============================================================================
// External Classifier
// ============================================================================

/// Claude CLIをバックエンドとする外部分類器
pub struct ClaudeClassifier {
    working_dir: PathBuf,
}

impl ClaudeClassifier {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

impl ExternalClassifier for ClaudeClassifier {
    fn classify(&self, request: &AiRequest<'_>) -> Result<AiVerdict> {
        let prompt = build_prompt(request);
        let output = execute_claude(&self.working_dir, &prompt)?;
        parse_verdict(&output, request.categories)
    }
}

/// 分類プロンプトを構築
fn build_prompt(request: &AiRequest<'_>) -> String {
    let category_list: String = request
        .categories
        .iter()
        .map(|c| format!("- {}", c))
        .collect::<Vec<_>>()
        .join("\n");

    let prior = match (&request.prior.category, request.prior.confidence) {
        (Some(cat), conf) => format!("{} (confidence {:.2})", cat, conf),
        (None, _) => "unclassified".to_string(),
    };

    format!(
        r#"Classify the following markdown document into exactly one category.

## Available Categories

{category_list}

## Document

Name: {name}
Path: {path}
Prior pattern-based classification: {prior}

## Content Excerpt

{excerpt}

## Output Format

Output a single JSON object with:
- "category": one of the available category names
- "confidence": confidence score 0.0-1.0
- "reason": one short sentence
- "alternatives": optional array of {{"category", "confidence"}} pairs

Example:
```json
{{"category": "guides", "confidence": 0.85, "reason": "step-by-step setup walkthrough", "alternatives": [{{"category": "api", "confidence": 0.3}}]}}
```

Output ONLY the JSON object, no other text.
"#,
        name = request.name,
        path = request.path,
        excerpt = request.excerpt,
    )
}

/// LLM出力をAiVerdictにパース
fn parse_verdict(output: &str, categories: &[String]) -> Result<AiVerdict> {
    let json_str = extract_json_from_output(output);

    let mut verdict: AiVerdict =
        serde_json::from_str(json_str).map_err(|e| DocTidyError::ClassifierOutput {
            message: format!("invalid JSON: {}", e),
        })?;

    if !verdict.confidence.is_finite() {
        return Err(DocTidyError::ClassifierOutput {
            message: format!("non-finite confidence: {}", verdict.confidence),
        });
    }
    verdict.confidence = verdict.confidence.clamp(0.0, 1.0);

    if !categories.iter().any(|c| c == &verdict.category) {
        return Err(DocTidyError::ClassifierOutput {
            message: format!("unknown category: {}", verdict.category),
        });
    }

    Ok(verdict)
}

/// LLM出力からJSON部分を抽出
fn extract_json_from_output(output: &str) -> &str {
    if let Some(start) = output.find("```json") {
        let start = start + 7;
        if let Some(end) = output[start..].find("```") {
            return output[start..start + end].trim();
        }
    }
    if let Some(start) = output.find("```") {
        let start = start + 3;
        if let Some(end) = output[start..].find("```") {
            return output[start..start + end].trim();
        }
    }
    if let Some(start) = output.find('{') {
        if let Some(end) = output.rfind('}') {
            return &output[start..=end];
        }
    }
    output.trim()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classification;

    fn categories() -> Vec<String> {
        vec!["guides".to_string(), "api".to_string()]
    }

    #[test]
    fn test_llm_config_default() {
        let config = LlmConfig::default();
        assert!(!config.enabled);
    }

    #[test]
    fn test_llm_config_deserialize() {
        let toml_str = r#"
            enabled = true
        "#;
        let config: LlmConfig = toml::from_str(toml_str).unwrap();
        assert!(config.enabled);
    }

    #[test]
    fn test_extract_json_fenced() {
        let output = "Here you go:\n```json\n{\"category\": \"guides\"}\n```\nDone.";
        assert_eq!(extract_json_from_output(output), "{\"category\": \"guides\"}");
    }

    #[test]
    fn test_extract_json_bare_fence() {
        let output = "```\n{\"category\": \"api\"}\n```";
        assert_eq!(extract_json_from_output(output), "{\"category\": \"api\"}");
    }

    #[test]
    fn test_extract_json_unfenced() {
        let output = "Sure! {\"category\": \"api\", \"confidence\": 0.5} hope that helps";
        assert_eq!(
            extract_json_from_output(output),
            "{\"category\": \"api\", \"confidence\": 0.5}"
        );
    }

    #[test]
    fn test_parse_verdict_full() {
        let output = r#"{"category": "guides", "confidence": 0.85, "reason": "walkthrough", "alternatives": [{"category": "api", "confidence": 0.3}]}"#;
        let verdict = parse_verdict(output, &categories()).unwrap();
        assert_eq!(verdict.category, "guides");
        assert_eq!(verdict.confidence, 0.85);
        assert_eq!(verdict.alternatives.len(), 1);
    }

    #[test]
    fn test_parse_verdict_clamps_confidence() {
        let output = r#"{"category": "api", "confidence": 1.4, "reason": "x"}"#;
        let verdict = parse_verdict(output, &categories()).unwrap();
        assert_eq!(verdict.confidence, 1.0);
    }

    #[test]
    fn test_parse_verdict_rejects_unknown_category() {
        let output = r#"{"category": "made-up", "confidence": 0.9, "reason": "x"}"#;
        let err = parse_verdict(output, &categories()).unwrap_err();
        assert!(matches!(err, DocTidyError::ClassifierOutput { .. }));
    }

    #[test]
    fn test_parse_verdict_rejects_garbage() {
        let err = parse_verdict("not json at all", &categories()).unwrap_err();
        assert!(matches!(err, DocTidyError::ClassifierOutput { .. }));
    }

    #[test]
    fn test_prompt_contains_document_and_categories() {
        let prior = Classification::none();
        let cats = categories();
        let request = AiRequest {
            name: "notes.md",
            path: "misc/notes.md",
            excerpt: "Some introduction text",
            categories: &cats,
            prior: &prior,
        };
        let prompt = build_prompt(&request);
        assert!(prompt.contains("notes.md"));
        assert!(prompt.contains("misc/notes.md"));
        assert!(prompt.contains("- guides"));
        assert!(prompt.contains("- api"));
        assert!(prompt.contains("Some introduction text"));
        assert!(prompt.contains("unclassified"));
    }
}
