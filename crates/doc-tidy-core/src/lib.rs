pub mod builtin;
pub mod classify;
pub mod config;
pub mod engine;
pub mod enhance;
pub mod error;
pub mod health;
pub mod llm;
pub mod placement;
pub mod scan;

pub use builtin::{BuiltinRule, BUILTIN_RULES, DEFAULT_EXCLUDED_DIRS, DEFAULT_PROTECTED_FILES};
pub use classify::{Classification, PatternClassifier, CONTENT_PREFIX_CHARS};
pub use config::{
    HealthConfig, NamingConfig, OrganizeConfig, RuleEntry, ScanConfig, Thresholds,
};
pub use engine::{AnalyzeReport, ApplyReport, MoveOutcome, OrganizeEngine, Suggestion};
pub use enhance::{
    maybe_enhance, merge, should_enhance, AiAlternative, AiRequest, AiVerdict,
    ExternalClassifier, EXCERPT_CHARS,
};
pub use error::{DocTidyError, Result};
pub use health::{HealthChecker, HealthReport, NamingFinding};
pub use llm::{check_claude_cli, execute_claude, require_claude_cli, ClaudeClassifier, LlmConfig};
pub use placement::{normalize_dir, PlacementResolver, ROOT_DIR};
pub use scan::{DocumentScanner, ScanOutcome};
