//! MCP server for doc-tidy.
//!
//! Exposes three tools over stdio: `analyze` (suggestion list plus
//! counts), `apply` (execute moves, optionally dry-run, per-move
//! success/failure), and `health_check` (score plus naming/stale/orphan
//! findings). Each call takes a target directory and returns a single
//! structured JSON result; nothing streams.

use std::path::{Path, PathBuf};

use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::Deserialize;

use doc_tidy_core::{
    check_claude_cli, ClaudeClassifier, DocTidyError, HealthChecker, OrganizeConfig,
    OrganizeEngine,
};

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeRequest {
    /// Directory to analyze
    pub target_dir: String,
    /// Ask Claude CLI to classify low-confidence documents
    #[serde(default)]
    pub ai: bool,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct ApplyRequest {
    /// Directory to organize
    pub target_dir: String,
    /// Preview the moves without renaming anything
    #[serde(default)]
    pub dry_run: bool,
    /// Ask Claude CLI to classify low-confidence documents
    #[serde(default)]
    pub ai: bool,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct HealthCheckRequest {
    /// Directory to check
    pub target_dir: String,
}

/// doc-tidyのMCPサーバ
#[derive(Clone)]
pub struct DocTidyServer {
    config_path: Option<PathBuf>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl DocTidyServer {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Analyze a markdown documentation tree and suggest relocations to match the configured layout. Returns the suggestion list, counts, and non-fatal warnings."
    )]
    async fn analyze(
        &self,
        Parameters(request): Parameters<AnalyzeRequest>,
    ) -> Result<CallToolResult, McpError> {
        let config_path = self.config_path.clone();
        let json = tokio::task::spawn_blocking(move || run_analyze(config_path.as_deref(), &request))
            .await
            .map_err(join_error)??;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(
        description = "Execute the suggested relocations at or above the auto-apply confidence threshold. Set dry_run to preview. Returns per-move success or failure; one failed move never aborts the rest."
    )]
    async fn apply(
        &self,
        Parameters(request): Parameters<ApplyRequest>,
    ) -> Result<CallToolResult, McpError> {
        let config_path = self.config_path.clone();
        let json = tokio::task::spawn_blocking(move || run_apply(config_path.as_deref(), &request))
            .await
            .map_err(join_error)??;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(
        description = "Check documentation health: a 0-100 score plus misplaced counts and naming, stale, and orphaned-document findings. Read-only."
    )]
    async fn health_check(
        &self,
        Parameters(request): Parameters<HealthCheckRequest>,
    ) -> Result<CallToolResult, McpError> {
        let config_path = self.config_path.clone();
        let json = tokio::task::spawn_blocking(move || run_health(config_path.as_deref(), &request))
            .await
            .map_err(join_error)??;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for DocTidyServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Organize markdown documentation by configured patterns: \
                 'analyze' suggests relocations, 'apply' executes them \
                 (optionally as a dry run), 'health_check' scores the tree."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

fn build_engine(
    config_path: Option<&Path>,
    target_dir: &Path,
    ai: bool,
) -> Result<OrganizeEngine, McpError> {
    let mut config = OrganizeConfig::discover(target_dir, config_path).map_err(core_error)?;
    if ai {
        config.llm.enabled = true;
    }
    let ai_enabled = config.llm.enabled;

    let mut engine = OrganizeEngine::new(config).map_err(core_error)?;
    if ai_enabled && check_claude_cli() {
        engine = engine.with_external_classifier(Box::new(ClaudeClassifier::new(target_dir)));
    }
    Ok(engine)
}

fn run_analyze(config_path: Option<&Path>, request: &AnalyzeRequest) -> Result<String, McpError> {
    let target_dir = PathBuf::from(&request.target_dir);
    let mut engine = build_engine(config_path, &target_dir, request.ai)?;
    let report = engine.generate_suggestions(&target_dir).map_err(core_error)?;
    to_json(&report)
}

fn run_apply(config_path: Option<&Path>, request: &ApplyRequest) -> Result<String, McpError> {
    let target_dir = PathBuf::from(&request.target_dir);
    let mut engine = build_engine(config_path, &target_dir, request.ai)?;
    let analyze = engine.generate_suggestions(&target_dir).map_err(core_error)?;
    let apply = engine
        .apply_moves(&target_dir, request.dry_run)
        .map_err(core_error)?;
    to_json(&serde_json::json!({
        "analyze": analyze,
        "apply": apply,
    }))
}

fn run_health(config_path: Option<&Path>, request: &HealthCheckRequest) -> Result<String, McpError> {
    let target_dir = PathBuf::from(&request.target_dir);
    let config = OrganizeConfig::discover(&target_dir, config_path).map_err(core_error)?;
    let checker = HealthChecker::new(config).map_err(core_error)?;
    let report = checker.check(&target_dir).map_err(core_error)?;
    to_json(&report)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("serialize result: {}", e), None))
}

fn core_error(e: DocTidyError) -> McpError {
    match e {
        DocTidyError::TargetNotFound { .. }
        | DocTidyError::ConfigParse { .. }
        | DocTidyError::InvalidPattern { .. } => McpError::invalid_params(e.to_string(), None),
        _ => McpError::internal_error(e.to_string(), None),
    }
}

fn join_error(e: tokio::task::JoinError) -> McpError {
    McpError::internal_error(format!("task failed: {}", e), None)
}
