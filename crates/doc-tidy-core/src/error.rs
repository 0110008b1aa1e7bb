use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocTidyError {
    #[error("Target directory does not exist: {path}")]
    TargetNotFound { path: PathBuf },

    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Invalid pattern for category '{category}': '{pattern}' - {message}")]
    InvalidPattern {
        category: String,
        pattern: String,
        message: String,
    },

    #[error("Config key not found: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("Invalid value for {key}: {value}")]
    ConfigValue { key: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Home directory not found")]
    HomeNotFound,

    #[error("Claude CLI not found - install from https://claude.ai/code")]
    ClaudeNotFound,

    #[error("Claude execution failed: {message}")]
    ClaudeExecutionFailed { message: String },

    #[error("Unusable classifier output: {message}")]
    ClassifierOutput { message: String },
}

pub type Result<T> = std::result::Result<T, DocTidyError>;
