use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rmcp::{transport::stdio, ServiceExt};

use doc_tidy_mcp::DocTidyServer;

#[derive(Parser)]
#[command(name = "doc-tidy-mcp")]
#[command(about = "MCP server for doc-tidy markdown organization")]
#[command(version)]
struct Args {
    /// Config file used for every tool call
    /// (default: per-target discovery, then ~/.doc-tidy/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let service = DocTidyServer::new(args.config).serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
