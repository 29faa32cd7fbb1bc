//! MCP server startup.

use anyhow::Result;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::github::GitHubClient;
use crate::tools::ToolRegistry;

use super::server::RepoAnalystMcpServer;

/// Run the MCP server over stdio until the client disconnects.
pub async fn run_mcp_server(config: AppConfig) -> Result<()> {
    info!("🔧 Starting Repo Analyst MCP Tool Server...");
    info!("📝 Stdio mode (using rmcp)");

    let github = GitHubClient::new(
        &config.github_api_url,
        config.github_token.clone(),
        config.limits.clone(),
    )?;
    if config.github_token.is_none() {
        info!("No GitHub token configured, using unauthenticated rate limits");
    }

    run_server(RepoAnalystMcpServer::new(ToolRegistry::new(github))).await
}

async fn run_server(server: RepoAnalystMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("✅ MCP tool server started");

    let service = server.serve(stdio()).await.map_err(|e| {
        error!("Failed to start MCP service: {:?}", e);
        anyhow::anyhow!("Failed to start MCP service: {:?}", e)
    })?;

    service.waiting().await.map_err(|e| {
        error!("MCP service error: {:?}", e);
        anyhow::anyhow!("MCP service error: {:?}", e)
    })?;

    info!("MCP server shutting down");
    Ok(())
}
