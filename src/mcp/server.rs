//! MCP server exposing the GitHub tools directly.
//!
//! Each tool method takes the same argument envelope the agent decodes, so
//! MCP clients and the model see identical schemas and identical payloads.

use rmcp::{
    handler::server::router::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::Serialize;
use serde_json::Value;

use crate::tools::args::*;
use crate::tools::{ToolExecutor, ToolKind, ToolRegistry};

/// Repository analyst MCP server
#[derive(Clone)]
pub struct RepoAnalystMcpServer {
    registry: ToolRegistry,
    tool_router: ToolRouter<Self>,
}

/// Render a tool payload as an MCP result; error payloads become tool errors.
fn to_call_result(payload: Value) -> CallToolResult {
    if let Some(message) = payload.get("error").and_then(Value::as_str) {
        return CallToolResult::error(vec![Content::text(message)]);
    }
    let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
    CallToolResult::success(vec![Content::text(text)])
}

#[tool_router]
impl RepoAnalystMcpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            tool_router: Self::tool_router(),
        }
    }

    async fn call<A: Serialize>(&self, kind: ToolKind, args: &A) -> Result<CallToolResult, McpError> {
        let arguments = serde_json::to_value(args)
            .map_err(|e| McpError::invalid_params(format!("invalid arguments: {}", e), None))?;
        let payload = self.registry.execute(kind.name(), &arguments).await;
        Ok(to_call_result(payload))
    }

    #[tool(
        name = "getRepositoryOverview",
        description = "Get an overview of the repository including stats, language, description, and metadata"
    )]
    async fn get_repository_overview(
        &self,
        Parameters(args): Parameters<RepoArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolKind::RepositoryOverview, &args).await
    }

    #[tool(
        name = "getContributors",
        description = "Get the list of contributors to the repository with their contribution counts"
    )]
    async fn get_contributors(
        &self,
        Parameters(args): Parameters<ContributorsArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolKind::Contributors, &args).await
    }

    #[tool(
        name = "getPullRequests",
        description = "Get pull requests from the repository with their status, author, and basic info"
    )]
    async fn get_pull_requests(
        &self,
        Parameters(args): Parameters<PullRequestsArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolKind::PullRequests, &args).await
    }

    #[tool(
        name = "getPullRequestDetails",
        description = "Get detailed information about a specific pull request including the code diff and changed files"
    )]
    async fn get_pull_request_details(
        &self,
        Parameters(args): Parameters<PullRequestDetailsArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolKind::PullRequestDetails, &args).await
    }

    #[tool(
        name = "getIssues",
        description = "Get issues from the repository with their status, labels, and assignees"
    )]
    async fn get_issues(
        &self,
        Parameters(args): Parameters<IssuesArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolKind::Issues, &args).await
    }

    #[tool(
        name = "getCommits",
        description = "Get recent commits from the repository with author, message, and timestamp"
    )]
    async fn get_commits(
        &self,
        Parameters(args): Parameters<CommitsArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolKind::Commits, &args).await
    }

    #[tool(
        name = "getFileTree",
        description = "Get the file and directory structure of the repository at a specific path"
    )]
    async fn get_file_tree(
        &self,
        Parameters(args): Parameters<FileTreeArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolKind::FileTree, &args).await
    }

    #[tool(
        name = "getFileContent",
        description = "Get the content of a specific file in the repository. Use this to read source code files."
    )]
    async fn get_file_content(
        &self,
        Parameters(args): Parameters<FileContentArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolKind::FileContent, &args).await
    }

    #[tool(
        name = "getCommitDiff",
        description = "Get the diff/changes introduced by a specific commit"
    )]
    async fn get_commit_diff(
        &self,
        Parameters(args): Parameters<CommitDiffArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolKind::CommitDiff, &args).await
    }

    #[tool(
        name = "compareBranches",
        description = "Compare two branches or commits to see the differences"
    )]
    async fn compare_branches(
        &self,
        Parameters(args): Parameters<CompareBranchesArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolKind::CompareBranches, &args).await
    }

    #[tool(
        name = "searchCode",
        description = "Search for code patterns or text within the repository"
    )]
    async fn search_code(
        &self,
        Parameters(args): Parameters<SearchCodeArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolKind::SearchCode, &args).await
    }

    #[tool(name = "getBranches", description = "Get list of branches in the repository")]
    async fn get_branches(
        &self,
        Parameters(args): Parameters<RepoArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolKind::Branches, &args).await
    }

    #[tool(
        name = "getLanguages",
        description = "Get the programming languages used in the repository with their percentages"
    )]
    async fn get_languages(
        &self,
        Parameters(args): Parameters<RepoArgs>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ToolKind::Languages, &args).await
    }
}

#[tool_handler]
impl ServerHandler for RepoAnalystMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "repo-analyst".to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Repo Analyst MCP Server provides read-only GitHub repository tools: overview, contributors, pull requests, issues, commits, files, diffs, branches, code search and languages."
                    .to_string(),
            ),
        }
    }
}
