use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::args::*;
use super::declarations::{all_declarations, ToolDeclaration, ToolKind};
use super::payload::{error_payload, is_error_payload, to_payload};
use super::ToolExecutor;
use crate::github::{GitHubClient, GitHubError, StateFilter};

/// Dispatches tool calls to the GitHub data-access layer.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    github: GitHubClient,
}

fn decode<T: DeserializeOwned>(arguments: Value) -> Result<T, String> {
    serde_json::from_value(arguments).map_err(|e| format!("invalid arguments: {}", e))
}

fn tool_error(err: GitHubError) -> Value {
    match err {
        GitHubError::NotAFile(message) => error_payload(message),
        other => error_payload(format!("Tool error: {}", other)),
    }
}

fn respond<T: Serialize>(result: Result<T, GitHubError>) -> Value {
    match result {
        Ok(output) => to_payload(&output),
        Err(err) => tool_error(err),
    }
}

impl ToolRegistry {
    pub fn new(github: GitHubClient) -> Self {
        Self { github }
    }

    /// Execute a known tool with already-normalized arguments.
    pub async fn dispatch(&self, kind: ToolKind, arguments: Value) -> Value {
        match self.run(kind, arguments).await {
            Ok(payload) => payload,
            Err(message) => error_payload(format!("Tool error: {}", message)),
        }
    }

    async fn run(&self, kind: ToolKind, arguments: Value) -> Result<Value, String> {
        let gh = &self.github;
        let payload = match kind {
            ToolKind::RepositoryOverview => {
                let a: RepoArgs = decode(arguments)?;
                respond(gh.repository_overview(&a.owner, &a.repo).await)
            }
            ToolKind::Contributors => {
                let a: ContributorsArgs = decode(arguments)?;
                respond(gh.contributors(&a.owner, &a.repo, a.limit).await)
            }
            ToolKind::PullRequests => {
                let a: PullRequestsArgs = decode(arguments)?;
                let state = a.state.unwrap_or(StateFilter::All);
                respond(gh.pull_requests(&a.owner, &a.repo, state, a.limit).await)
            }
            ToolKind::PullRequestDetails => {
                let a: PullRequestDetailsArgs = decode(arguments)?;
                respond(gh.pull_request_detail(&a.owner, &a.repo, a.pr_number).await)
            }
            ToolKind::Issues => {
                let a: IssuesArgs = decode(arguments)?;
                let state = a.state.unwrap_or(StateFilter::All);
                respond(
                    gh.issues(&a.owner, &a.repo, state, a.labels.as_deref(), a.limit)
                        .await,
                )
            }
            ToolKind::Commits => {
                let a: CommitsArgs = decode(arguments)?;
                respond(
                    gh.commits(
                        &a.owner,
                        &a.repo,
                        a.author.as_deref(),
                        a.path.as_deref(),
                        a.limit,
                    )
                    .await,
                )
            }
            ToolKind::FileTree => {
                let a: FileTreeArgs = decode(arguments)?;
                respond(
                    gh.file_tree(&a.owner, &a.repo, a.path.as_deref(), a.branch.as_deref())
                        .await,
                )
            }
            ToolKind::FileContent => {
                let a: FileContentArgs = decode(arguments)?;
                respond(
                    gh.file_content(&a.owner, &a.repo, &a.path, a.branch.as_deref())
                        .await,
                )
            }
            ToolKind::CommitDiff => {
                let a: CommitDiffArgs = decode(arguments)?;
                respond(gh.commit_diff(&a.owner, &a.repo, &a.sha).await)
            }
            ToolKind::CompareBranches => {
                let a: CompareBranchesArgs = decode(arguments)?;
                respond(gh.compare(&a.owner, &a.repo, &a.base, &a.head).await)
            }
            ToolKind::SearchCode => {
                let a: SearchCodeArgs = decode(arguments)?;
                respond(
                    gh.search_code(&a.owner, &a.repo, &a.query, a.extension.as_deref())
                        .await,
                )
            }
            ToolKind::Branches => {
                let a: RepoArgs = decode(arguments)?;
                respond(gh.branches(&a.owner, &a.repo).await)
            }
            ToolKind::Languages => {
                let a: RepoArgs = decode(arguments)?;
                respond(gh.languages(&a.owner, &a.repo).await)
            }
        };
        Ok(payload)
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    fn declarations(&self) -> &[ToolDeclaration] {
        all_declarations()
    }

    async fn execute(&self, name: &str, arguments: &Value) -> Value {
        let Some(kind) = ToolKind::from_name(name) else {
            warn!(tool = name, "Model requested an unknown tool");
            return error_payload(format!("Unknown tool: {}", name));
        };

        // Some models send `null` for tools without arguments.
        let arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            other => other.clone(),
        };

        let start = Instant::now();
        debug!(tool = name, %arguments, "Executing tool");
        let payload = self.dispatch(kind, arguments).await;
        let is_error = is_error_payload(&payload);
        info!(
            tool = name,
            duration_ms = start.elapsed().as_millis() as u64,
            is_error,
            "Tool finished"
        );
        payload
    }
}
