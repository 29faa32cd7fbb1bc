use anyhow::{bail, Result};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::agent::{Agent, AgentRequest, InMemoryMessageStore, InMemoryProgress};
use crate::config::AppConfig;
use crate::domain::{RepositoryContext, RepositoryMetadata};
use crate::github::GitHubClient;
use crate::tools::ToolRegistry;

/// Contributors counted for the metadata block
const CONTRIBUTOR_SAMPLE: u32 = 100;

pub struct AskOptions {
    pub query: String,
    pub repo: String,
    pub model: Option<String>,
    pub focus: Vec<String>,
    pub session: Option<String>,
}

/// Snapshot the repository statistics for the opening prompt.
///
/// A failed lookup is not fatal: the agent can still fetch data with tools.
async fn repository_context(github: &GitHubClient, slug: &str) -> Result<RepositoryContext> {
    let Some(repository) = RepositoryContext::from_slug(slug) else {
        bail!("Invalid repository '{}', expected owner/name", slug);
    };

    let stats = tokio::try_join!(
        github.repository_overview(&repository.owner, &repository.name),
        github.contributors(&repository.owner, &repository.name, Some(CONTRIBUTOR_SAMPLE)),
    );

    Ok(match stats {
        Ok((overview, contributors)) => repository.with_metadata(RepositoryMetadata {
            stars: overview.stars,
            forks: overview.forks,
            language: overview.language,
            open_issues: overview.open_issues,
            contributor_count: contributors.len() as u64,
        }),
        Err(e) => {
            warn!("Could not load repository metadata for {}: {}", slug, e);
            repository
        }
    })
}

pub async fn run_ask(config: AppConfig, options: AskOptions) -> Result<()> {
    let github = GitHubClient::new(
        &config.github_api_url,
        config.github_token.clone(),
        config.limits.clone(),
    )?;
    let repository = repository_context(&github, &options.repo).await?;
    let session_id = options
        .session
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    info!("🔍 Analyzing {} (session {})", repository.full_name, session_id);

    let agent = Agent::new(
        config,
        Arc::new(ToolRegistry::new(github)),
        Arc::new(InMemoryProgress::new()),
        Arc::new(InMemoryMessageStore::new()),
    );
    let response = agent
        .run(AgentRequest {
            session_id,
            query: options.query,
            repository,
            focus_contributors: options.focus,
            model_id: options.model,
        })
        .await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
