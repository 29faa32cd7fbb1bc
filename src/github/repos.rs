use std::collections::HashMap;
use tracing::debug;

use super::client::{GitHubClient, GitHubError};
use super::models::{
    Branch, BranchList, Contributor, LanguageBreakdown, LanguageShare, RepositoryOverview,
};
use super::types::{RawBranch, RawContributor, RawRepository};

/// Clamp a caller-supplied page size to what the REST API accepts.
pub(super) fn page_size(limit: Option<u32>, default: u32) -> String {
    limit.unwrap_or(default).clamp(1, 100).to_string()
}

const BRANCH_PAGE_SIZE: u32 = 50;

impl GitHubClient {
    async fn fetch_repository(&self, owner: &str, repo: &str) -> Result<RawRepository, GitHubError> {
        self.get_json(&["repos", owner, repo], &[]).await
    }

    /// Resolve `branch`, falling back to the repository's default branch.
    pub(super) async fn resolve_ref(
        &self,
        owner: &str,
        repo: &str,
        branch: Option<&str>,
    ) -> Result<String, GitHubError> {
        match branch.filter(|b| !b.is_empty()) {
            Some(branch) => Ok(branch.to_string()),
            None => {
                let repository = self.fetch_repository(owner, repo).await?;
                debug!("Resolved default branch: {}", repository.default_branch);
                Ok(repository.default_branch)
            }
        }
    }

    pub async fn repository_overview(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<RepositoryOverview, GitHubError> {
        let data = self.fetch_repository(owner, repo).await?;
        Ok(RepositoryOverview {
            name: data.name,
            full_name: data.full_name,
            description: data.description,
            language: data.language,
            stars: data.stargazers_count,
            forks: data.forks_count,
            open_issues: data.open_issues_count,
            watchers: data.watchers_count,
            default_branch: data.default_branch,
            created_at: data.created_at,
            updated_at: data.updated_at,
            pushed_at: data.pushed_at,
            topics: data.topics,
            license: data.license.and_then(|l| l.name),
            has_wiki: data.has_wiki,
            has_issues: data.has_issues,
            archived: data.archived,
            url: data.html_url,
        })
    }

    pub async fn contributors(
        &self,
        owner: &str,
        repo: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Contributor>, GitHubError> {
        let raw: Vec<RawContributor> = self
            .get_json(
                &["repos", owner, repo, "contributors"],
                &[("per_page", page_size(limit, 30))],
            )
            .await?;

        Ok(raw
            .into_iter()
            .map(|c| Contributor {
                login: c.login,
                contributions: c.contributions,
                avatar_url: c.avatar_url,
                profile_url: c.html_url,
                kind: c.kind,
            })
            .collect())
    }

    pub async fn branches(&self, owner: &str, repo: &str) -> Result<BranchList, GitHubError> {
        let branches_path = ["repos", owner, repo, "branches"];
        let branches_query = [("per_page", BRANCH_PAGE_SIZE.to_string())];
        let (raw, repository) = tokio::try_join!(
            self.get_json::<Vec<RawBranch>>(&branches_path, &branches_query),
            self.fetch_repository(owner, repo),
        )?;

        let default_branch = repository.default_branch;
        let branches = raw
            .into_iter()
            .map(|b| Branch {
                is_default: b.name == default_branch,
                name: b.name,
                protected: b.protected,
            })
            .collect();

        Ok(BranchList {
            default_branch,
            branches,
        })
    }

    pub async fn languages(&self, owner: &str, repo: &str) -> Result<LanguageBreakdown, GitHubError> {
        let raw: HashMap<String, u64> = self
            .get_json(&["repos", owner, repo, "languages"], &[])
            .await?;
        Ok(language_breakdown(raw))
    }
}

/// Sort languages by byte count (descending, then by name) and format shares.
fn language_breakdown(raw: HashMap<String, u64>) -> LanguageBreakdown {
    let total: u64 = raw.values().sum();
    let mut languages: Vec<LanguageShare> = raw
        .into_iter()
        .map(|(language, bytes)| {
            let share = if total == 0 {
                0.0
            } else {
                bytes as f64 / total as f64 * 100.0
            };
            LanguageShare {
                language,
                bytes,
                percentage: format!("{:.1}%", share),
            }
        })
        .collect();
    languages.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.language.cmp(&b.language)));
    LanguageBreakdown { languages }
}
