use super::client::{GitHubClient, GitHubError};
use super::models::{IssueSummary, StateFilter};
use super::repos::page_size;
use super::types::RawIssue;

impl GitHubClient {
    /// Issues ordered by most recently updated. The issues endpoint also
    /// returns pull requests; those are dropped.
    pub async fn issues(
        &self,
        owner: &str,
        repo: &str,
        state: StateFilter,
        labels: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<IssueSummary>, GitHubError> {
        let mut query = vec![
            ("state", state.as_str().to_string()),
            ("per_page", page_size(limit, 20)),
            ("sort", "updated".to_string()),
            ("direction", "desc".to_string()),
        ];
        if let Some(labels) = labels.filter(|l| !l.trim().is_empty()) {
            query.push(("labels", labels.to_string()));
        }

        let raw: Vec<RawIssue> = self
            .get_json(&["repos", owner, repo, "issues"], &query)
            .await?;

        Ok(raw
            .into_iter()
            .filter(|issue| issue.pull_request.is_none())
            .map(|issue| IssueSummary {
                number: issue.number,
                title: issue.title,
                state: issue.state,
                author: issue.user.map(|u| u.login),
                labels: issue.labels.into_iter().map(|l| l.into_name()).collect(),
                assignees: issue.assignees.into_iter().map(|a| a.login).collect(),
                comments: issue.comments,
                created_at: issue.created_at,
                updated_at: issue.updated_at,
                closed_at: issue.closed_at,
                url: issue.html_url,
            })
            .collect())
    }
}
