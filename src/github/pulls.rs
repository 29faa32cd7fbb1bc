use super::client::{GitHubClient, GitHubError};
use super::models::{FilePatch, PullRequestDetail, PullRequestSummary, StateFilter};
use super::repos::page_size;
use super::truncate::cap_patch;
use super::types::{RawFile, RawPullRequest, RawPullRequestDetail};

const PR_FILES_PAGE_SIZE: u32 = 100;

impl GitHubClient {
    /// Pull requests ordered by most recently updated.
    pub async fn pull_requests(
        &self,
        owner: &str,
        repo: &str,
        state: StateFilter,
        limit: Option<u32>,
    ) -> Result<Vec<PullRequestSummary>, GitHubError> {
        let raw: Vec<RawPullRequest> = self
            .get_json(
                &["repos", owner, repo, "pulls"],
                &[
                    ("state", state.as_str().to_string()),
                    ("per_page", page_size(limit, 20)),
                    ("sort", "updated".to_string()),
                    ("direction", "desc".to_string()),
                ],
            )
            .await?;

        Ok(raw
            .into_iter()
            .map(|pr| PullRequestSummary {
                number: pr.number,
                title: pr.title,
                state: pr.state,
                author: pr.user.map(|u| u.login),
                created_at: pr.created_at,
                updated_at: pr.updated_at,
                merged_at: pr.merged_at,
                closed_at: pr.closed_at,
                draft: pr.draft,
                labels: pr.labels.into_iter().map(|l| l.into_name()).collect(),
                url: pr.html_url,
            })
            .collect())
    }

    /// One pull request with its changed files; each patch is capped.
    pub async fn pull_request_detail(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestDetail, GitHubError> {
        let number_segment = number.to_string();
        let pr_path = ["repos", owner, repo, "pulls", number_segment.as_str()];
        let files_path = ["repos", owner, repo, "pulls", number_segment.as_str(), "files"];
        let files_query = [("per_page", PR_FILES_PAGE_SIZE.to_string())];
        let (pr, files) = tokio::try_join!(
            self.get_json::<RawPullRequestDetail>(&pr_path, &[]),
            self.get_json::<Vec<RawFile>>(&files_path, &files_query),
        )?;

        let max_patch = self.limits().patch_chars;
        Ok(PullRequestDetail {
            number: pr.number,
            title: pr.title,
            body: pr.body,
            state: pr.state,
            author: pr.user.map(|u| u.login),
            merged: pr.merged,
            mergeable: pr.mergeable,
            additions: pr.additions,
            deletions: pr.deletions,
            changed_files: pr.changed_files,
            commits: pr.commits,
            created_at: pr.created_at,
            merged_at: pr.merged_at,
            base_branch: pr.base.name,
            head_branch: pr.head.name,
            files: files
                .into_iter()
                .map(|f| file_patch(f, max_patch))
                .collect(),
            url: pr.html_url,
        })
    }
}

pub(super) fn file_patch(file: RawFile, max_patch: usize) -> FilePatch {
    let (patch, truncated) = cap_patch(file.patch.as_deref(), max_patch);
    FilePatch {
        filename: file.filename,
        status: file.status,
        additions: file.additions,
        deletions: file.deletions,
        patch,
        truncated,
    }
}
