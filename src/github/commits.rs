use super::client::{GitHubClient, GitHubError};
use super::models::{
    BranchComparison, CommitDiff, CommitSummary, ComparedCommit, ComparedCommitAuthor,
    ComparedFile, ComparisonStats, DiffStats,
};
use super::pulls::file_patch;
use super::repos::page_size;
use super::truncate::cap_patch;
use super::types::{RawCommit, RawComparison};

const SHORT_SHA_LEN: usize = 7;

fn short_sha(sha: &str) -> String {
    sha.chars().take(SHORT_SHA_LEN).collect()
}

fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or_default().to_string()
}

impl GitHubClient {
    pub async fn commits(
        &self,
        owner: &str,
        repo: &str,
        author: Option<&str>,
        path: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<CommitSummary>, GitHubError> {
        let mut query = vec![("per_page", page_size(limit, 30))];
        if let Some(author) = author.filter(|a| !a.is_empty()) {
            query.push(("author", author.to_string()));
        }
        if let Some(path) = path.filter(|p| !p.is_empty()) {
            query.push(("path", path.to_string()));
        }

        let raw: Vec<RawCommit> = self
            .get_json(&["repos", owner, repo, "commits"], &query)
            .await?;

        Ok(raw
            .into_iter()
            .map(|commit| {
                let author = commit.author_display();
                let date = commit.date();
                let author_email = commit.commit.author.as_ref().and_then(|a| a.email.clone());
                CommitSummary {
                    sha: short_sha(&commit.sha),
                    message: first_line(&commit.commit.message),
                    full_message: commit.commit.message,
                    full_sha: commit.sha,
                    author,
                    author_email,
                    date,
                    url: commit.html_url,
                }
            })
            .collect())
    }

    /// Changes introduced by one commit. Files beyond the configured cap are
    /// counted in `totalFiles` but not listed.
    pub async fn commit_diff(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<CommitDiff, GitHubError> {
        let commit: RawCommit = self
            .get_json(&["repos", owner, repo, "commits", sha], &[])
            .await?;

        let limits = self.limits();
        let author = commit.author_display();
        let date = commit.date();
        let stats = commit
            .stats
            .map(|s| DiffStats {
                additions: s.additions,
                deletions: s.deletions,
                total: s.total,
            })
            .unwrap_or_default();

        let total_files = commit.files.len();
        let files: Vec<_> = commit
            .files
            .into_iter()
            .take(limits.commit_diff_files)
            .map(|f| file_patch(f, limits.patch_chars))
            .collect();

        Ok(CommitDiff {
            sha: short_sha(&commit.sha),
            full_sha: commit.sha,
            message: commit.commit.message,
            author,
            date,
            stats,
            total_files,
            files_shown: files.len(),
            files,
        })
    }

    /// Compare two refs. Aggregate stats cover every changed file even when
    /// the listing itself is capped.
    pub async fn compare(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<BranchComparison, GitHubError> {
        let range = format!("{}...{}", base, head);
        let data: RawComparison = self
            .get_json(&["repos", owner, repo, "compare", &range], &[])
            .await?;

        let limits = self.limits();
        let stats = ComparisonStats {
            additions: data.files.iter().map(|f| f.additions).sum(),
            deletions: data.files.iter().map(|f| f.deletions).sum(),
            changed_files: data.files.len(),
        };

        let commits = data
            .commits
            .into_iter()
            .take(limits.compare_commits)
            .map(|c| ComparedCommit {
                sha: short_sha(&c.sha),
                message: first_line(&c.commit.message),
                author: ComparedCommitAuthor {
                    name: c.commit.author.as_ref().and_then(|a| a.name.clone()),
                    login: c.author.as_ref().map(|u| u.login.clone()),
                    date: c.date(),
                },
            })
            .collect();

        let files = data
            .files
            .into_iter()
            .take(limits.compare_files)
            .map(|f| {
                let (patch, truncated) = match f.patch.as_deref() {
                    Some(p) => {
                        let (capped, truncated) = cap_patch(Some(p), limits.compare_patch_chars);
                        (Some(capped), truncated)
                    }
                    None => (None, false),
                };
                ComparedFile {
                    filename: f.filename,
                    status: f.status,
                    additions: f.additions,
                    deletions: f.deletions,
                    changes: f.changes,
                    patch,
                    truncated,
                }
            })
            .collect();

        Ok(BranchComparison {
            status: data.status,
            ahead_by: data.ahead_by,
            behind_by: data.behind_by,
            total_commits: data.total_commits,
            commits,
            files,
            stats,
            url: data.html_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_sha_and_first_line() {
        assert_eq!(short_sha("abcdef1234567"), "abcdef1");
        assert_eq!(short_sha("abc"), "abc");
        assert_eq!(first_line("Fix parser\n\nLonger body"), "Fix parser");
        assert_eq!(first_line(""), "");
    }
}
