//! Raw GitHub REST response shapes.
//!
//! Only the fields the tools read are declared; everything is defaulted so
//! that sparse payloads (anonymous contributors, deleted users) still decode.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawUser {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawLicense {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawRepository {
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    pub default_branch: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub pushed_at: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub license: Option<RawLicense>,
    #[serde(default)]
    pub has_wiki: bool,
    #[serde(default)]
    pub has_issues: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawContributor {
    /// Absent for anonymous contributors
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub contributions: u64,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Issue labels come back either as bare strings or as label objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum RawLabel {
    Name(String),
    Object { name: String },
}

impl RawLabel {
    pub fn into_name(self) -> String {
        match self {
            RawLabel::Name(name) | RawLabel::Object { name } => name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct RawPullRequest {
    pub number: u64,
    pub title: String,
    pub state: String,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub merged_at: Option<String>,
    #[serde(default)]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub draft: Option<bool>,
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawBranchRef {
    #[serde(rename = "ref")]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawPullRequestDetail {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub merged: Option<bool>,
    #[serde(default)]
    pub mergeable: Option<bool>,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changed_files: u64,
    #[serde(default)]
    pub commits: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub merged_at: Option<String>,
    pub base: RawBranchRef,
    pub head: RawBranchRef,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawFile {
    pub filename: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changes: u64,
    #[serde(default)]
    pub patch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawIssue {
    pub number: u64,
    pub title: String,
    pub state: String,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    #[serde(default)]
    pub assignees: Vec<RawUser>,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub html_url: String,
    /// Present when the "issue" is really a pull request
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawGitAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawCommitDetail {
    pub message: String,
    #[serde(default)]
    pub author: Option<RawGitAuthor>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawCommitStats {
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawCommit {
    pub sha: String,
    pub commit: RawCommitDetail,
    #[serde(default)]
    pub author: Option<RawUser>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub stats: Option<RawCommitStats>,
    #[serde(default)]
    pub files: Vec<RawFile>,
}

impl RawCommit {
    /// GitHub login when the commit is linked to an account, else the git author name.
    pub fn author_display(&self) -> Option<String> {
        self.author
            .as_ref()
            .map(|u| u.login.clone())
            .or_else(|| self.commit.author.as_ref().and_then(|a| a.name.clone()))
    }

    pub fn date(&self) -> Option<String> {
        self.commit.author.as_ref().and_then(|a| a.date.clone())
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct RawComparison {
    pub status: String,
    #[serde(default)]
    pub ahead_by: u64,
    #[serde(default)]
    pub behind_by: u64,
    #[serde(default)]
    pub total_commits: u64,
    #[serde(default)]
    pub commits: Vec<RawCommit>,
    #[serde(default)]
    pub files: Vec<RawFile>,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content: Option<String>,
}

/// The contents endpoint returns an array for directories and an object otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum RawContents {
    Directory(Vec<RawContentEntry>),
    Entry(RawContentEntry),
}

#[derive(Debug, Deserialize)]
pub(super) struct RawSearchItem {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawSearchResults {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<RawSearchItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawBranch {
    pub name: String,
    #[serde(default)]
    pub protected: bool,
}
