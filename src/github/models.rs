//! Normalized tool outputs.
//!
//! These are the JSON shapes handed to the model. Field names are camelCase
//! because the system prompt and the renderers downstream expect them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// State filter for pull request and issue listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    Open,
    Closed,
    #[default]
    All,
}

impl StateFilter {
    pub const VALUES: &'static [&'static str] = &["open", "closed", "all"];

    pub fn as_str(&self) -> &'static str {
        match self {
            StateFilter::Open => "open",
            StateFilter::Closed => "closed",
            StateFilter::All => "all",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryOverview {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub watchers: u64,
    pub default_branch: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub pushed_at: Option<String>,
    pub topics: Vec<String>,
    pub license: Option<String>,
    pub has_wiki: bool,
    pub has_issues: bool,
    pub archived: bool,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    pub login: Option<String>,
    pub contributions: u64,
    pub avatar_url: Option<String>,
    pub profile_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestSummary {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub author: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub merged_at: Option<String>,
    pub closed_at: Option<String>,
    pub draft: Option<bool>,
    pub labels: Vec<String>,
    pub url: String,
}

/// One changed file with its (possibly truncated) patch
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePatch {
    pub filename: String,
    pub status: String,
    pub additions: u64,
    pub deletions: u64,
    pub patch: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestDetail {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: String,
    pub author: Option<String>,
    pub merged: Option<bool>,
    pub mergeable: Option<bool>,
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
    pub commits: u64,
    pub created_at: Option<String>,
    pub merged_at: Option<String>,
    pub base_branch: String,
    pub head_branch: String,
    pub files: Vec<FilePatch>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueSummary {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub author: Option<String>,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub comments: u64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub closed_at: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitSummary {
    pub sha: String,
    pub full_sha: String,
    pub message: String,
    pub full_message: String,
    pub author: Option<String>,
    pub author_email: Option<String>,
    pub date: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FileTree {
    Directory {
        path: String,
        branch: String,
        items: Vec<TreeEntry>,
    },
    File {
        path: String,
        #[serde(rename = "type")]
        kind: String,
        name: String,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    pub path: String,
    pub name: String,
    pub size: u64,
    pub content: String,
    pub language: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiffStats {
    pub additions: u64,
    pub deletions: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitDiff {
    pub sha: String,
    pub full_sha: String,
    pub message: String,
    pub author: Option<String>,
    pub date: Option<String>,
    pub stats: DiffStats,
    pub total_files: usize,
    pub files_shown: usize,
    pub files: Vec<FilePatch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparedCommitAuthor {
    pub name: Option<String>,
    pub login: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparedCommit {
    pub sha: String,
    pub message: String,
    pub author: ComparedCommitAuthor,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparedFile {
    pub filename: String,
    pub status: String,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonStats {
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchComparison {
    pub status: String,
    pub ahead_by: u64,
    pub behind_by: u64,
    pub total_commits: u64,
    pub commits: Vec<ComparedCommit>,
    pub files: Vec<ComparedFile>,
    pub stats: ComparisonStats,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodeSearchHit {
    pub filename: String,
    pub path: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSearchResults {
    pub total_count: u64,
    pub results: Vec<CodeSearchHit>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub name: String,
    pub protected: bool,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchList {
    pub default_branch: String,
    pub branches: Vec<Branch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageShare {
    pub language: String,
    pub bytes: u64,
    pub percentage: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageBreakdown {
    pub languages: Vec<LanguageShare>,
}
