//! Provider-neutral tool declarations.
//!
//! [`ToolKind`] is the closed set of tools; both provider wire schemas and
//! the dispatch table in the registry are derived from it, so a tool cannot
//! be declared without a handler or handled without a declaration.

use serde::Serialize;
use std::sync::OnceLock;

use crate::github::StateFilter;

/// Parameter value type. Only strings and numbers cross the tool boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: ParamType,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<&'static [&'static str]>,
}

impl Parameter {
    const fn string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            ty: ParamType::String,
            description,
            enum_values: None,
        }
    }

    const fn number(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            ty: ParamType::Number,
            description,
            enum_values: None,
        }
    }

    const fn one_of(
        name: &'static str,
        description: &'static str,
        values: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            ty: ParamType::String,
            description,
            enum_values: Some(values),
        }
    }
}

/// A tool the model may call: name, description and parameter schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDeclaration {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<Parameter>,
    pub required: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    RepositoryOverview,
    Contributors,
    PullRequests,
    PullRequestDetails,
    Issues,
    Commits,
    FileTree,
    FileContent,
    CommitDiff,
    CompareBranches,
    SearchCode,
    Branches,
    Languages,
}

const OWNER: Parameter = Parameter::string("owner", "Repository owner/organization");
const REPO: Parameter = Parameter::string("repo", "Repository name");
const BRANCH: Parameter = Parameter::string("branch", "Branch name (default: main/master)");

impl ToolKind {
    pub const ALL: [ToolKind; 13] = [
        ToolKind::RepositoryOverview,
        ToolKind::Contributors,
        ToolKind::PullRequests,
        ToolKind::PullRequestDetails,
        ToolKind::Issues,
        ToolKind::Commits,
        ToolKind::FileTree,
        ToolKind::FileContent,
        ToolKind::CommitDiff,
        ToolKind::CompareBranches,
        ToolKind::SearchCode,
        ToolKind::Branches,
        ToolKind::Languages,
    ];

    /// Wire name the model uses to call this tool.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::RepositoryOverview => "getRepositoryOverview",
            ToolKind::Contributors => "getContributors",
            ToolKind::PullRequests => "getPullRequests",
            ToolKind::PullRequestDetails => "getPullRequestDetails",
            ToolKind::Issues => "getIssues",
            ToolKind::Commits => "getCommits",
            ToolKind::FileTree => "getFileTree",
            ToolKind::FileContent => "getFileContent",
            ToolKind::CommitDiff => "getCommitDiff",
            ToolKind::CompareBranches => "compareBranches",
            ToolKind::SearchCode => "searchCode",
            ToolKind::Branches => "getBranches",
            ToolKind::Languages => "getLanguages",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Human-readable progress label shown while the tool runs.
    pub fn progress_label(&self) -> &'static str {
        match self {
            ToolKind::RepositoryOverview => "📊 Getting repository overview",
            ToolKind::Contributors => "👥 Fetching contributors",
            ToolKind::PullRequests => "🔀 Loading pull requests",
            ToolKind::PullRequestDetails => "📝 Analyzing PR details",
            ToolKind::Issues => "🐛 Fetching issues",
            ToolKind::Commits => "📜 Loading commit history",
            ToolKind::FileTree => "📁 Browsing file structure",
            ToolKind::FileContent => "📄 Reading source code",
            ToolKind::CommitDiff => "🔍 Analyzing code changes",
            ToolKind::CompareBranches => "⚖️ Comparing branches",
            ToolKind::SearchCode => "🔎 Searching code",
            ToolKind::Branches => "🌿 Listing branches",
            ToolKind::Languages => "💻 Analyzing languages",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolKind::RepositoryOverview => "Get an overview of the repository including stats, language, description, and metadata",
            ToolKind::Contributors => "Get the list of contributors to the repository with their contribution counts",
            ToolKind::PullRequests => "Get pull requests from the repository with their status, author, and basic info",
            ToolKind::PullRequestDetails => "Get detailed information about a specific pull request including the code diff and changed files",
            ToolKind::Issues => "Get issues from the repository with their status, labels, and assignees",
            ToolKind::Commits => "Get recent commits from the repository with author, message, and timestamp",
            ToolKind::FileTree => "Get the file and directory structure of the repository at a specific path",
            ToolKind::FileContent => "Get the content of a specific file in the repository. Use this to read source code files.",
            ToolKind::CommitDiff => "Get the diff/changes introduced by a specific commit",
            ToolKind::CompareBranches => "Compare two branches or commits to see the differences",
            ToolKind::SearchCode => "Search for code patterns or text within the repository",
            ToolKind::Branches => "Get list of branches in the repository",
            ToolKind::Languages => "Get the programming languages used in the repository with their percentages",
        }
    }

    /// Parameters beyond `owner`/`repo`, and which of them are required.
    fn extra_parameters(&self) -> (Vec<Parameter>, Vec<&'static str>) {
        match self {
            ToolKind::RepositoryOverview | ToolKind::Branches | ToolKind::Languages => {
                (vec![], vec![])
            }
            ToolKind::Contributors => (
                vec![Parameter::number(
                    "limit",
                    "Maximum number of contributors to return (default: 30)",
                )],
                vec![],
            ),
            ToolKind::PullRequests => (
                vec![
                    Parameter::one_of(
                        "state",
                        "Filter by PR state (default: all)",
                        StateFilter::VALUES,
                    ),
                    Parameter::number("limit", "Maximum number of PRs to return (default: 20)"),
                ],
                vec![],
            ),
            ToolKind::PullRequestDetails => (
                vec![Parameter::number("prNumber", "Pull request number")],
                vec!["prNumber"],
            ),
            ToolKind::Issues => (
                vec![
                    Parameter::one_of(
                        "state",
                        "Filter by issue state (default: all)",
                        StateFilter::VALUES,
                    ),
                    Parameter::string("labels", "Comma-separated list of labels to filter by"),
                    Parameter::number("limit", "Maximum number of issues to return (default: 20)"),
                ],
                vec![],
            ),
            ToolKind::Commits => (
                vec![
                    Parameter::string("author", "Filter by commit author username"),
                    Parameter::string("path", "Filter by file path"),
                    Parameter::number("limit", "Maximum number of commits to return (default: 30)"),
                ],
                vec![],
            ),
            ToolKind::FileTree => (
                vec![
                    Parameter::string("path", "Path to a specific directory (default: root)"),
                    BRANCH,
                ],
                vec![],
            ),
            ToolKind::FileContent => (
                vec![
                    Parameter::string("path", "Full path to the file (e.g., 'src/index.ts')"),
                    BRANCH,
                ],
                vec!["path"],
            ),
            ToolKind::CommitDiff => (
                vec![Parameter::string("sha", "Commit SHA (can be short or full)")],
                vec!["sha"],
            ),
            ToolKind::CompareBranches => (
                vec![
                    Parameter::string("base", "Base branch or commit SHA"),
                    Parameter::string("head", "Head branch or commit SHA to compare"),
                ],
                vec!["base", "head"],
            ),
            ToolKind::SearchCode => (
                vec![
                    Parameter::string("query", "Search query (code pattern or text to find)"),
                    Parameter::string(
                        "extension",
                        "Limit search to files with this extension (e.g., 'ts', 'py')",
                    ),
                ],
                vec!["query"],
            ),
        }
    }

    pub fn declaration(&self) -> ToolDeclaration {
        let (extra, extra_required) = self.extra_parameters();
        let mut parameters = vec![OWNER, REPO];
        parameters.extend(extra);
        let mut required = vec![OWNER.name, REPO.name];
        required.extend(extra_required);

        ToolDeclaration {
            name: self.name(),
            description: self.description(),
            parameters,
            required,
        }
    }
}

/// Progress label for a tool name, including names the model made up.
pub fn progress_label_for(name: &str) -> String {
    ToolKind::from_name(name)
        .map(|kind| kind.progress_label().to_string())
        .unwrap_or_else(|| format!("Running {}", name))
}

/// Declarations for every tool, built once.
pub fn all_declarations() -> &'static [ToolDeclaration] {
    static DECLARATIONS: OnceLock<Vec<ToolDeclaration>> = OnceLock::new();
    DECLARATIONS.get_or_init(|| ToolKind::ALL.iter().map(|kind| kind.declaration()).collect())
}
