//! Typed argument envelopes, one per tool.
//!
//! The model's raw argument map is decoded into these before any GitHub call.
//! They double as the MCP parameter types, so the JSON schema comes from the
//! same definition.
//!
//! Models are loose with numbers (`30.0` from one provider, `"30"` from
//! another), so numeric fields accept any of those spellings.

use schemars::JsonSchema;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::github::StateFilter;

fn number_from(value: &Value) -> Option<u64> {
    let as_whole = |f: f64| (f >= 0.0 && f.fract() == 0.0).then_some(f as u64);
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(as_whole)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(as_whole))
        }
        _ => None,
    }
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    number_from(&value)
        .ok_or_else(|| de::Error::custom(format!("expected a non-negative integer, got {}", value)))
}

fn lenient_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => number_from(&value)
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("expected a non-negative integer, got {}", value))),
    }
}

/// Case-insensitive state; blank means "not given".
fn lenient_state<'de, D>(deserializer: D) -> Result<Option<StateFilter>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) => match s.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "open" => Ok(Some(StateFilter::Open)),
            "closed" => Ok(Some(StateFilter::Closed)),
            "all" => Ok(Some(StateFilter::All)),
            other => Err(de::Error::unknown_variant(other, StateFilter::VALUES)),
        },
    }
}

/// Arguments shared by tools that only need the repository
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RepoArgs {
    /// Repository owner/organization
    pub owner: String,
    /// Repository name
    pub repo: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ContributorsArgs {
    /// Repository owner/organization
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Maximum number of contributors to return (default: 30)
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    #[schemars(with = "Option<u32>")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PullRequestsArgs {
    /// Repository owner/organization
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Filter by PR state (default: all)
    #[serde(default, deserialize_with = "lenient_state")]
    #[schemars(with = "Option<StateFilter>")]
    pub state: Option<StateFilter>,
    /// Maximum number of PRs to return (default: 20)
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    #[schemars(with = "Option<u32>")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestDetailsArgs {
    /// Repository owner/organization
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Pull request number
    #[serde(deserialize_with = "lenient_u64")]
    #[schemars(with = "u64")]
    pub pr_number: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IssuesArgs {
    /// Repository owner/organization
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Filter by issue state (default: all)
    #[serde(default, deserialize_with = "lenient_state")]
    #[schemars(with = "Option<StateFilter>")]
    pub state: Option<StateFilter>,
    /// Comma-separated list of labels to filter by
    #[serde(default)]
    pub labels: Option<String>,
    /// Maximum number of issues to return (default: 20)
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    #[schemars(with = "Option<u32>")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CommitsArgs {
    /// Repository owner/organization
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Filter by commit author username
    #[serde(default)]
    pub author: Option<String>,
    /// Filter by file path
    #[serde(default)]
    pub path: Option<String>,
    /// Maximum number of commits to return (default: 30)
    #[serde(default, deserialize_with = "lenient_opt_u32")]
    #[schemars(with = "Option<u32>")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FileTreeArgs {
    /// Repository owner/organization
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Path to a specific directory (default: root)
    #[serde(default)]
    pub path: Option<String>,
    /// Branch name (default: main/master)
    #[serde(default)]
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FileContentArgs {
    /// Repository owner/organization
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Full path to the file (e.g., 'src/index.ts')
    pub path: String,
    /// Branch name (default: main/master)
    #[serde(default)]
    pub branch: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CommitDiffArgs {
    /// Repository owner/organization
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Commit SHA (can be short or full)
    pub sha: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompareBranchesArgs {
    /// Repository owner/organization
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Base branch or commit SHA
    pub base: String,
    /// Head branch or commit SHA to compare
    pub head: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchCodeArgs {
    /// Repository owner/organization
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Search query (code pattern or text to find)
    pub query: String,
    /// Limit search to files with this extension (e.g., 'ts', 'py')
    #[serde(default)]
    pub extension: Option<String>,
}
