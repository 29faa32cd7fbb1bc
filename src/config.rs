//! Runtime configuration.
//!
//! Credentials and endpoint overrides are read from environment variables
//! first, then from an optional JSON file (`~/.repo-analyst/config.json` or
//! the path in `REPO_ANALYST_CONFIG`), then fall back to defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::llm::ProviderKind;

/// Model used when the caller does not pick one
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

const CONFIG_PATH_ENV: &str = "REPO_ANALYST_CONFIG";
const DEFAULT_MODEL_ENV: &str = "REPO_ANALYST_DEFAULT_MODEL";
const GEMINI_BASE_URL_ENV: &str = "GEMINI_BASE_URL";
const GROQ_BASE_URL_ENV: &str = "GROQ_BASE_URL";
const GITHUB_API_URL_ENV: &str = "GITHUB_API_URL";

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1/";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com/";

/// Iteration ceiling and size caps applied by the agent and the tool boundary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentLimits {
    /// Maximum number of tool batches fed back to the model
    pub max_iterations: usize,
    /// Characters of file content returned by `getFileContent`
    pub file_content_chars: usize,
    /// Characters of patch per file in PR details and commit diffs
    pub patch_chars: usize,
    /// Characters of patch per file in branch comparisons
    pub compare_patch_chars: usize,
    /// Commits listed in a branch comparison
    pub compare_commits: usize,
    /// Files listed in a branch comparison
    pub compare_files: usize,
    /// Files listed in a commit diff
    pub commit_diff_files: usize,
}

impl Default for AgentLimits {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            file_content_chars: 50_000,
            patch_chars: 10_000,
            compare_patch_chars: 5_000,
            compare_commits: 50,
            compare_files: 100,
            commit_diff_files: 50,
        }
    }
}

/// Shape of the optional JSON config file
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ConfigFile {
    gemini_api_key: Option<String>,
    groq_api_key: Option<String>,
    github_token: Option<String>,
    default_model: Option<String>,
    gemini_base_url: Option<String>,
    groq_base_url: Option<String>,
    github_api_url: Option<String>,
    limits: Option<AgentLimits>,
}

/// Resolved application configuration
#[derive(Clone)]
pub struct AppConfig {
    pub gemini_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub github_token: Option<String>,
    pub default_model: String,
    pub gemini_base_url: String,
    pub groq_base_url: String,
    pub github_api_url: String,
    pub limits: AgentLimits,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            groq_api_key: None,
            github_token: None,
            default_model: DEFAULT_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            groq_base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            limits: AgentLimits::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment and the default config file.
    pub fn load() -> Result<Self> {
        let path = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path)),
            _ => default_config_path(),
        };
        Self::load_with(path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Load configuration from an explicit file and variable lookup.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load_with(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let file = match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                let parsed: ConfigFile = serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse config file: {:?}", path))?;
                info!("Loaded configuration from {:?}", path);
                parsed
            }
            _ => ConfigFile::default(),
        };

        // Empty variables count as unset so `FOO= cmd` can blank out a file value.
        let env = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let config = Self {
            gemini_api_key: env(GEMINI_API_KEY_ENV).or(file.gemini_api_key),
            groq_api_key: env(GROQ_API_KEY_ENV).or(file.groq_api_key),
            github_token: env(GITHUB_TOKEN_ENV).or(file.github_token),
            default_model: env(DEFAULT_MODEL_ENV)
                .or(file.default_model)
                .unwrap_or(defaults.default_model),
            gemini_base_url: env(GEMINI_BASE_URL_ENV)
                .or(file.gemini_base_url)
                .unwrap_or(defaults.gemini_base_url),
            groq_base_url: env(GROQ_BASE_URL_ENV)
                .or(file.groq_base_url)
                .unwrap_or(defaults.groq_base_url),
            github_api_url: env(GITHUB_API_URL_ENV)
                .or(file.github_api_url)
                .unwrap_or(defaults.github_api_url),
            limits: file.limits.unwrap_or_default(),
        };

        debug!(
            gemini = config.gemini_api_key.is_some(),
            groq = config.groq_api_key.is_some(),
            github = config.github_token.is_some(),
            "credential availability"
        );
        Ok(config)
    }

    /// API key for the given provider, if configured.
    pub fn api_key(&self, kind: ProviderKind) -> Option<&str> {
        match kind {
            ProviderKind::NativeFunctionCalling => self.gemini_api_key.as_deref(),
            ProviderKind::ChatCompletions => self.groq_api_key.as_deref(),
        }
    }

    /// Base URL of the given provider's API.
    pub fn base_url(&self, kind: ProviderKind) -> &str {
        match kind {
            ProviderKind::NativeFunctionCalling => &self.gemini_base_url,
            ProviderKind::ChatCompletions => &self.groq_base_url,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("AppConfig")
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("groq_api_key", &redact(&self.groq_api_key))
            .field("github_token", &redact(&self.github_token))
            .field("default_model", &self.default_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("groq_base_url", &self.groq_base_url)
            .field("github_api_url", &self.github_api_url)
            .field("limits", &self.limits)
            .finish()
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".repo-analyst").join("config.json"))
}
