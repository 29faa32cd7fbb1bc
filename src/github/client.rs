use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use super::http::{send_with_retry, RetryPolicy};
use crate::config::AgentLimits;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const GITHUB_API_VERSION: &str = "2022-11-28";
const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";

/// Default CLI version (from Cargo.toml)
const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors raised by the GitHub data-access layer.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    #[error("request to GitHub failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid GitHub URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("unexpected GitHub response: {0}")]
    Decode(String),

    /// The path exists but does not name a regular file.
    #[error("{0}")]
    NotAFile(&'static str),
}

/// GitHub error bodies look like `{"message": "Not Found", "documentation_url": ...}`
#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: String,
}

/// Read-only client for the GitHub REST API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
    user_agent: String,
    retry: RetryPolicy,
    limits: AgentLimits,
}

impl GitHubClient {
    /// Create a client for `base_url` (e.g. `https://api.github.com/`).
    pub fn new(
        base_url: &str,
        token: Option<String>,
        limits: AgentLimits,
    ) -> Result<Self, GitHubError> {
        // Without a trailing slash `Url::join` would drop the last path segment.
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.is_empty()),
            user_agent: format!("repo-analyst/{}", DEFAULT_VERSION),
            retry: RetryPolicy::default(),
            limits,
        })
    }

    #[cfg(test)]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn limits(&self) -> &AgentLimits {
        &self.limits
    }

    /// Build an endpoint URL from path segments, percent-encoding each one.
    pub(super) fn endpoint(&self, segments: &[&str]) -> Result<Url, GitHubError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GitHubError::Decode(format!("base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET `segments` with `query` parameters and decode the JSON body.
    pub(super) async fn get_json<R>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<R, GitHubError>
    where
        R: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        debug!("=== GitHub Request ===");
        debug!("URL: {}", url);

        let response = send_with_retry(self.retry, || {
            let mut request = self
                .client
                .get(url.clone())
                .header("Accept", ACCEPT_GITHUB_JSON)
                .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
                .header("User-Agent", &self.user_agent)
                .query(query);

            if let Some(token) = &self.token {
                request = request.header("Authorization", format!("Bearer {}", token));
            }

            request
        })
        .await?;

        let status = response.status();
        debug!("Status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GitHubErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or_else(|_| {
                    if body.is_empty() {
                        status
                            .canonical_reason()
                            .unwrap_or("Unknown error")
                            .to_string()
                    } else {
                        body
                    }
                });
            error!("GitHub request failed with status {}: {}", status, message);
            return Err(GitHubError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| GitHubError::Decode(e.to_string()))
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("retry", &self.retry)
            .finish()
    }
}
