use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

use super::ProviderError;

/// Model calls can take a while on long tool transcripts.
const PROVIDER_TIMEOUT_SECS: u64 = 120;

pub(super) fn build_client() -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
        .build()
        .map_err(ProviderError::transport)
}

/// Parse a provider base URL so that relative joins keep its path.
pub(super) fn base_url(raw: &str, provider: &str) -> Result<Url, ProviderError> {
    let mut base = Url::parse(raw).map_err(|e| {
        ProviderError::malformed(format!("invalid {} base URL: {}", provider, e))
    })?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

/// Send one JSON request and decode the JSON response.
///
/// No retries: a failed model call ends the agent run, and retrying is left
/// to whoever started it.
pub(super) async fn post_json<B, R>(request: RequestBuilder, body: &B) -> Result<R, ProviderError>
where
    B: Serialize,
    R: DeserializeOwned,
{
    let response = request
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(ProviderError::transport)?;

    let status = response.status();
    debug!("Provider response status: {}", status);

    if !status.is_success() {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();
        let err = ProviderError::from_http(status.as_u16(), retry_after.as_deref(), &body);
        error!(status = status.as_u16(), "Provider request failed: {}", err.message);
        return Err(err);
    }

    let text = response.text().await.map_err(ProviderError::transport)?;
    serde_json::from_str(&text).map_err(ProviderError::malformed)
}
