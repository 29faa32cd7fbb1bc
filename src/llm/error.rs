use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

/// Normalized failure from either provider adapter.
///
/// `status` is the upstream HTTP status when there was one; transport and
/// decoding failures carry `None`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ProviderError {
    pub status: Option<u16>,
    pub message: String,
    pub retry_after: Option<Duration>,
}

/// Both providers wrap failures as `{"error": {"message": ..., ...}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    /// Gemini only: `google.rpc` detail objects
    #[serde(default)]
    details: Vec<Value>,
}

impl ProviderError {
    pub fn transport(err: reqwest::Error) -> Self {
        Self {
            status: err.status().map(|s| s.as_u16()),
            message: format!("Request to model provider failed: {}", err),
            retry_after: None,
        }
    }

    pub fn malformed(detail: impl std::fmt::Display) -> Self {
        Self {
            status: None,
            message: format!("Malformed response from model provider: {}", detail),
            retry_after: None,
        }
    }

    /// Build from a non-2xx response.
    pub fn from_http(status: u16, retry_after_header: Option<&str>, body: &str) -> Self {
        let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();

        let message = match &envelope {
            Some(env) if !env.error.message.is_empty() => env.error.message.clone(),
            _ if !body.trim().is_empty() => body.trim().to_string(),
            _ => format!("HTTP {}", status),
        };

        let retry_after = retry_after_header
            .and_then(|h| h.trim().parse::<u64>().ok().map(Duration::from_secs))
            .or_else(|| {
                envelope
                    .as_ref()
                    .and_then(|env| retry_info_delay(&env.error.details))
            })
            .or_else(|| retry_phrase_delay(&message));

        Self {
            status: Some(status),
            message,
            retry_after,
        }
    }
}

/// `{"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "90s"}`
fn retry_info_delay(details: &[Value]) -> Option<Duration> {
    details
        .iter()
        .filter(|d| {
            d.get("@type")
                .and_then(Value::as_str)
                .is_some_and(|t| t.contains("RetryInfo"))
        })
        .find_map(|d| d.get("retryDelay").and_then(Value::as_str))
        .and_then(parse_duration)
}

/// "Please try again in 1m30.5s."
fn retry_phrase_delay(message: &str) -> Option<Duration> {
    static PHRASE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = PHRASE
        .get_or_init(|| Regex::new(r"(?i)try again in\s+([0-9][0-9hms.]*)").ok())
        .as_ref()?;
    let caps = re.captures(message)?;
    parse_duration(caps.get(1)?.as_str().trim_end_matches('.'))
}

/// Parse compact durations like `90s`, `7.5s`, `1m30s`, `250ms`, `1h2m`.
fn parse_duration(text: &str) -> Option<Duration> {
    let mut rest = text.trim();
    let mut total = 0f64;
    let mut matched = false;

    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if digits == 0 {
            return None;
        }
        let value: f64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let (seconds, unit_len) = if rest.starts_with("ms") {
            (value / 1000.0, 2)
        } else if rest.starts_with('h') {
            (value * 3600.0, 1)
        } else if rest.starts_with('m') {
            (value * 60.0, 1)
        } else if rest.starts_with('s') {
            (value, 1)
        } else {
            return None;
        };
        total += seconds;
        rest = &rest[unit_len..];
        matched = true;
    }

    if !matched {
        return None;
    }
    Duration::try_from_secs_f64(total).ok()
}
