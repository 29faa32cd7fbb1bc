//! User-facing classification of provider failures.

use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

use crate::llm::{ProviderError, ProviderKind};

const RATE_LIMIT_KEYWORDS: &[&str] = &["quota", "too many requests", "rate limit", "rate_limit"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    RateLimited {
        model: String,
        retry_after: Option<Duration>,
    },
    InvalidRequest,
    AccessDenied {
        provider: &'static str,
    },
    ModelNotFound {
        model: String,
    },
    Other {
        detail: String,
    },
}

/// Model named in the error text (`model: gemini-2.5-flash`), if any.
fn model_in_message(message: &str) -> Option<String> {
    static MODEL: OnceLock<Option<Regex>> = OnceLock::new();
    let re = MODEL
        .get_or_init(|| Regex::new(r"model:\s*([^\s,]+)").ok())
        .as_ref()?;
    re.captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn is_rate_limited(err: &ProviderError) -> bool {
    if err.status == Some(429) {
        return true;
    }
    let message = err.message.to_lowercase();
    RATE_LIMIT_KEYWORDS.iter().any(|k| message.contains(k))
}

/// " Please try again in about 2 minutes." / " Please try again in 8 seconds."
fn retry_hint(retry_after: Duration) -> String {
    let seconds = retry_after.as_secs_f64().ceil() as u64;
    if seconds > 60 {
        format!(" Please try again in about {} minutes.", seconds.div_ceil(60))
    } else {
        format!(" Please try again in {} seconds.", seconds)
    }
}

impl FailureKind {
    pub fn classify(err: &ProviderError, selected_model: &str, provider: ProviderKind) -> Self {
        if is_rate_limited(err) {
            return FailureKind::RateLimited {
                model: model_in_message(&err.message)
                    .unwrap_or_else(|| selected_model.to_string()),
                retry_after: err.retry_after,
            };
        }

        match err.status {
            Some(400) => FailureKind::InvalidRequest,
            Some(403) => FailureKind::AccessDenied {
                provider: provider.display_name(),
            },
            Some(404) => FailureKind::ModelNotFound {
                model: selected_model.to_string(),
            },
            _ => FailureKind::Other {
                detail: err
                    .message
                    .lines()
                    .next()
                    .filter(|line| !line.trim().is_empty())
                    .unwrap_or("An unexpected error occurred")
                    .to_string(),
            },
        }
    }

    /// Markdown message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            FailureKind::RateLimited { model, retry_after } => format!(
                "⏱️ **Rate Limit Reached**\n\n\
                 You've reached the request limit for the **{}** model.{}\n\n\
                 **What you can do:**\n\
                 - Wait a moment and try again\n\
                 - Switch to a different model\n\
                 - Upgrade your API plan for higher limits\n\n\
                 💡 *Tip: Different models have separate rate limits, so switching models can help!*",
                model,
                retry_after.map(retry_hint).unwrap_or_default()
            ),
            FailureKind::InvalidRequest => "❌ **Invalid Request**\n\n\
                 There was an issue with the request format.\n\n\
                 This might be a temporary issue. Please try:\n\
                 - Rephrasing your question\n\
                 - Trying a different model\n\
                 - Waiting a moment and trying again"
                .to_string(),
            FailureKind::AccessDenied { provider } => format!(
                "🔒 **Access Denied**\n\n\
                 The API key doesn't have permission for this operation.\n\n\
                 Please check:\n\
                 - Your {} API key is valid\n\
                 - The API key has the necessary permissions\n\
                 - Your API quota hasn't been exceeded",
                provider
            ),
            FailureKind::ModelNotFound { model } => format!(
                "🔍 **Model Not Found**\n\n\
                 The selected AI model ({}) couldn't be found.\n\n\
                 This might mean:\n\
                 - The model is not available in your region\n\
                 - The model name has changed\n\
                 - The model requires a different API tier\n\n\
                 Try selecting a different model.",
                model
            ),
            FailureKind::Other { detail } => format!(
                "❌ **Error analyzing repository**\n\n{}\n\nPlease try again or rephrase your question.",
                detail
            ),
        }
    }
}

/// Message returned when the selected provider has no API key configured.
pub fn missing_credential_message(provider: ProviderKind) -> String {
    format!(
        "⚠️ **{} API key not configured**\n\nPlease set the `{}` environment variable.",
        provider.display_name(),
        provider.credential_env()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_error(status: u16, message: &str, retry_after: Option<Duration>) -> ProviderError {
        ProviderError {
            status: Some(status),
            message: message.to_string(),
            retry_after,
        }
    }

    #[test]
    fn test_rate_limit_names_model_and_rounds_minutes_up() {
        let err = http_error(
            429,
            "Quota exceeded for metric: requests, model: gemini-2.5-flash-lite",
            Some(Duration::from_secs(90)),
        );
        let kind = FailureKind::classify(&err, "gemini-2.5-flash", ProviderKind::NativeFunctionCalling);
        assert_eq!(
            kind,
            FailureKind::RateLimited {
                model: "gemini-2.5-flash-lite".to_string(),
                retry_after: Some(Duration::from_secs(90)),
            }
        );
        let message = kind.user_message();
        assert!(message.contains("about 2 minutes"));
        assert!(message.contains("**gemini-2.5-flash-lite**"));
    }

    #[test]
    fn test_rate_limit_by_keyword_uses_selected_model() {
        let err = ProviderError {
            status: None,
            message: "Too Many Requests".to_string(),
            retry_after: Some(Duration::from_secs(30)),
        };
        let kind = FailureKind::classify(&err, "llama-3.3-70b-versatile", ProviderKind::ChatCompletions);
        let message = kind.user_message();
        assert!(message.contains("**llama-3.3-70b-versatile**"));
        assert!(message.contains("try again in 30 seconds"));
    }

    #[test]
    fn test_retry_hint_boundaries() {
        assert_eq!(retry_hint(Duration::from_secs(60)), " Please try again in 60 seconds.");
        assert_eq!(retry_hint(Duration::from_secs(61)), " Please try again in about 2 minutes.");
        assert_eq!(retry_hint(Duration::from_secs(120)), " Please try again in about 2 minutes.");
        assert_eq!(retry_hint(Duration::from_millis(7500)), " Please try again in 8 seconds.");
    }

    #[test]
    fn test_status_categories() {
        let native = ProviderKind::NativeFunctionCalling;
        assert_eq!(
            FailureKind::classify(&http_error(400, "bad", None), "m", native),
            FailureKind::InvalidRequest
        );
        assert_eq!(
            FailureKind::classify(&http_error(403, "denied", None), "m", native),
            FailureKind::AccessDenied { provider: "Gemini" }
        );
        assert_eq!(
            FailureKind::classify(&http_error(404, "missing", None), "gemini-9", native),
            FailureKind::ModelNotFound {
                model: "gemini-9".to_string()
            }
        );
        assert_eq!(
            FailureKind::classify(&http_error(500, "boom\nstack trace", None), "m", native),
            FailureKind::Other {
                detail: "boom".to_string()
            }
        );
        assert!(FailureKind::ModelNotFound {
            model: "gemini-9".to_string()
        }
        .user_message()
        .contains("(gemini-9)"));
    }

    #[test]
    fn test_missing_credential_names_env_var() {
        let message = missing_credential_message(ProviderKind::ChatCompletions);
        assert!(message.contains("GROQ_API_KEY"));
        assert!(message.contains("Groq"));
    }
}
