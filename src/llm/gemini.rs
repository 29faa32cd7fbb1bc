//! Gemini native function-calling adapter.
//!
//! The upstream is stateless, so the session keeps the `contents` history
//! and resends it every turn. Model turns are stored exactly as received so
//! any opaque fields (thought signatures) go back unchanged.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use super::transport::{base_url, build_client, post_json};
use super::{schema, ModelTurn, ProviderError, ProviderSession, SessionSettings};
use crate::tools::{into_struct, ToolInvocation, ToolResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: &'a Value,
    contents: &'a [Value],
    tools: &'a Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Value>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

/// Typed view over one raw `content` object
#[derive(Debug, Default, Deserialize)]
struct ContentView {
    #[serde(default)]
    parts: Vec<PartView>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartView {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
    #[serde(default)]
    function_call: Option<FunctionCallView>,
}

#[derive(Debug, Deserialize)]
struct FunctionCallView {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    args: Value,
}

pub struct GeminiSession {
    client: Client,
    endpoint: Url,
    api_key: String,
    system_instruction: Value,
    tools: Value,
    contents: Vec<Value>,
}

impl GeminiSession {
    pub fn new(settings: &SessionSettings<'_>) -> Result<Self, ProviderError> {
        let endpoint = base_url(settings.base_url, "Gemini")?
            .join(&format!("v1beta/models/{}:generateContent", settings.model))
            .map_err(|e| ProviderError::malformed(format!("invalid Gemini model id: {}", e)))?;

        Ok(Self {
            client: build_client()?,
            endpoint,
            api_key: settings.api_key.to_string(),
            system_instruction: json!({ "parts": [{ "text": settings.system_prompt }] }),
            tools: schema::gemini_tools(settings.declarations),
            contents: Vec::new(),
        })
    }

    async fn generate(&mut self) -> Result<ModelTurn, ProviderError> {
        debug!("=== Gemini Request ===");
        debug!("URL: {}", self.endpoint);
        debug!("History length: {}", self.contents.len());

        let body = GenerateContentRequest {
            system_instruction: &self.system_instruction,
            contents: &self.contents,
            tools: &self.tools,
        };
        let request = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key);
        let response: GenerateContentResponse = post_json(request, &body).await?;

        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(ProviderError::malformed(reason));
        };

        let Some(content) = candidate.content else {
            // Finished without content (e.g. a safety stop): treat as empty text.
            info!(
                "Gemini returned no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            );
            return Ok(ModelTurn::default());
        };

        let view: ContentView =
            serde_json::from_value(content.clone()).map_err(ProviderError::malformed)?;
        self.contents.push(content);

        let mut turn = ModelTurn::default();
        for part in view.parts {
            if let Some(call) = part.function_call {
                turn.tool_invocations.push(ToolInvocation {
                    id: call.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    name: call.name,
                    arguments: match call.args {
                        Value::Null => Value::Object(Map::new()),
                        args => args,
                    },
                });
            } else if let Some(text) = part.text.filter(|_| !part.thought) {
                turn.assistant_text.push_str(&text);
            }
        }

        info!(
            "Gemini turn: {} tool call(s), {} chars of text",
            turn.tool_invocations.len(),
            turn.assistant_text.len()
        );
        Ok(turn)
    }
}

#[async_trait]
impl ProviderSession for GeminiSession {
    async fn converse_turn(&mut self, user_message: &str) -> Result<ModelTurn, ProviderError> {
        self.contents.push(json!({
            "role": "user",
            "parts": [{ "text": user_message }],
        }));
        self.generate().await
    }

    /// All results of a batch go back as one user turn of `functionResponse`
    /// parts. The response field must be an object, hence [`into_struct`].
    async fn continue_with_tool_results(
        &mut self,
        results: &[ToolResult],
    ) -> Result<ModelTurn, ProviderError> {
        let parts: Vec<Value> = results
            .iter()
            .map(|result| {
                json!({
                    "functionResponse": {
                        "name": result.tool_name,
                        "response": into_struct(result.payload.clone()),
                    }
                })
            })
            .collect();
        self.contents.push(json!({ "role": "user", "parts": parts }));
        self.generate().await
    }
}
