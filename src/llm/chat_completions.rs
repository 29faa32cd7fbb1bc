//! OpenAI-style chat-completions adapter (Groq).
//!
//! The session keeps the explicit message list: the system prompt once, then
//! user, assistant and tool messages in order. Each tool message carries the
//! id of the call it answers.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use url::Url;

use super::transport::{base_url, build_client, post_json};
use super::{
    schema, ModelTurn, ProviderError, ProviderSession, SessionSettings, GROQ_ROUTING_PREFIX,
};
use crate::tools::{ToolInvocation, ToolResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    tool_calls: Vec<WireToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: WireFunction,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    /// JSON-encoded argument object
    #[serde(default, deserialize_with = "arguments_as_string")]
    arguments: String,
}

/// Assistant turns without tool calls may carry `"tool_calls": null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Some OpenAI-compatible servers send arguments as an object, not a string.
fn arguments_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    tools: &'a Value,
    tool_choice: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Decode a call's argument string; unparsable or null arguments become `{}`.
fn parse_arguments(name: &str, raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) => Value::Object(Map::new()),
        Ok(value) => value,
        Err(e) => {
            warn!(tool = name, "Unparsable tool arguments ({}): {}", e, raw);
            Value::Object(Map::new())
        }
    }
}

/// The model id as the upstream API knows it, without the local routing prefix.
fn upstream_model(model: &str) -> &str {
    let model = model.trim();
    match model.get(..GROQ_ROUTING_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(GROQ_ROUTING_PREFIX) => {
            &model[GROQ_ROUTING_PREFIX.len()..]
        }
        _ => model,
    }
}

pub struct ChatCompletionsSession {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
    system_prompt: String,
    tools: Value,
    messages: Vec<ChatMessage>,
}

impl ChatCompletionsSession {
    pub fn new(settings: &SessionSettings<'_>) -> Result<Self, ProviderError> {
        let endpoint = base_url(settings.base_url, "chat completions")?
            .join("chat/completions")
            .map_err(|e| ProviderError::malformed(format!("invalid endpoint: {}", e)))?;

        Ok(Self {
            client: build_client()?,
            endpoint,
            api_key: settings.api_key.to_string(),
            model: upstream_model(settings.model).to_string(),
            system_prompt: settings.system_prompt.to_string(),
            tools: schema::chat_tools(settings.declarations),
            messages: Vec::new(),
        })
    }

    async fn complete(&mut self) -> Result<ModelTurn, ProviderError> {
        debug!("=== Chat Completions Request ===");
        debug!("URL: {}", self.endpoint);
        debug!("Model: {}, messages: {}", self.model, self.messages.len());

        let body = ChatRequest {
            model: &self.model,
            messages: &self.messages,
            tools: &self.tools,
            tool_choice: "auto",
        };
        let request = self
            .client
            .post(self.endpoint.clone())
            .header("Authorization", format!("Bearer {}", self.api_key));
        let response: ChatResponse = post_json(request, &body).await?;

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| ProviderError::malformed("no choices returned"))?;

        let turn = ModelTurn {
            assistant_text: message.content.clone().unwrap_or_default(),
            tool_invocations: message
                .tool_calls
                .iter()
                .map(|call| ToolInvocation {
                    id: call.id.clone(),
                    name: call.function.name.clone(),
                    arguments: parse_arguments(&call.function.name, &call.function.arguments),
                })
                .collect(),
        };

        self.messages.push(message);
        info!(
            "Chat completions turn: {} tool call(s), {} chars of text",
            turn.tool_invocations.len(),
            turn.assistant_text.len()
        );
        Ok(turn)
    }
}

#[async_trait]
impl ProviderSession for ChatCompletionsSession {
    async fn converse_turn(&mut self, user_message: &str) -> Result<ModelTurn, ProviderError> {
        if self.messages.is_empty() {
            self.messages
                .push(ChatMessage::text("system", &self.system_prompt));
        }
        self.messages.push(ChatMessage::text("user", user_message));
        self.complete().await
    }

    async fn continue_with_tool_results(
        &mut self,
        results: &[ToolResult],
    ) -> Result<ModelTurn, ProviderError> {
        for result in results {
            self.messages.push(ChatMessage {
                role: "tool".to_string(),
                content: Some(result.payload.to_string()),
                tool_calls: Vec::new(),
                tool_call_id: Some(result.call_id.clone()),
            });
        }
        self.complete().await
    }
}
