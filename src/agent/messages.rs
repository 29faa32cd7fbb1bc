//! Persistence of the assistant's final output.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::agent_loop::AuditEntry;
use crate::response::StructuredResponse;

/// One assistant message as handed to the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantMessage {
    /// Plain-text summary of `response`
    pub content: String,
    pub response: StructuredResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<AuditEntry>>,
    pub timestamp: DateTime<Utc>,
}

impl AssistantMessage {
    pub fn new(response: StructuredResponse, tool_calls: Vec<AuditEntry>) -> Self {
        Self {
            content: response.summary(),
            response,
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn add_assistant_message(&self, session_id: &str, message: AssistantMessage)
        -> Result<()>;
}

/// Process-local message history, keyed by session id
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageStore {
    messages: Arc<RwLock<HashMap<String, Vec<AssistantMessage>>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn messages(&self, session_id: &str) -> Vec<AssistantMessage> {
        self.messages
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn add_assistant_message(
        &self,
        session_id: &str,
        message: AssistantMessage,
    ) -> Result<()> {
        self.messages
            .write()
            .await
            .entry(session_id.to_string())
            .or_default()
            .push(message);
        Ok(())
    }
}
