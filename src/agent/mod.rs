//! Agent orchestration.
//!
//! Turns a user question about a repository into a structured response by
//! running a tool-calling conversation with the selected model.

mod agent_loop;
mod failure;
mod messages;
mod progress;
mod prompt;
#[cfg(test)]
mod tests;

pub use agent_loop::AuditEntry;
pub use messages::{InMemoryMessageStore, MessageStore};
pub use progress::{InMemoryProgress, ProgressTracker};

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::domain::RepositoryContext;
use crate::llm::{self, ProviderError, ProviderKind, SessionSettings};
use crate::response::{self, StructuredResponse};
use crate::tools::ToolExecutor;
use agent_loop::{run_tool_loop, LoopOutcome};
use failure::{missing_credential_message, FailureKind};
use messages::AssistantMessage;
use progress::{ProgressNotification, STEP_GENERATING_RESPONSE, STEP_STARTING};
use prompt::{context_message, SYSTEM_PROMPT};

/// One question about one repository.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub session_id: String,
    pub query: String,
    pub repository: RepositoryContext,
    pub focus_contributors: Vec<String>,
    /// Falls back to the configured default model when unset or blank
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    #[serde(flatten)]
    pub response: StructuredResponse,
    pub tool_invocations: Vec<AuditEntry>,
}

pub struct Agent {
    config: AppConfig,
    tools: Arc<dyn ToolExecutor>,
    progress: Arc<dyn ProgressTracker>,
    messages: Arc<dyn MessageStore>,
}

impl Agent {
    pub fn new(
        config: AppConfig,
        tools: Arc<dyn ToolExecutor>,
        progress: Arc<dyn ProgressTracker>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        Self {
            config,
            tools,
            progress,
            messages,
        }
    }

    /// Answer one question.
    ///
    /// Provider failures are turned into a text response; only a failure to
    /// persist the final message is returned as an error. Progress for the
    /// session is cleared on every path that emitted any.
    pub async fn run(&self, request: AgentRequest) -> Result<AgentResponse> {
        let model = request
            .model_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(&self.config.default_model)
            .to_string();
        let kind = ProviderKind::for_model(&model);
        let session_id = request.session_id.as_str();

        let Some(api_key) = self.config.api_key(kind) else {
            warn!(session_id, model = %model, env = kind.credential_env(), "provider key missing");
            let response = StructuredResponse::text(missing_credential_message(kind));
            self.persist(session_id, &response, Vec::new()).await?;
            return Ok(AgentResponse {
                response,
                tool_invocations: Vec::new(),
            });
        };

        info!(
            session_id,
            model = %model,
            provider = kind.display_name(),
            repository = %request.repository.full_name,
            "starting analysis"
        );
        self.progress
            .update(session_id, ProgressNotification::analyzing(STEP_STARTING))
            .await;

        let (response, tool_invocations) =
            match self.converse(kind, api_key, &model, &request).await {
                Ok(outcome) => {
                    self.progress
                        .update(
                            session_id,
                            ProgressNotification::analyzing(STEP_GENERATING_RESPONSE),
                        )
                        .await;
                    let response = response::classify(&outcome.final_text);
                    info!(
                        session_id,
                        kind = response.kind.as_str(),
                        iterations = outcome.iterations,
                        tool_calls = outcome.tool_calls.len(),
                        hit_ceiling = outcome.hit_ceiling,
                        "analysis complete"
                    );
                    (response, outcome.tool_calls)
                }
                Err(err) => {
                    let failure = FailureKind::classify(&err, &model, kind);
                    error!(session_id, status = ?err.status, error = %err, "analysis failed");
                    (StructuredResponse::text(failure.user_message()), Vec::new())
                }
            };

        let persisted = self
            .persist(session_id, &response, tool_invocations.clone())
            .await;
        self.progress.clear(session_id).await;
        persisted?;

        Ok(AgentResponse {
            response,
            tool_invocations,
        })
    }

    async fn converse(
        &self,
        kind: ProviderKind,
        api_key: &str,
        model: &str,
        request: &AgentRequest,
    ) -> Result<LoopOutcome, ProviderError> {
        let settings = SessionSettings {
            model,
            api_key,
            base_url: self.config.base_url(kind),
            system_prompt: SYSTEM_PROMPT,
            declarations: self.tools.declarations(),
        };
        let mut session = llm::open_session(kind, &settings)?;
        let opening = context_message(
            &request.repository,
            &request.focus_contributors,
            &request.query,
        );

        run_tool_loop(
            session.as_mut(),
            self.tools.as_ref(),
            self.progress.as_ref(),
            &request.session_id,
            &opening,
            self.config.limits.max_iterations,
        )
        .await
    }

    async fn persist(
        &self,
        session_id: &str,
        response: &StructuredResponse,
        tool_calls: Vec<AuditEntry>,
    ) -> Result<()> {
        self.messages
            .add_assistant_message(session_id, AssistantMessage::new(response.clone(), tool_calls))
            .await
    }
}
