//! Provider adapters.
//!
//! Two upstream calling conventions sit behind one [`ProviderSession`]
//! contract: Gemini's native function calling and the OpenAI-style chat
//! completions API (served by Groq). Which one a model uses is decided once,
//! by [`ProviderKind::for_model`].

mod chat_completions;
mod error;
mod gemini;
pub mod schema;
mod transport;
#[cfg(test)]
mod tests;

pub use chat_completions::ChatCompletionsSession;
pub use error::ProviderError;
pub use gemini::GeminiSession;

use async_trait::async_trait;

use crate::config::{GEMINI_API_KEY_ENV, GROQ_API_KEY_ENV};
use crate::tools::{ToolDeclaration, ToolInvocation, ToolResult};

/// Local routing prefix forcing the chat-completions adapter; stripped before sending.
pub(crate) const GROQ_ROUTING_PREFIX: &str = "groq/";

/// Model id prefixes served through the chat-completions adapter
const CHAT_COMPLETIONS_PREFIXES: &[&str] = &[
    "llama",
    "mixtral",
    "gemma",
    "qwen",
    "deepseek",
    "moonshotai/",
    "openai/",
    "meta-llama/",
    GROQ_ROUTING_PREFIX,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Gemini `generateContent` with function declarations
    NativeFunctionCalling,
    /// OpenAI-style `POST /chat/completions` (Groq)
    ChatCompletions,
}

impl ProviderKind {
    /// Route a model id to an adapter. Total: unknown ids go to Gemini.
    pub fn for_model(model_id: &str) -> Self {
        let id = model_id.trim().to_ascii_lowercase();
        if CHAT_COMPLETIONS_PREFIXES.iter().any(|p| id.starts_with(p)) {
            ProviderKind::ChatCompletions
        } else {
            ProviderKind::NativeFunctionCalling
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn credential_env(&self) -> &'static str {
        match self {
            ProviderKind::NativeFunctionCalling => GEMINI_API_KEY_ENV,
            ProviderKind::ChatCompletions => GROQ_API_KEY_ENV,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::NativeFunctionCalling => "Gemini",
            ProviderKind::ChatCompletions => "Groq",
        }
    }
}

/// What the model said in one round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelTurn {
    pub assistant_text: String,
    pub tool_invocations: Vec<ToolInvocation>,
}

/// One conversation with an upstream model.
///
/// The session owns the upstream transcript; callers only ever hand it the
/// next user message or the next batch of tool results.
#[async_trait]
pub trait ProviderSession: Send {
    /// Send the opening user message.
    async fn converse_turn(&mut self, user_message: &str) -> Result<ModelTurn, ProviderError>;

    /// Feed back results for the previous turn's invocations, in invocation order.
    async fn continue_with_tool_results(
        &mut self,
        results: &[ToolResult],
    ) -> Result<ModelTurn, ProviderError>;
}

/// Everything needed to open a session.
#[derive(Clone, Copy)]
pub struct SessionSettings<'a> {
    pub model: &'a str,
    pub api_key: &'a str,
    pub base_url: &'a str,
    pub system_prompt: &'a str,
    pub declarations: &'a [ToolDeclaration],
}

/// Open a session with the adapter for `kind`.
pub fn open_session(
    kind: ProviderKind,
    settings: &SessionSettings<'_>,
) -> Result<Box<dyn ProviderSession>, ProviderError> {
    Ok(match kind {
        ProviderKind::NativeFunctionCalling => Box::new(GeminiSession::new(settings)?),
        ProviderKind::ChatCompletions => Box::new(ChatCompletionsSession::new(settings)?),
    })
}
