//! Progress notifications for in-flight agent runs.
//!
//! One slot per session, last write wins. Consumers poll the slot and may
//! miss intermediate steps; they never see a step older than the loop state.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Status reported for every step of a running analysis
pub const STATUS_ANALYZING: &str = "analyzing";

pub const STEP_STARTING: &str = "🤖 Starting AI analysis";
pub const STEP_PROCESSING_QUESTION: &str = "💬 Processing your question";
pub const STEP_ANALYZING_RESULTS: &str = "🧠 Analyzing results";
pub const STEP_GENERATING_RESPONSE: &str = "✨ Generating response";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressNotification {
    pub status: String,
    pub current_step: String,
}

impl ProgressNotification {
    pub fn analyzing(step: impl Into<String>) -> Self {
        Self {
            status: STATUS_ANALYZING.to_string(),
            current_step: step.into(),
        }
    }
}

/// Sink for progress notifications, keyed by session id.
///
/// Implementations swallow (and log) their own failures: progress is
/// best-effort and must never abort an agent run.
#[async_trait]
pub trait ProgressTracker: Send + Sync {
    async fn update(&self, session_id: &str, notification: ProgressNotification);

    /// Remove the session's notification. Clearing an empty slot is a no-op.
    async fn clear(&self, session_id: &str);

    async fn current(&self, session_id: &str) -> Option<ProgressNotification>;
}

/// Process-local progress slots
#[derive(Debug, Clone, Default)]
pub struct InMemoryProgress {
    slots: Arc<RwLock<HashMap<String, ProgressNotification>>>,
}

impl InMemoryProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressTracker for InMemoryProgress {
    async fn update(&self, session_id: &str, notification: ProgressNotification) {
        debug!(session_id, step = %notification.current_step, "progress");
        self.slots
            .write()
            .await
            .insert(session_id.to_string(), notification);
    }

    async fn clear(&self, session_id: &str) {
        self.slots.write().await.remove(session_id);
    }

    async fn current(&self, session_id: &str) -> Option<ProgressNotification> {
        self.slots.read().await.get(session_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_last_write_wins_and_clear_is_idempotent() {
        let progress = InMemoryProgress::new();
        progress
            .update("s1", ProgressNotification::analyzing(STEP_STARTING))
            .await;
        progress
            .update("s1", ProgressNotification::analyzing(STEP_ANALYZING_RESULTS))
            .await;
        progress
            .update("s2", ProgressNotification::analyzing(STEP_STARTING))
            .await;

        let current = progress.current("s1").await.unwrap();
        assert_eq!(current.current_step, STEP_ANALYZING_RESULTS);
        assert_eq!(current.status, "analyzing");

        progress.clear("s1").await;
        progress.clear("s1").await;
        assert!(progress.current("s1").await.is_none());
        assert!(progress.current("s2").await.is_some());
    }
}
