//! The bounded tool-calling loop.
//!
//! One opening turn, then up to `max_iterations` rounds of: run every
//! requested tool concurrently, feed the results back in invocation order,
//! read the next turn. The loop ends when a turn requests no tools or the
//! ceiling is reached; in the latter case the last turn's text is used even
//! if it still had tool requests pending.

use futures_util::future::join_all;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::progress::{
    ProgressNotification, ProgressTracker, STEP_ANALYZING_RESULTS, STEP_PROCESSING_QUESTION,
};
use crate::llm::{ProviderError, ProviderSession};
use crate::tools::{is_error_payload, progress_label_for, ToolExecutor, ToolInvocation, ToolResult};

/// Record of one executed tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub tool_name: String,
    pub arguments: Value,
    /// `"success"`, or the error payload the tool returned
    pub result_summary: Value,
}

impl AuditEntry {
    fn from_result(invocation: &ToolInvocation, result: &ToolResult) -> Self {
        let result_summary = if is_error_payload(&result.payload) {
            result.payload.clone()
        } else {
            Value::String("success".to_string())
        };
        Self {
            tool_name: invocation.name.clone(),
            arguments: invocation.arguments.clone(),
            result_summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopOutcome {
    /// Text of the last model turn
    pub final_text: String,
    /// Every executed call, batch by batch in invocation order
    pub tool_calls: Vec<AuditEntry>,
    /// Number of tool batches fed back to the model
    pub iterations: usize,
    /// True when the loop stopped with tool requests still pending
    pub hit_ceiling: bool,
}

/// Drive `session` until the model stops asking for tools.
///
/// Provider errors abort the loop and propagate; tool failures never do.
pub async fn run_tool_loop(
    session: &mut dyn ProviderSession,
    tools: &dyn ToolExecutor,
    progress: &dyn ProgressTracker,
    session_id: &str,
    opening_message: &str,
    max_iterations: usize,
) -> Result<LoopOutcome, ProviderError> {
    progress
        .update(session_id, ProgressNotification::analyzing(STEP_PROCESSING_QUESTION))
        .await;

    let mut turn = session.converse_turn(opening_message).await?;
    let mut tool_calls = Vec::new();
    let mut iterations = 0;

    while !turn.tool_invocations.is_empty() {
        if iterations >= max_iterations {
            warn!(
                session_id,
                pending = turn.tool_invocations.len(),
                "iteration ceiling reached, answering with pending tool requests"
            );
            return Ok(LoopOutcome {
                final_text: turn.assistant_text,
                tool_calls,
                iterations,
                hit_ceiling: true,
            });
        }

        let invocations = std::mem::take(&mut turn.tool_invocations);
        debug!(session_id, batch = invocations.len(), "executing tool batch");
        let started = Instant::now();

        // join_all polls in order, so each label is emitted before its tool starts
        // and results come back in invocation order regardless of completion order.
        let results = join_all(invocations.iter().map(|invocation| async move {
            progress
                .update(
                    session_id,
                    ProgressNotification::analyzing(progress_label_for(&invocation.name)),
                )
                .await;
            let payload = tools.execute(&invocation.name, &invocation.arguments).await;
            ToolResult {
                call_id: invocation.id.clone(),
                tool_name: invocation.name.clone(),
                payload,
            }
        }))
        .await;

        info!(
            session_id,
            batch = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "tool batch finished"
        );

        tool_calls.extend(
            invocations
                .iter()
                .zip(&results)
                .map(|(invocation, result)| AuditEntry::from_result(invocation, result)),
        );

        progress
            .update(session_id, ProgressNotification::analyzing(STEP_ANALYZING_RESULTS))
            .await;

        turn = session.continue_with_tool_results(&results).await?;
        iterations += 1;
    }

    Ok(LoopOutcome {
        final_text: turn.assistant_text,
        tool_calls,
        iterations,
        hit_ceiling: false,
    })
}
