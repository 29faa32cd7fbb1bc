//! Tool registry.
//!
//! Declares the GitHub tools in a provider-neutral form and executes tool
//! invocations emitted by the model.

pub mod args;
mod declarations;
mod payload;
mod registry;

pub use declarations::{
    all_declarations, progress_label_for, ParamType, Parameter, ToolDeclaration, ToolKind,
};
pub use payload::{into_struct, is_error_payload};
pub use registry::ToolRegistry;

use async_trait::async_trait;
use serde_json::Value;

/// One tool call requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    /// Correlation id; provider-issued for chat completions, generated otherwise
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// Outcome of one invocation, fed back to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub call_id: String,
    pub tool_name: String,
    pub payload: Value,
}

/// Anything that can declare and execute tools.
///
/// `execute` never fails: errors come back as `{"error": "..."}` payloads.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    fn declarations(&self) -> &[ToolDeclaration];

    async fn execute(&self, name: &str, arguments: &Value) -> Value;
}
