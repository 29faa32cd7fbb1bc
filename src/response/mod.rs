//! Classification of the model's final output.
//!
//! The model is asked to answer either in free-form markdown or with a JSON
//! object `{"type": ..., "data": ...}`. Anything that is not a well-formed
//! object of a known type becomes a plain text response wrapping the raw
//! output; classification itself never fails.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The five rendering shapes a response can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Text,
    Diff,
    Chart,
    Table,
    Mixed,
}

impl ResponseKind {
    pub const ALL: [ResponseKind; 5] = [
        ResponseKind::Text,
        ResponseKind::Diff,
        ResponseKind::Chart,
        ResponseKind::Table,
        ResponseKind::Mixed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Text => "text",
            ResponseKind::Diff => "diff",
            ResponseKind::Chart => "chart",
            ResponseKind::Table => "table",
            ResponseKind::Mixed => "mixed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredResponse {
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    pub data: Value,
}

impl StructuredResponse {
    /// Plain text response.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::Text,
            data: json!({ "content": content.into() }),
        }
    }

    /// Short plain-text rendering for storage and search.
    pub fn summary(&self) -> String {
        match self.kind {
            ResponseKind::Text => match self.data.get("content") {
                Some(Value::String(content)) => content.clone(),
                Some(other) => other.to_string(),
                None => String::new(),
            },
            ResponseKind::Mixed => first_text_section(&self.data)
                .unwrap_or_else(|| "Mixed analysis".to_string()),
            ResponseKind::Diff => titled(&self.data, "Diff", "Code changes"),
            ResponseKind::Chart => titled(&self.data, "Chart", "Chart analysis"),
            ResponseKind::Table => titled(&self.data, "Table", "Table analysis"),
        }
    }
}

fn titled(data: &Value, prefix: &str, fallback: &str) -> String {
    match data.get("title").and_then(Value::as_str) {
        Some(title) if !title.trim().is_empty() => format!("{}: {}", prefix, title),
        _ => fallback.to_string(),
    }
}

/// Content of the first `text` section; sections may nest it under `data`.
fn first_text_section(data: &Value) -> Option<String> {
    data.get("sections")?
        .as_array()?
        .iter()
        .filter(|section| section.get("type").and_then(Value::as_str) == Some("text"))
        .find_map(|section| {
            section
                .get("content")
                .or_else(|| section.get("data").and_then(|d| d.get("content")))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
}

/// Classify raw model output.
pub fn classify(raw: &str) -> StructuredResponse {
    parse_structured(raw).unwrap_or_else(|| StructuredResponse::text(raw))
}

fn parse_structured(raw: &str) -> Option<StructuredResponse> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with('{') && trimmed.ends_with('}')) {
        return None;
    }

    let mut value: Value = serde_json::from_str(trimmed).ok()?;
    let object = value.as_object_mut()?;
    let kind = ResponseKind::from_name(object.get("type")?.as_str()?)?;
    match object.remove("data") {
        None | Some(Value::Null) => None,
        Some(data) => Some(StructuredResponse { kind, data }),
    }
}
