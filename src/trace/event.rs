//! Trace event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Cost, FinishReason, Usage};

/// One observation in a request trace.
///
/// The request itself is the root observation (`observation_id ==
/// trace_id`); tool spans and generations hang off it via `parent_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceEvent {
    pub trace_id: String,
    pub observation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub kind: TraceEventKind,
}

/// Concrete event payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEventKind {
    /// A chat request entered the agent.
    Request { name: String, input: String },
    /// One model call inside the tool loop.
    Generation {
        model: String,
        iteration: usize,
        started_at: DateTime<Utc>,
        usage: Usage,
        cost: Cost,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        finish_reason: Option<FinishReason>,
    },
    /// The model asked for a tool.
    ToolCall {
        tool_name: String,
        call_id: String,
        arguments: serde_json::Value,
    },
    /// The tool finished.
    ToolResult {
        tool_name: String,
        call_id: String,
        result: serde_json::Value,
        is_error: bool,
    },
    /// The request finished, successfully or not.
    Response {
        output: String,
        usage: Usage,
        cost: Cost,
        is_error: bool,
    },
}

impl TraceEventKind {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Request { .. } => "request",
            Self::Generation { .. } => "generation",
            Self::ToolCall { .. } => "tool-call",
            Self::ToolResult { .. } => "tool-result",
            Self::Response { .. } => "response",
        }
    }
}
