//! Conversational runtime boundary.
//!
//! An [`AgentRuntime`] accepts a user message, optionally continuing an
//! earlier context, and returns the context id together with the final reply.
//! Context state (conversation history) lives entirely behind this trait.

pub mod claude;

pub use claude::{ClaudeRuntime, RuntimeOptions};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::HrAgentError;
use crate::types::{AgentToolCall, AgentToolResult, FinishReason, Usage};

/// Default bound on model round-trips per send.
pub const DEFAULT_MAX_TOOL_ITERATIONS: usize = 20;

/// One message sent to the runtime.
#[derive(Clone)]
pub struct RuntimeRequest {
    pub message: String,
    /// Context to continue. `None` starts a fresh one.
    pub resume: Option<String>,
    pub observer: Option<Arc<dyn RunObserver>>,
}

impl RuntimeRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            resume: None,
            observer: None,
        }
    }

    pub fn resume(mut self, session_id: Option<String>) -> Self {
        self.resume = session_id;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

impl std::fmt::Debug for RuntimeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeRequest")
            .field("message", &self.message)
            .field("resume", &self.resume)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// Outcome of one send.
#[derive(Debug, Clone)]
pub struct RuntimeReply {
    /// Context id to pass back as `resume` on the next send.
    pub session_id: String,
    pub text: String,
    /// `true` when an existing context with history was continued.
    pub resumed: bool,
    pub usage: Usage,
    pub steps: Vec<RunStep>,
    pub finish_reason: Option<FinishReason>,
}

/// One model call plus the tool executions it triggered.
#[derive(Debug, Clone)]
pub struct RunStep {
    pub text: String,
    pub tool_calls: Vec<AgentToolCall>,
    pub tool_results: Vec<AgentToolResult>,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
}

/// Timing and usage of one model call.
#[derive(Debug, Clone)]
pub struct GenerationRecord {
    pub iteration: usize,
    pub model: String,
    pub usage: Usage,
    pub finish_reason: Option<FinishReason>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

/// Receives progress callbacks while a send is running.
///
/// Callbacks run inline on the request task and must not block.
pub trait RunObserver: Send + Sync {
    fn on_generation(&self, _record: &GenerationRecord) {}

    fn on_tool_call(&self, _call: &AgentToolCall) {}

    fn on_tool_result(&self, _call: &AgentToolCall, _result: &AgentToolResult) {}
}

/// The external conversational runtime.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn send(&self, request: RuntimeRequest) -> Result<RuntimeReply, HrAgentError>;
}
