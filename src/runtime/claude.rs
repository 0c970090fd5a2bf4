//! Runtime backed by a [`ModelProvider`] with an in-process tool loop.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bon::Builder;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use super::{
    AgentRuntime, GenerationRecord, RunObserver, RunStep, RuntimeReply, RuntimeRequest,
    DEFAULT_MAX_TOOL_ITERATIONS,
};
use crate::error::HrAgentError;
use crate::provider::{ModelProvider, ProviderRequest, ToolDefinition};
use crate::tools::{validate_arguments, ToolArguments, ToolExecutionContext, ToolTable};
use crate::types::*;

/// What the runtime is configured with at construction.
#[derive(Debug, Clone, Builder)]
pub struct RuntimeOptions {
    #[builder(into)]
    pub system_prompt: Option<String>,
    #[builder(default)]
    pub tools: ToolTable,
    /// Tools the model may run. `None` allows every registered tool.
    pub allowed_tools: Option<Vec<String>>,
    #[builder(default)]
    pub settings: GenerationSettings,
    #[builder(default = DEFAULT_MAX_TOOL_ITERATIONS)]
    pub max_tool_iterations: usize,
}

type Context = Arc<Mutex<Vec<ModelMessage>>>;

/// Drives the Anthropic Messages API (through a provider) and owns one
/// history per context id.
pub struct ClaudeRuntime {
    provider: Arc<dyn ModelProvider>,
    options: RuntimeOptions,
    offered: ToolTable,
    contexts: RwLock<HashMap<String, Context>>,
}

impl ClaudeRuntime {
    pub fn new(provider: Arc<dyn ModelProvider>, options: RuntimeOptions) -> Self {
        let offered = match &options.allowed_tools {
            Some(allowed) => options.tools.restricted_to(allowed),
            None => options.tools.clone(),
        };
        Self {
            provider,
            options,
            offered,
            contexts: RwLock::new(HashMap::new()),
        }
    }

    /// Committed history of a context, without the system prompt.
    pub async fn history(&self, session_id: &str) -> Option<Vec<ModelMessage>> {
        let context = self.contexts.read().await.get(session_id).cloned()?;
        let history = context.lock().await.clone();
        Some(history)
    }

    /// Number of contexts currently held.
    pub async fn context_count(&self) -> usize {
        self.contexts.read().await.len()
    }

    async fn context(&self, session_id: &str) -> Context {
        if let Some(ctx) = self.contexts.read().await.get(session_id) {
            return Arc::clone(ctx);
        }
        let mut contexts = self.contexts.write().await;
        Arc::clone(contexts.entry(session_id.to_string()).or_default())
    }

    /// Drop an adopted context whose first send failed. Skipped while another
    /// send holds it.
    async fn forget_if_empty(&self, session_id: &str) {
        let mut contexts = self.contexts.write().await;
        let empty = contexts
            .get(session_id)
            .is_some_and(|ctx| ctx.try_lock().is_ok_and(|history| history.is_empty()));
        if empty {
            contexts.remove(session_id);
        }
    }

    fn tool_definitions(&self) -> Option<Vec<ToolDefinition>> {
        if self.offered.is_empty() {
            None
        } else {
            Some(self.offered.definitions())
        }
    }

    fn request_messages(&self, conversation: &[ModelMessage]) -> Vec<ModelMessage> {
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        if let Some(prompt) = &self.options.system_prompt {
            messages.push(ModelMessage::system(prompt.clone()));
        }
        messages.extend_from_slice(conversation);
        messages
    }

    async fn run_tool(
        &self,
        call: &AgentToolCall,
        session_id: &str,
    ) -> Result<serde_json::Value, HrAgentError> {
        let Some(tool) = self.offered.get(&call.name) else {
            if self.options.tools.get(&call.name).is_some() {
                return Err(HrAgentError::tool(
                    call.name.clone(),
                    format!("Tool '{}' is not permitted", call.name),
                ));
            }
            return Err(HrAgentError::ToolNotFound(call.name.clone()));
        };

        // decodes string-encoded arguments into an object
        let value: serde_json::Value = ToolArguments::new(call.arguments.clone()).deserialize()?;
        validate_arguments(&value, &tool.parameters().schema)?;
        let args = ToolArguments::new(value);
        let ctx = ToolExecutionContext::for_call(session_id, &call.id);
        tool.execute(&args, &ctx).await
    }

    /// The tool loop. Returns the final text and the extended conversation.
    async fn run(
        &self,
        session_id: &str,
        mut conversation: Vec<ModelMessage>,
        observer: Option<&dyn RunObserver>,
    ) -> Result<(RuntimeReply, Vec<ModelMessage>), HrAgentError> {
        let tools = self.tool_definitions();
        let mut steps: Vec<RunStep> = Vec::new();
        let mut total_usage = Usage::default();

        for iteration in 0..self.options.max_tool_iterations {
            let request = ProviderRequest {
                messages: self.request_messages(&conversation),
                settings: self.options.settings.clone(),
                tools: tools.clone(),
            };

            debug!(session_id, iteration, "runtime: calling provider");
            let started_at = Utc::now();
            let response = self.provider.generate_text(&request).await?;
            total_usage += response.usage;

            if let Some(observer) = observer {
                observer.on_generation(&GenerationRecord {
                    iteration,
                    model: self.provider.model_id().to_string(),
                    usage: response.usage,
                    finish_reason: response.finish_reason,
                    started_at,
                    ended_at: Utc::now(),
                });
            }

            let mut step = RunStep {
                text: response.text.clone(),
                tool_calls: response.tool_calls.clone(),
                tool_results: Vec::new(),
                usage: response.usage,
                finish_reason: response.finish_reason,
            };

            if response.tool_calls.is_empty() {
                conversation.push(ModelMessage::assistant(response.text.clone()));
                steps.push(step);
                let reply = RuntimeReply {
                    session_id: session_id.to_string(),
                    text: response.text,
                    resumed: false,
                    usage: total_usage,
                    steps,
                    finish_reason: response.finish_reason,
                };
                return Ok((reply, conversation));
            }

            conversation.push(ModelMessage::assistant_tool_calls(
                response.text.clone(),
                &response.tool_calls,
            ));

            for call in &response.tool_calls {
                if let Some(observer) = observer {
                    observer.on_tool_call(call);
                }
                let result = match self.run_tool(call, session_id).await {
                    Ok(value) => AgentToolResult::ok(&call.id, value),
                    Err(e) => {
                        warn!(tool = %call.name, error = %e, "Tool execution failed");
                        AgentToolResult::failed(&call.id, e.tool_feedback())
                    }
                };
                if let Some(observer) = observer {
                    observer.on_tool_result(call, &result);
                }
                conversation.push(ModelMessage::tool_result(result.clone()));
                step.tool_results.push(result);
            }

            steps.push(step);
        }

        warn!(
            session_id,
            limit = self.options.max_tool_iterations,
            "runtime: tool iteration limit reached"
        );
        let text = steps.last().map(|s| s.text.clone()).unwrap_or_default();
        if !text.is_empty() {
            conversation.push(ModelMessage::assistant(text.clone()));
        }
        let reply = RuntimeReply {
            session_id: session_id.to_string(),
            text,
            resumed: false,
            usage: total_usage,
            steps,
            finish_reason: Some(FinishReason::Length),
        };
        Ok((reply, conversation))
    }
}

#[async_trait]
impl AgentRuntime for ClaudeRuntime {
    async fn send(&self, request: RuntimeRequest) -> Result<RuntimeReply, HrAgentError> {
        // A fresh context is published only once its first send succeeds,
        // so failed or cancelled sends leave nothing behind.
        let (session_id, context, fresh) = match request.resume.clone() {
            Some(id) => {
                let context = self.context(&id).await;
                (id, context, false)
            }
            None => (uuid::Uuid::new_v4().to_string(), Context::default(), true),
        };
        let mut history = context.lock().await;
        let resumed = !history.is_empty();

        let mut conversation = history.clone();
        conversation.push(ModelMessage::user(request.message.clone()));

        let (mut reply, conversation) = match self
            .run(&session_id, conversation, request.observer.as_deref())
            .await
        {
            Ok(done) => done,
            Err(e) => {
                drop(history);
                if !resumed && !fresh {
                    self.forget_if_empty(&session_id).await;
                }
                return Err(e);
            }
        };
        *history = conversation;
        drop(history);
        // publishes a fresh context, or one forgotten by a concurrent failure
        self.contexts
            .write()
            .await
            .entry(session_id.clone())
            .or_insert(context);
        reply.resumed = resumed;

        debug!(
            session_id = %reply.session_id,
            resumed,
            steps = reply.steps.len(),
            "runtime: send complete"
        );
        Ok(reply)
    }
}
