//! The capability interface the runtime calls into.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;

use super::arguments::ToolArguments;
use super::types::AgentToolParameters;
use crate::error::HrAgentError;
use crate::provider::ToolDefinition;

/// Where a tool call came from.
#[derive(Debug, Clone, Default)]
pub struct ToolExecutionContext {
    pub session_id: Option<String>,
    pub tool_call_id: Option<String>,
}

impl ToolExecutionContext {
    pub fn for_call(session_id: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// A named function the model may call.
///
/// Arguments reach [`Tool::execute`] already checked against
/// [`Tool::parameters`]. An `Err` is reported back to the model as an error
/// result; it never aborts the turn.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> &AgentToolParameters;

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, HrAgentError>;

    /// What the provider is told about this tool.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters().schema.clone(),
        }
    }
}

type Handler = dyn Fn(ToolArguments, ToolExecutionContext) -> BoxFuture<'static, Result<serde_json::Value, HrAgentError>>
    + Send
    + Sync;

/// A [`Tool`] backed by an async closure.
#[derive(Clone)]
pub struct AgentTool {
    name: String,
    description: String,
    parameters: AgentToolParameters,
    handler: Arc<Handler>,
}

impl AgentTool {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: AgentToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<serde_json::Value, HrAgentError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(move |args, ctx| handler(args, ctx).boxed()),
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, HrAgentError> {
        (self.handler)(args.clone(), ctx.clone()).await
    }
}

impl std::fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentTool").field("name", &self.name).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closure_tool_sees_call_context() {
        let tool = AgentTool::new(
            "whoami",
            "Echo the calling session",
            AgentToolParameters::empty(),
            |_args, ctx| async move { Ok(serde_json::json!(ctx.session_id)) },
        );
        let out = tool
            .execute(
                &ToolArguments::new(serde_json::json!({})),
                &ToolExecutionContext::for_call("session-7", "toolu_1"),
            )
            .await
            .unwrap();
        assert_eq!(out, serde_json::json!("session-7"));
        assert_eq!(tool.definition().name, "whoami");
        assert_eq!(tool.definition().parameters["type"], "object");
    }
}
