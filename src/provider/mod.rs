//! Model provider trait and the Anthropic Messages API implementation.

pub mod anthropic;
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::HrAgentConfig;
use crate::error::HrAgentError;
use crate::types::{AgentToolCall, FinishReason, GenerationSettings, ModelMessage, Usage};

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub tool_calls: Vec<AgentToolCall>,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "anthropic").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate a complete (non-streaming) response.
    async fn generate_text(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, HrAgentError>;
}

/// Create the configured provider.
pub fn create_provider(config: &HrAgentConfig) -> Result<Arc<dyn ModelProvider>, HrAgentError> {
    let api_key = config
        .anthropic_api_key()
        .ok_or_else(|| HrAgentError::Authentication("Missing ANTHROPIC_API_KEY".into()))?;
    let client = http::build_client(config.request_timeout())?;
    Ok(Arc::new(anthropic::AnthropicProvider::new(
        client,
        config.model().to_string(),
        api_key.to_string(),
        config.anthropic_base_url().map(str::to_string),
    )))
}
