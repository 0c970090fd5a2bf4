//! Anthropic Messages API provider.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::HrAgentError;
use crate::types::*;

use super::http::{anthropic_headers, error_from_response};
use super::{ModelProvider, ProviderRequest, ProviderResponse};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

pub struct AnthropicProvider {
    client: reqwest::Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(
        client: reqwest::Client,
        model: String,
        api_key: String,
        base_url: Option<String>,
    ) -> Self {
        Self {
            client,
            model,
            api_key,
            base_url: base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    fn build_headers(&self) -> reqwest::header::HeaderMap {
        anthropic_headers(&self.api_key, API_VERSION)
    }

    fn build_request_body(&self, request: &ProviderRequest) -> serde_json::Value {
        let mut system_parts: Vec<String> = Vec::new();
        let mut messages: Vec<serde_json::Value> = Vec::new();
        // Tool results answering one assistant turn must share a single user message.
        let mut pending_results: Vec<serde_json::Value> = Vec::new();

        for msg in &request.messages {
            if msg.role != Role::Tool && !pending_results.is_empty() {
                messages.push(serde_json::json!({
                    "role": "user",
                    "content": std::mem::take(&mut pending_results),
                }));
            }
            match msg.role {
                Role::System => system_parts.push(msg.text()),
                Role::User => {
                    messages.push(serde_json::json!({
                        "role": "user",
                        "content": msg.text(),
                    }));
                }
                Role::Assistant => {
                    let content: Vec<serde_json::Value> = msg
                        .content
                        .iter()
                        .filter_map(|part| match part {
                            ContentPart::Text { text } if !text.is_empty() => {
                                Some(serde_json::json!({"type": "text", "text": text}))
                            }
                            ContentPart::ToolCall(tc) => Some(serde_json::json!({
                                "type": "tool_use",
                                "id": tc.id,
                                "name": tc.name,
                                "input": tc.arguments,
                            })),
                            _ => None,
                        })
                        .collect();
                    if !content.is_empty() {
                        messages.push(serde_json::json!({
                            "role": "assistant",
                            "content": content,
                        }));
                    }
                }
                Role::Tool => {
                    for part in &msg.content {
                        if let ContentPart::ToolResult(tr) = part {
                            pending_results.push(serde_json::json!({
                                "type": "tool_result",
                                "tool_use_id": tr.tool_call_id,
                                "content": tool_result_text(&tr.result),
                                "is_error": tr.is_error,
                            }));
                        }
                    }
                }
            }
        }
        if !pending_results.is_empty() {
            messages.push(serde_json::json!({
                "role": "user",
                "content": pending_results,
            }));
        }

        let mut body = serde_json::Map::new();
        body.insert("model".into(), self.model.clone().into());
        body.insert("messages".into(), messages.into());
        body.insert(
            "max_tokens".into(),
            request.settings.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS).into(),
        );

        if !system_parts.is_empty() {
            body.insert("system".into(), system_parts.join("\n").into());
        }
        if let Some(temp) = request.settings.temperature {
            body.insert("temperature".into(), temp.into());
        }

        let tools = request.tools.as_deref().unwrap_or_default();
        if !tools.is_empty() {
            let tool_defs: Vec<serde_json::Value> = tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name,
                        "description": t.description,
                        "input_schema": t.parameters,
                    })
                })
                .collect();
            body.insert("tools".into(), tool_defs.into());
        }

        serde_json::Value::Object(body)
    }
}

fn tool_result_text(result: &serde_json::Value) -> String {
    match result {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, HrAgentError> {
        let body = self.build_request_body(request);
        let url = format!("{}/messages", self.base_url);

        debug!(model = %self.model, messages = request.messages.len(), "Anthropic generate_text");

        let resp = self
            .client
            .post(&url)
            .headers(self.build_headers())
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let data: AnthropicResponse = resp.json().await?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for block in data.content {
            match block {
                AnthropicContentBlock::Text { text: t } => text.push_str(&t),
                AnthropicContentBlock::ToolUse { id, name, input } => {
                    tool_calls.push(AgentToolCall {
                        id,
                        name,
                        arguments: input,
                    });
                }
                AnthropicContentBlock::Other => {}
            }
        }

        let finish_reason = match data.stop_reason.as_deref() {
            Some("end_turn") | Some("stop_sequence") => Some(FinishReason::Stop),
            Some("max_tokens") => Some(FinishReason::Length),
            Some("tool_use") => Some(FinishReason::ToolCalls),
            Some("refusal") => Some(FinishReason::ContentFilter),
            _ => None,
        };

        Ok(ProviderResponse {
            text,
            usage: Usage {
                input_tokens: data.usage.input_tokens,
                output_tokens: data.usage.output_tokens,
                total_tokens: data.usage.input_tokens + data.usage.output_tokens,
                cache_read_tokens: data.usage.cache_read_input_tokens,
                cache_creation_tokens: data.usage.cache_creation_input_tokens,
            },
            tool_calls,
            finish_reason,
        })
    }
}

// Internal Anthropic response types

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    stop_reason: Option<String>,
    usage: AnthropicUsage,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
    #[serde(default)]
    cache_read_input_tokens: Option<u32>,
    #[serde(default)]
    cache_creation_input_tokens: Option<u32>,
}
