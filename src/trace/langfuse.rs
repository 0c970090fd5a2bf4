//! Langfuse ingestion API exporter.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::event::{TraceEvent, TraceEventKind};
use super::exporter::TraceExporter;
use crate::error::HrAgentError;

const INGESTION_PATH: &str = "/api/public/ingestion";

/// Posts trace batches to `{host}/api/public/ingestion` with Basic auth.
pub struct LangfuseExporter {
    client: reqwest::Client,
    endpoint: String,
    auth: HeaderValue,
}

impl LangfuseExporter {
    pub fn new(
        client: reqwest::Client,
        host: &str,
        public_key: &str,
        secret_key: &str,
    ) -> Result<Self, HrAgentError> {
        let token = STANDARD.encode(format!("{public_key}:{secret_key}"));
        let auth = HeaderValue::from_str(&format!("Basic {token}"))
            .map_err(|e| HrAgentError::Configuration(format!("invalid Langfuse credentials: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}{INGESTION_PATH}", host.trim_end_matches('/')),
            auth,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct IngestionResponse {
    errors: Vec<serde_json::Value>,
}

#[async_trait]
impl TraceExporter for LangfuseExporter {
    async fn export(&self, batch: &[TraceEvent]) -> Result<(), HrAgentError> {
        let body = json!({ "batch": batch.iter().map(to_ingestion_event).collect::<Vec<_>>() });

        let resp = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, self.auth.clone())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(HrAgentError::Trace(format!(
                "ingestion rejected with status {}: {text}",
                status.as_u16()
            )));
        }

        // 207 Multi-Status lists per-event failures.
        let parsed: IngestionResponse = resp.json().await.unwrap_or_default();
        if !parsed.errors.is_empty() {
            warn!(errors = parsed.errors.len(), "Langfuse rejected some trace events");
        }
        debug!(events = batch.len(), "exported trace batch");
        Ok(())
    }
}

/// Map an event onto a Langfuse ingestion envelope.
pub fn to_ingestion_event(event: &TraceEvent) -> serde_json::Value {
    let ts = event.timestamp.to_rfc3339();
    let (kind, body) = match &event.kind {
        TraceEventKind::Request { name, input } => (
            "trace-create",
            json!({
                "id": event.trace_id,
                "name": name,
                "sessionId": event.session_id,
                "input": input,
                "timestamp": ts,
            }),
        ),
        TraceEventKind::Response {
            output,
            usage,
            cost,
            is_error,
        } => (
            "trace-create",
            json!({
                "id": event.trace_id,
                "sessionId": event.session_id,
                "output": output,
                "metadata": {
                    "usage": usage,
                    "cost": cost,
                    "is_error": is_error,
                },
            }),
        ),
        TraceEventKind::Generation {
            model,
            iteration,
            started_at,
            usage,
            cost,
            finish_reason,
        } => (
            "generation-create",
            json!({
                "id": event.observation_id,
                "traceId": event.trace_id,
                "parentObservationId": event.parent_id,
                "name": format!("model-call-{iteration}"),
                "model": model,
                "startTime": started_at.to_rfc3339(),
                "endTime": ts,
                "usage": {
                    "input": usage.input_tokens,
                    "output": usage.output_tokens,
                    "total": usage.total_tokens,
                    "unit": "TOKENS",
                    "inputCost": cost.input_cost,
                    "outputCost": cost.output_cost,
                    "totalCost": cost.total_cost,
                },
                "metadata": { "finish_reason": finish_reason },
            }),
        ),
        TraceEventKind::ToolCall {
            tool_name,
            call_id,
            arguments,
        } => (
            "span-create",
            json!({
                "id": event.observation_id,
                "traceId": event.trace_id,
                "parentObservationId": event.parent_id,
                "name": tool_name,
                "startTime": ts,
                "input": arguments,
                "metadata": { "tool_call_id": call_id },
            }),
        ),
        TraceEventKind::ToolResult {
            result, is_error, ..
        } => (
            "span-update",
            json!({
                "id": event.observation_id,
                "traceId": event.trace_id,
                "endTime": ts,
                "output": result,
                "level": if *is_error { "ERROR" } else { "DEFAULT" },
            }),
        ),
    };

    json!({
        "id": uuid::Uuid::new_v4().to_string(),
        "timestamp": Utc::now().to_rfc3339(),
        "type": kind,
        "body": body,
    })
}
