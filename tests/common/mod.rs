//! Shared test helpers and mock provider.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use hr_agent::agent::{AgentOptions, HrAgent};
use hr_agent::error::HrAgentError;
use hr_agent::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use hr_agent::server::{router, AppState};
use hr_agent::tools::MockDirectory;
use hr_agent::types::*;

/// A mock provider that returns canned responses and records requests.
pub struct MockProvider {
    model_id: String,
    responses: Mutex<VecDeque<Result<ProviderResponse, HrAgentError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a text response.
    pub fn queue_response(&self, text: &str) {
        self.responses.lock().unwrap().push_back(Ok(ProviderResponse {
            text: text.to_string(),
            usage: Usage::new(10, 20),
            tool_calls: vec![],
            finish_reason: Some(FinishReason::Stop),
        }));
    }

    /// Queue a tool call response.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: serde_json::Value) {
        self.responses.lock().unwrap().push_back(Ok(ProviderResponse {
            text: String::new(),
            usage: Usage::new(10, 5),
            tool_calls: vec![AgentToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: args,
            }],
            finish_reason: Some(FinishReason::ToolCalls),
        }));
    }

    /// Queue a failure.
    pub fn queue_error(&self, error: HrAgentError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, HrAgentError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Ok(ProviderResponse {
                text: "Mock response".to_string(),
                usage: Usage::default(),
                tool_calls: vec![],
                finish_reason: Some(FinishReason::Stop),
            })
        })
    }
}

/// HR agent over `provider` with the sample directory.
pub fn hr_agent(provider: Arc<MockProvider>) -> HrAgent {
    HrAgent::with_provider(provider, AgentOptions::hr(Arc::new(MockDirectory::sample())))
}

/// Router over a fresh agent and registry.
pub fn app(provider: Arc<MockProvider>) -> Router {
    router(AppState::new(hr_agent(provider)))
}

/// Send one request through the router and decode the JSON body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::delete(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_raw(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
