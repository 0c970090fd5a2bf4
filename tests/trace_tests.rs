//! Trace export against a mock Langfuse collector.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{hr_agent, post_json, send, MockProvider};
use hr_agent::config::PricingConfig;
use hr_agent::server::{router, AppState};
use hr_agent::trace::{LangfuseExporter, TraceExporter, Tracer};

fn exporter(host: &str) -> LangfuseExporter {
    LangfuseExporter::new(reqwest::Client::new(), host, "pk-lf", "sk-lf").unwrap()
}

#[tokio::test]
async fn chat_trace_is_ingested_with_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/public/ingestion"))
        .and(header("authorization", "Basic cGstbGY6c2stbGY="))
        .respond_with(ResponseTemplate::new(207).set_body_json(json!({
            "successes": [],
            "errors": []
        })))
        .mount(&server)
        .await;

    let (tracer, _worker) = Tracer::spawn(
        Arc::new(exporter(&server.uri())),
        100,
        Duration::from_secs(60),
    );

    let provider = Arc::new(MockProvider::new("mock"));
    provider.queue_tool_call(
        "toolu_1",
        "get_assignment_id_hr_usecase",
        json!({"username": "nwaters"}),
    );
    provider.queue_response("The assignment id is 15778303.");
    let agent = hr_agent(provider).with_tracer(tracer.clone(), PricingConfig::default());

    let reply = agent.respond("assignment id of nwaters?", None).await.unwrap();
    tracer.flush().await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let batch = body["batch"].as_array().unwrap();
    let types: Vec<_> = batch.iter().map(|e| e["type"].as_str().unwrap()).collect();
    assert_eq!(
        types,
        vec![
            "trace-create",
            "generation-create",
            "span-create",
            "span-update",
            "generation-create",
            "trace-create",
        ]
    );

    let trace_id = batch[0]["body"]["id"].as_str().unwrap();
    assert_eq!(batch[0]["body"]["input"], "assignment id of nwaters?");
    assert_eq!(batch[2]["body"]["traceId"], trace_id);
    assert_eq!(batch[2]["body"]["parentObservationId"], trace_id);
    assert_eq!(batch[2]["body"]["name"], "get_assignment_id_hr_usecase");
    assert_eq!(batch[3]["body"]["output"], "15778303");
    assert_eq!(batch[5]["body"]["sessionId"], reply.session_id.as_str());
    assert_eq!(batch[5]["body"]["output"], "The assignment id is 15778303.");
}

#[tokio::test]
async fn collector_rejection_is_an_export_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/public/ingestion"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let err = exporter(&server.uri()).export(&[]).await.unwrap_err();
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn chat_succeeds_when_collector_is_down() {
    // nothing listens on this port
    let (tracer, _worker) = Tracer::spawn(
        Arc::new(exporter("http://127.0.0.1:9")),
        1,
        Duration::from_millis(10),
    );
    let provider = Arc::new(MockProvider::new("mock"));
    provider.queue_response("Hello!");
    let agent = hr_agent(provider).with_tracer(tracer.clone(), PricingConfig::default());
    let app = router(AppState::new(agent));

    let (status, body) = send(&app, post_json("/chat", json!({"message": "hi"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Hello!");
    tracer.flush().await;
}

#[tokio::test]
async fn chat_succeeds_when_collector_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/public/ingestion"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (tracer, _worker) = Tracer::spawn(
        Arc::new(exporter(&server.uri())),
        1,
        Duration::from_millis(10),
    );
    let agent = hr_agent(Arc::new(MockProvider::new("mock")))
        .with_tracer(tracer.clone(), PricingConfig::default());
    let app = router(AppState::new(agent));

    let (status, _) = send(&app, post_json("/chat", json!({"message": "hi"}))).await;
    assert_eq!(status, StatusCode::OK);
    tracer.flush().await;
    assert!(!server.received_requests().await.unwrap().is_empty());
}
