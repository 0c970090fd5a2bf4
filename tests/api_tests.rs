//! HTTP API tests driving the router in-process.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{app, delete, get, post_json, post_raw, send, MockProvider};
use hr_agent::error::HrAgentError;

#[tokio::test]
async fn health_reports_service_and_version() {
    let app = app(Arc::new(MockProvider::new("mock")));
    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "healthy",
            "service": "HR Agent API",
            "version": env!("CARGO_PKG_VERSION"),
        })
    );
}

#[tokio::test]
async fn chat_without_session_starts_a_new_one() {
    let provider = Arc::new(MockProvider::new("mock"));
    provider.queue_response("Hello! How can I help?");
    let app = app(provider);

    let (status, body) = send(&app, post_json("/chat", json!({"message": "hi"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Hello! How can I help?");
    assert_eq!(body["is_new_session"], true);
    let session_id = body["session_id"].as_str().unwrap();
    assert!(!session_id.is_empty());
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn fresh_sessions_get_distinct_ids() {
    let app = app(Arc::new(MockProvider::new("mock")));
    let (_, first) = send(&app, post_json("/chat", json!({"message": "one"}))).await;
    let (_, second) = send(&app, post_json("/chat", json!({"message": "two"}))).await;
    assert_ne!(first["session_id"], second["session_id"]);
}

#[tokio::test]
async fn resumed_chat_appends_to_history() {
    let provider = Arc::new(MockProvider::new("mock"));
    provider.queue_response("first reply");
    provider.queue_response("second reply");
    let app = app(Arc::clone(&provider));

    let (_, first) = send(&app, post_json("/chat", json!({"message": "first"}))).await;
    let session_id = first["session_id"].as_str().unwrap().to_string();

    let (status, second) = send(
        &app,
        post_json("/chat", json!({"message": "second", "session_id": session_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["session_id"], session_id.as_str());
    assert_eq!(second["is_new_session"], false);

    // the runtime saw the earlier turn
    let requests = provider.requests();
    assert_eq!(requests[1].messages.len(), 4);

    let (status, detail) = send(&app, get(&format!("/sessions/{session_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["session_id"], session_id.as_str());
    assert_eq!(detail["message_count"], 4);
    assert_eq!(detail["turn_count"], 2);
    let history = detail["conversation_history"].as_array().unwrap();
    let roles: Vec<_> = history.iter().map(|m| m["role"].as_str().unwrap()).collect();
    assert_eq!(roles, vec!["user", "assistant", "user", "assistant"]);
    assert_eq!(history[0]["content"], "first");
    assert_eq!(history[3]["content"], "second reply");
}

#[tokio::test]
async fn unknown_session_id_is_adopted_as_new() {
    let app = app(Arc::new(MockProvider::new("mock")));
    let (status, body) = send(
        &app,
        post_json("/chat", json!({"message": "hi", "session_id": "client-chosen-id"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], "client-chosen-id");
    assert_eq!(body["is_new_session"], true);

    let (status, _) = send(&app, get("/sessions/client-chosen-id")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn get_unknown_session_is_404() {
    let app = app(Arc::new(MockProvider::new("mock")));
    let (status, body) = send(&app, get("/sessions/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Session nope not found"}));
}

#[tokio::test]
async fn list_sessions_in_creation_order() {
    let provider = Arc::new(MockProvider::new("mock"));
    provider.queue_response("a");
    provider.queue_response("b");
    let app = app(provider);

    let (_, empty) = send(&app, get("/sessions")).await;
    assert_eq!(empty, json!({"total_sessions": 0, "sessions": []}));

    let (_, first) = send(&app, post_json("/chat", json!({"message": "one"}))).await;
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let (_, second) = send(&app, post_json("/chat", json!({"message": "two"}))).await;

    let (status, list) = send(&app, get("/sessions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total_sessions"], 2);
    let sessions = list["sessions"].as_array().unwrap();
    assert_eq!(sessions[0]["session_id"], first["session_id"]);
    assert_eq!(sessions[1]["session_id"], second["session_id"]);
    assert_eq!(sessions[0]["message_count"], 2);
    assert_eq!(sessions[0]["turn_count"], 1);
    assert_eq!(sessions[1]["last_message"]["role"], "assistant");
    assert_eq!(sessions[1]["last_message"]["content"], "b");
    assert!(sessions[1]["last_message"]["timestamp"].is_string());
}

#[tokio::test]
async fn delete_twice_is_200_then_404() {
    let app = app(Arc::new(MockProvider::new("mock")));
    let (_, chat) = send(&app, post_json("/chat", json!({"message": "hi"}))).await;
    let session_id = chat["session_id"].as_str().unwrap();
    let uri = format!("/sessions/{session_id}");

    let (status, body) = send(&app, delete(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "message": format!("API session {session_id} deleted successfully"),
            "note": format!("Runtime session {session_id} can still be resumed"),
        })
    );

    let (status, body) = send(&app, delete(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], format!("Session {session_id} not found"));

    let (status, _) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleted_session_can_still_be_resumed() {
    let provider = Arc::new(MockProvider::new("mock"));
    let app = app(Arc::clone(&provider));
    let (_, chat) = send(&app, post_json("/chat", json!({"message": "hi"}))).await;
    let session_id = chat["session_id"].as_str().unwrap().to_string();
    send(&app, delete(&format!("/sessions/{session_id}"))).await;

    let (status, body) = send(
        &app,
        post_json("/chat", json!({"message": "again", "session_id": session_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_new_session"], false);

    let (_, detail) = send(&app, get(&format!("/sessions/{session_id}"))).await;
    assert_eq!(detail["turn_count"], 1);
}

#[tokio::test]
async fn malformed_bodies_are_client_errors() {
    let app = app(Arc::new(MockProvider::new("mock")));

    let (status, body) = send(&app, post_raw("/chat", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (status, body) = send(&app, post_json("/chat", json!({"session_id": "x"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("message"));

    let (status, _) = send(&app, post_json("/chat", json!({"message": 42}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(&app, post_json("/chat", json!({"message": "   "}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"], "message must not be empty");
}

#[tokio::test]
async fn agent_failure_is_500_and_nothing_is_recorded() {
    let provider = Arc::new(MockProvider::new("mock"));
    provider.queue_error(HrAgentError::Configuration("runtime unavailable".into()));
    let app = app(provider);

    let (status, body) = send(&app, post_json("/chat", json!({"message": "hi"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Error processing request: "));
    assert!(detail.contains("runtime unavailable"));

    let (_, list) = send(&app, get("/sessions")).await;
    assert_eq!(list["total_sessions"], 0);
}

#[tokio::test]
async fn upstream_auth_failure_is_502() {
    let provider = Arc::new(MockProvider::new("mock"));
    provider.queue_error(HrAgentError::Authentication("invalid x-api-key".into()));
    let app = app(provider);

    let (status, body) = send(&app, post_json("/chat", json!({"message": "hi"}))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["detail"].as_str().unwrap().contains("invalid x-api-key"));
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = app(Arc::new(MockProvider::new("mock")));
    let (status, body) = send(&app, get("/nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Not Found");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = app(Arc::new(MockProvider::new("mock")));
    let request = axum::http::Request::get("/")
        .header("origin", "https://hr.example.com")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

#[tokio::test]
async fn timeoff_question_end_to_end() {
    let provider = Arc::new(MockProvider::new("mock"));
    provider.queue_tool_call(
        "toolu_1",
        "get_assignment_id_hr_usecase",
        json!({"username": "nwaters"}),
    );
    provider.queue_tool_call(
        "toolu_2",
        "get_timeoff_schedule_hr_usecase",
        json!({
            "assignment_id": "15778303",
            "start_date": "2025-01-01",
            "end_date": "2025-12-31",
        }),
    );
    provider.queue_response("nwaters (assignment 15778303) has timeoff on 2025-01-05.");
    let app = app(Arc::clone(&provider));

    let (status, body) = send(
        &app,
        post_json(
            "/chat",
            json!({"message": "What is the timeoff schedule for nwaters?"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["content"].as_str().unwrap().contains("2025-01-05"));

    // tool outputs went back to the model
    let requests = provider.requests();
    assert_eq!(requests.len(), 3);
    let id_result = requests[1].messages.last().unwrap();
    assert_eq!(id_result.role, hr_agent::types::Role::Tool);
    match &id_result.content[0] {
        hr_agent::types::ContentPart::ToolResult(result) => {
            assert_eq!(result.result, json!("15778303"));
            assert!(!result.is_error);
        }
        other => panic!("unexpected content {other:?}"),
    }
    match &requests[2].messages.last().unwrap().content[0] {
        hr_agent::types::ContentPart::ToolResult(result) => {
            assert_eq!(result.result, json!(["2025-01-05"]));
        }
        other => panic!("unexpected content {other:?}"),
    }
}
