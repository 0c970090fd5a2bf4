//! Shared HTTP client construction, headers and status mapping.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, RETRY_AFTER};

use crate::error::{ErrorDetails, HrAgentError};

/// Build the HTTP client used for model calls.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, HrAgentError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(10)
        .build()?)
}

/// Build Anthropic-style headers (x-api-key).
pub fn anthropic_headers(api_key: &str, version: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(api_key) {
        headers.insert("x-api-key", val);
    }
    if let Ok(val) = HeaderValue::from_str(version) {
        headers.insert("anthropic-version", val);
    }
    headers
}

/// Turn a non-success response into an error, consuming its body.
pub async fn error_from_response(resp: reqwest::Response) -> HrAgentError {
    let status = resp.status().as_u16();
    let retry_after_ms = resp
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .map(|secs| (secs * 1000.0) as u64);
    let request_id = resp
        .headers()
        .get("request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = resp.text().await.unwrap_or_default();
    status_to_error(status, &body, retry_after_ms, request_id)
}

/// Map an HTTP status and body to an error variant.
pub fn status_to_error(
    status: u16,
    body: &str,
    retry_after_ms: Option<u64>,
    request_id: Option<String>,
) -> HrAgentError {
    let (provider_code, message) = parse_error_body(body);
    match status {
        401 | 403 => HrAgentError::Authentication(message),
        429 => HrAgentError::RateLimited { retry_after_ms },
        _ => HrAgentError::api_with_details(
            status,
            message,
            ErrorDetails {
                provider_code,
                request_id,
            },
        ),
    }
}

// Anthropic errors look like {"type":"error","error":{"type":"...","message":"..."}}.
fn parse_error_body(body: &str) -> (Option<String>, String) {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));
    let code = error
        .and_then(|e| e.get("type"))
        .and_then(|t| t.as_str())
        .map(str::to_string);
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string());
    (code, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_extracts_provider_message() {
        let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        match status_to_error(529, body, None, Some("req_1".into())) {
            HrAgentError::Api {
                status,
                message,
                details: Some(details),
                ..
            } => {
                assert_eq!(status, 529);
                assert_eq!(message, "Overloaded");
                assert_eq!(details.provider_code.as_deref(), Some("overloaded_error"));
                assert_eq!(details.request_id.as_deref(), Some("req_1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn auth_and_rate_limit_statuses() {
        assert!(matches!(
            status_to_error(401, "bad key", None, None),
            HrAgentError::Authentication(m) if m == "bad key"
        ));
        assert!(matches!(
            status_to_error(429, "", Some(2000), None),
            HrAgentError::RateLimited {
                retry_after_ms: Some(2000)
            }
        ));
    }
}
