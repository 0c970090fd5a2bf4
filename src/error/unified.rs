//! Error classification and recovery hints.

use serde::{Deserialize, Serialize};

/// Coarse classification of a failed turn. Drives the HTTP status the API
/// reports and whether a caller should retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    ToolExecution,
    InvalidRequest,
    NotFound,
    Unknown,
}

/// Structured details returned by the model API alongside an error status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Provider error type, e.g. `overloaded_error`.
    pub provider_code: Option<String>,
    /// Value of the `request-id` response header, if any.
    pub request_id: Option<String>,
}

/// What an operator should try next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckCredentials,
    CheckConfiguration,
    IncreaseTimeout,
    FixRequest,
    CheckToolImplementation,
    ContactSupport,
}
