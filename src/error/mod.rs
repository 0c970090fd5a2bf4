//! Error types for the HR agent.

pub mod unified;

pub use unified::{ErrorCategory, ErrorDetails, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all agent, runtime and service operations.
#[derive(Error, Debug)]
pub enum HrAgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        details: Option<ErrorDetails>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Session {0} not found")]
    SessionNotFound(String),

    #[error("Trace export error: {0}")]
    Trace(String),
}

impl HrAgentError {
    /// Create an API error from a status and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            source: None,
            details: None,
        }
    }

    /// Create an API error carrying provider details.
    pub fn api_with_details(status: u16, message: impl Into<String>, details: ErrorDetails) -> Self {
        Self::Api {
            status,
            message: message.into(),
            source: None,
            details: Some(details),
        }
    }

    /// Create a tool execution error.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Text handed to the model in a tool's error result. Tool failures pass
    /// their message through verbatim.
    pub fn tool_feedback(&self) -> String {
        match self {
            Self::ToolExecution { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(e) if e.is_timeout() => ErrorCategory::Timeout,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::ToolExecution { .. } | Self::ToolNotFound(_) => ErrorCategory::ToolExecution,
            Self::InvalidArgument(_) => ErrorCategory::InvalidRequest,
            Self::SessionNotFound(_) => ErrorCategory::NotFound,
            Self::Io(_) | Self::Trace(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether this error is potentially retryable.
    ///
    /// Nothing in the crate retries; callers may use this to decide.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::Server
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::RateLimit => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Network => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::Server => RecoverySuggestion::RetryWithBackoff,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::ToolExecution => RecoverySuggestion::CheckToolImplementation,
            ErrorCategory::InvalidRequest | ErrorCategory::NotFound => {
                RecoverySuggestion::FixRequest
            }
            _ => RecoverySuggestion::ContactSupport,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, HrAgentError>;
