//! Request and response bodies of the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::{HistoryMessage, SessionRecord};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            service: "HR Agent API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_new_session: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDetail {
    pub session_id: String,
    pub conversation_history: Vec<HistoryEntry>,
    pub message_count: usize,
    pub turn_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl From<HistoryMessage> for HistoryEntry {
    fn from(msg: HistoryMessage) -> Self {
        Self {
            role: msg.role.to_string(),
            content: msg.content,
            timestamp: msg.timestamp,
        }
    }
}

impl From<SessionRecord> for SessionDetail {
    fn from(record: SessionRecord) -> Self {
        Self {
            conversation_history: record.history().into_iter().map(Into::into).collect(),
            message_count: record.message_count(),
            turn_count: record.turns.len(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            session_id: record.session_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub message_count: usize,
    pub turn_count: usize,
    pub created_at: DateTime<Utc>,
    pub last_message: Option<HistoryEntry>,
}

impl From<&SessionRecord> for SessionSummary {
    fn from(record: &SessionRecord) -> Self {
        Self {
            session_id: record.session_id.clone(),
            message_count: record.message_count(),
            turn_count: record.turns.len(),
            created_at: record.created_at,
            last_message: record.last_message().map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionList {
    pub total_sessions: usize,
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteResponse {
    pub message: String,
    pub note: String,
}

impl DeleteResponse {
    pub fn deleted(session_id: &str) -> Self {
        Self {
            message: format!("API session {session_id} deleted successfully"),
            note: format!("Runtime session {session_id} can still be resumed"),
        }
    }
}
