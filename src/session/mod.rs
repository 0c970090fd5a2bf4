//! In-memory mirror of chat turns, keyed by session id.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::types::Role;

/// One user message and the agent's reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub user_message: String,
    pub agent_reply: String,
    pub timestamp: DateTime<Utc>,
}

/// A turn flattened into a chat-style history entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Everything recorded for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub turns: Vec<Turn>,
}

impl SessionRecord {
    fn new(session_id: String, now: DateTime<Utc>) -> Self {
        Self {
            session_id,
            created_at: now,
            updated_at: now,
            turns: Vec::new(),
        }
    }

    /// User and assistant messages in arrival order.
    pub fn history(&self) -> Vec<HistoryMessage> {
        self.turns
            .iter()
            .flat_map(|turn| {
                [
                    HistoryMessage {
                        role: Role::User,
                        content: turn.user_message.clone(),
                        timestamp: turn.timestamp,
                    },
                    HistoryMessage {
                        role: Role::Assistant,
                        content: turn.agent_reply.clone(),
                        timestamp: turn.timestamp,
                    },
                ]
            })
            .collect()
    }

    pub fn message_count(&self) -> usize {
        self.turns.len() * 2
    }

    /// The newest history entry, which is always the agent's reply.
    pub fn last_message(&self) -> Option<HistoryMessage> {
        self.turns.last().map(|turn| HistoryMessage {
            role: Role::Assistant,
            content: turn.agent_reply.clone(),
            timestamp: turn.timestamp,
        })
    }
}

/// Keyed store of session records.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed turn, creating the record on first use.
    /// Returns `true` when the record was created.
    pub async fn record_turn(&self, session_id: &str, user_message: &str, agent_reply: &str) -> bool {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let created = !sessions.contains_key(session_id);
        let record = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionRecord::new(session_id.to_string(), now));
        record.turns.push(Turn {
            user_message: user_message.to_string(),
            agent_reply: agent_reply.to_string(),
            timestamp: now,
        });
        record.updated_at = now;
        if created {
            info!(session_id, "session created");
        }
        created
    }

    pub async fn get(&self, session_id: &str) -> Option<SessionRecord> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// All records, oldest first.
    pub async fn list(&self) -> Vec<SessionRecord> {
        let mut records: Vec<_> = self.sessions.read().await.values().cloned().collect();
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        records
    }

    pub async fn remove(&self, session_id: &str) -> Option<SessionRecord> {
        let removed = self.sessions.write().await.remove(session_id);
        if removed.is_some() {
            info!(session_id, "session deleted");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[tokio::test]
    async fn first_turn_creates_then_appends() {
        let registry = SessionRegistry::new();
        assert!(registry.record_turn("s1", "hi", "hello").await);
        assert!(!registry.record_turn("s1", "again", "hello again").await);

        let record = registry.get("s1").await.unwrap();
        assert_eq!(record.turns.len(), 2);
        assert_eq!(record.message_count(), 4);
        let last = record.last_message().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "hello again");
        assert_eq!(Some(&last), record.history().last());
        assert!(record.updated_at >= record.created_at);

        let history = record.history();
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "hi");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[3].content, "hello again");
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let registry = SessionRegistry::new();
        registry.record_turn("s1", "hi", "hello").await;
        assert!(registry.remove("s1").await.is_some());
        assert!(registry.remove("s1").await.is_none());
        assert!(registry.get("s1").await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn list_is_ordered_by_creation() {
        let registry = SessionRegistry::new();
        registry.record_turn("b", "1", "1").await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        registry.record_turn("a", "2", "2").await;
        registry.record_turn("b", "3", "3").await;

        let ids: Vec<_> = registry
            .list()
            .await
            .into_iter()
            .map(|r| r.session_id)
            .collect();
        assert_eq!(ids, vec!["b".to_string(), "a".to_string()]);
    }

    #[tokio::test]
    async fn concurrent_appends_keep_every_turn() {
        let registry = Arc::new(SessionRegistry::new());
        let mut handles = Vec::new();
        for i in 0..20 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.record_turn("shared", &format!("q{i}"), "a").await
            }));
        }
        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(registry.get("shared").await.unwrap().turns.len(), 20);
    }
}
