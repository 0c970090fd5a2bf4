//! Export seam for trace batches.

use std::sync::Mutex;

use async_trait::async_trait;

use super::event::TraceEvent;
use crate::error::HrAgentError;

/// Destination for batches of trace events.
#[async_trait]
pub trait TraceExporter: Send + Sync {
    async fn export(&self, batch: &[TraceEvent]) -> Result<(), HrAgentError>;
}

/// Keeps exported events in memory. Useful for tests and local debugging.
#[derive(Debug, Default)]
pub struct MemoryExporter {
    events: Mutex<Vec<TraceEvent>>,
}

impl MemoryExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything exported so far.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl TraceExporter for MemoryExporter {
    async fn export(&self, batch: &[TraceEvent]) -> Result<(), HrAgentError> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(batch);
        Ok(())
    }
}
