//! Non-blocking trace emission with a batching background worker.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::event::{TraceEvent, TraceEventKind};
use super::exporter::TraceExporter;
use crate::config::PricingConfig;
use crate::runtime::{GenerationRecord, RunObserver};
use crate::types::{AgentToolCall, AgentToolResult, Cost, Usage};

const QUEUE_CAPACITY: usize = 1024;

enum Command {
    Event(TraceEvent),
    Flush(oneshot::Sender<()>),
}

/// Handle for submitting trace events. Cloning is cheap.
#[derive(Clone, Debug)]
pub struct Tracer {
    tx: mpsc::Sender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Event(e) => f.debug_tuple("Event").field(&e.kind.label()).finish(),
            Self::Flush(_) => f.write_str("Flush"),
        }
    }
}

impl Tracer {
    /// Start the export worker. The worker exits once every handle is dropped.
    pub fn spawn(
        exporter: Arc<dyn TraceExporter>,
        batch_size: usize,
        flush_interval: Duration,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let handle = tokio::spawn(run_worker(rx, exporter, batch_size.max(1), flush_interval));
        (Self { tx }, handle)
    }

    /// Queue an event. Never waits; drops the event when the queue is full
    /// or the worker is gone.
    pub fn emit(&self, event: TraceEvent) {
        match self.tx.try_send(Command::Event(event)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(cmd)) => {
                warn!(?cmd, "trace queue full, dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("trace worker stopped, dropping event");
            }
        }
    }

    /// Export everything queued so far and wait for it.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Flush(ack)).await.is_ok() {
            let _ = done.await;
        }
    }

    /// Begin tracing one chat request. Emits the root `request` event.
    pub fn start_request(
        &self,
        session_id: Option<&str>,
        input: &str,
        pricing: PricingConfig,
    ) -> RequestTrace {
        let trace = RequestTrace {
            tracer: self.clone(),
            trace_id: uuid::Uuid::new_v4().to_string(),
            session_id: Mutex::new(session_id.map(str::to_string)),
            pricing,
        };
        trace.emit(
            trace.trace_id.clone(),
            None,
            TraceEventKind::Request {
                name: "hr-agent-chat".to_string(),
                input: input.to_string(),
            },
        );
        trace
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<Command>,
    exporter: Arc<dyn TraceExporter>,
    batch_size: usize,
    flush_interval: Duration,
) {
    let mut buffer: Vec<TraceEvent> = Vec::with_capacity(batch_size);
    let mut ticker =
        tokio::time::interval_at(tokio::time::Instant::now() + flush_interval, flush_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            cmd = rx.recv() => match cmd {
                Some(Command::Event(event)) => {
                    buffer.push(event);
                    if buffer.len() >= batch_size {
                        export(exporter.as_ref(), &mut buffer).await;
                    }
                }
                Some(Command::Flush(ack)) => {
                    export(exporter.as_ref(), &mut buffer).await;
                    let _ = ack.send(());
                }
                None => {
                    export(exporter.as_ref(), &mut buffer).await;
                    debug!("trace worker stopped");
                    return;
                }
            },
            _ = ticker.tick() => {
                export(exporter.as_ref(), &mut buffer).await;
            }
        }
    }
}

async fn export(exporter: &dyn TraceExporter, buffer: &mut Vec<TraceEvent>) {
    if buffer.is_empty() {
        return;
    }
    let batch = std::mem::take(buffer);
    if let Err(e) = exporter.export(&batch).await {
        warn!(error = %e, events = batch.len(), "trace export failed");
    }
}

/// Trace of a single chat request.
///
/// Implements [`RunObserver`] so the runtime can report generations and tool
/// calls as they happen.
#[derive(Debug)]
pub struct RequestTrace {
    tracer: Tracer,
    trace_id: String,
    session_id: Mutex<Option<String>>,
    pricing: PricingConfig,
}

impl RequestTrace {
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    fn cost(&self, usage: &Usage) -> Cost {
        Cost::from_usage(usage, self.pricing.input_per_m, self.pricing.output_per_m)
    }

    fn span_id(&self, call_id: &str) -> String {
        format!("{}:{call_id}", self.trace_id)
    }

    fn emit(&self, observation_id: String, parent_id: Option<String>, kind: TraceEventKind) {
        let session_id = self
            .session_id
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        self.tracer.emit(TraceEvent {
            trace_id: self.trace_id.clone(),
            observation_id,
            parent_id,
            session_id,
            timestamp: Utc::now(),
            kind,
        });
    }

    /// Close the trace with the final outcome.
    pub fn finish(&self, session_id: Option<&str>, outcome: Result<&str, String>, usage: Usage) {
        if let Some(id) = session_id {
            *self
                .session_id
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(id.to_string());
        }
        let (output, is_error) = match outcome {
            Ok(text) => (text.to_string(), false),
            Err(message) => (message, true),
        };
        self.emit(
            self.trace_id.clone(),
            None,
            TraceEventKind::Response {
                output,
                usage,
                cost: self.cost(&usage),
                is_error,
            },
        );
    }
}

impl RunObserver for RequestTrace {
    fn on_generation(&self, record: &GenerationRecord) {
        self.emit(
            format!("{}:gen-{}", self.trace_id, record.iteration),
            Some(self.trace_id.clone()),
            TraceEventKind::Generation {
                model: record.model.clone(),
                iteration: record.iteration,
                started_at: record.started_at,
                usage: record.usage,
                cost: self.cost(&record.usage),
                finish_reason: record.finish_reason,
            },
        );
    }

    fn on_tool_call(&self, call: &AgentToolCall) {
        self.emit(
            self.span_id(&call.id),
            Some(self.trace_id.clone()),
            TraceEventKind::ToolCall {
                tool_name: call.name.clone(),
                call_id: call.id.clone(),
                arguments: call.arguments.clone(),
            },
        );
    }

    fn on_tool_result(&self, call: &AgentToolCall, result: &AgentToolResult) {
        self.emit(
            self.span_id(&call.id),
            Some(self.trace_id.clone()),
            TraceEventKind::ToolResult {
                tool_name: call.name.clone(),
                call_id: call.id.clone(),
                result: result.result.clone(),
                is_error: result.is_error,
            },
        );
    }
}
