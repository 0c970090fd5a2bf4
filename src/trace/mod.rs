//! Best-effort request tracing.
//!
//! Events flow from a [`RequestTrace`] through a bounded queue to a background
//! worker that batches them for a [`TraceExporter`]. Nothing in here can fail
//! or slow down a chat request.

pub mod event;
pub mod exporter;
pub mod langfuse;
pub mod tracer;

pub use event::{TraceEvent, TraceEventKind};
pub use exporter::{MemoryExporter, TraceExporter};
pub use langfuse::LangfuseExporter;
pub use tracer::{RequestTrace, Tracer};
