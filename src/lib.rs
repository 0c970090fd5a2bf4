//! HR agent service.
//!
//! Three HR lookup tools (assignment id, timeoff schedule, direct reports)
//! exposed to a Claude-backed conversational runtime and served over a small
//! JSON API with an in-memory session mirror and optional Langfuse tracing.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use hr_agent::prelude::*;
//!
//! # async fn example() -> hr_agent::error::Result<()> {
//! let config = HrAgentConfig::load(None)?;
//! let provider = hr_agent::provider::create_provider(&config)?;
//! let agent = HrAgent::with_provider(provider, AgentOptions::hr(Arc::new(MockDirectory::sample())));
//! let reply = agent.respond("What is the timeoff schedule for nwaters?", None).await?;
//! println!("{} ({})", reply.content, reply.session_id);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod prelude;
pub mod provider;
pub mod runtime;
pub mod server;
pub mod session;
pub mod tools;
pub mod trace;
pub mod types;
pub mod util;
