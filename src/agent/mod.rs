//! HR agent: system prompt and tools over a conversational runtime.

pub mod agent;
pub mod options;

pub use agent::{AgentReply, HrAgent};
pub use options::{AgentOptions, HR_SYSTEM_PROMPT};
