//! Convenience re-exports for common use.

pub use crate::agent::{AgentOptions, AgentReply, HrAgent};
pub use crate::config::HrAgentConfig;
pub use crate::error::{HrAgentError, Result};
pub use crate::provider::ModelProvider;
pub use crate::runtime::{AgentRuntime, ClaudeRuntime, RuntimeReply, RuntimeRequest};
pub use crate::session::SessionRegistry;
pub use crate::tools::{AgentTool, AgentToolParameters, HrDirectory, MockDirectory, Tool, ToolArguments, ToolTable};
pub use crate::types::{FinishReason, GenerationSettings, ModelMessage, Role, Usage};
