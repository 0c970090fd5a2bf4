//! What the HR agent registers with its runtime.

use std::sync::Arc;

use bon::Builder;

use crate::runtime::{RuntimeOptions, DEFAULT_MAX_TOOL_ITERATIONS};
use crate::tools::{hr_tools, HrDirectory, ToolTable};
use crate::types::GenerationSettings;

/// System prompt given to the model on every call.
pub const HR_SYSTEM_PROMPT: &str = "You are an HR Agent that can answer questions related to employee information, timeoff schedules, and direct reports.
Use the tools provided to answer the user's questions.
If you do not have enough information to answer the question, say so.
If you need more information, ask follow up questions.";

/// Agent-level configuration handed to the runtime.
#[derive(Debug, Clone, Builder)]
pub struct AgentOptions {
    #[builder(into, default = HR_SYSTEM_PROMPT.to_string())]
    pub system_prompt: String,
    pub tools: ToolTable,
    /// Pre-approved tool names. `None` approves every tool in `tools`.
    pub allowed_tools: Option<Vec<String>>,
    #[builder(default)]
    pub settings: GenerationSettings,
    #[builder(default = DEFAULT_MAX_TOOL_ITERATIONS)]
    pub max_tool_iterations: usize,
}

impl AgentOptions {
    /// The HR prompt with the three lookup tools, all pre-approved.
    pub fn hr(directory: Arc<dyn HrDirectory>) -> Self {
        let tools = hr_tools(directory);
        let allowed = tools.names().into_iter().map(str::to_string).collect();
        Self::builder().tools(tools).allowed_tools(allowed).build()
    }

    pub fn into_runtime_options(self) -> RuntimeOptions {
        RuntimeOptions {
            system_prompt: Some(self.system_prompt),
            tools: self.tools,
            allowed_tools: self.allowed_tools,
            settings: self.settings,
            max_tool_iterations: self.max_tool_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::hr::{ASSIGNMENT_ID_TOOL, DIRECT_REPORTS_TOOL, TIMEOFF_SCHEDULE_TOOL};
    use crate::tools::MockDirectory;

    #[test]
    fn hr_options_preapprove_all_lookup_tools() {
        let options = AgentOptions::hr(Arc::new(MockDirectory::sample()));
        assert_eq!(options.system_prompt, HR_SYSTEM_PROMPT);
        assert_eq!(
            options.allowed_tools.clone().unwrap(),
            vec![ASSIGNMENT_ID_TOOL, TIMEOFF_SCHEDULE_TOOL, DIRECT_REPORTS_TOOL]
        );

        let runtime = options.into_runtime_options();
        assert_eq!(runtime.tools.len(), 3);
        assert_eq!(runtime.max_tool_iterations, DEFAULT_MAX_TOOL_ITERATIONS);
    }
}
