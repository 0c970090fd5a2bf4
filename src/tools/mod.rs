//! Tool system for function calling.

pub mod arguments;
pub mod hr;
pub mod table;
pub mod tool;
pub mod types;
pub mod validation;

pub use arguments::ToolArguments;
pub use hr::{hr_tools, HrDirectory, MockDirectory};
pub use table::ToolTable;
pub use tool::{AgentTool, Tool, ToolExecutionContext};
pub use types::AgentToolParameters;
pub use validation::validate_arguments;
