//! Explicit tool registration table.

use std::sync::Arc;

use super::tool::Tool;
use crate::provider::ToolDefinition;

/// Ordered set of tools offered to the model, keyed by name.
///
/// Registering a tool whose name is already present replaces the earlier
/// entry in place.
#[derive(Clone, Default)]
pub struct ToolTable {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a tool.
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.register(Arc::new(tool));
        self
    }

    /// Add (or replace) a tool.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Keep only the tools named in `allowed`.
    pub fn restricted_to<S: AsRef<str>>(&self, allowed: &[S]) -> Self {
        Self {
            tools: self
                .tools
                .iter()
                .filter(|t| allowed.iter().any(|a| a.as_ref() == t.name()))
                .cloned()
                .collect(),
        }
    }

    /// Provider-facing definitions for every registered tool.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| t.definition())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{AgentTool, AgentToolParameters};

    fn echo(name: &str, description: &str) -> AgentTool {
        AgentTool::new(
            name,
            description,
            AgentToolParameters::empty(),
            |args, _ctx| async move { Ok(args.raw().clone()) },
        )
    }

    #[test]
    fn registering_same_name_replaces_in_place() {
        let table = ToolTable::new()
            .with_tool(echo("a", "first"))
            .with_tool(echo("b", "second"))
            .with_tool(echo("a", "replacement"));

        assert_eq!(table.names(), vec!["a", "b"]);
        assert_eq!(table.get("a").unwrap().description(), "replacement");
    }

    #[test]
    fn restricted_to_filters_by_name() {
        let table = ToolTable::new()
            .with_tool(echo("a", "first"))
            .with_tool(echo("b", "second"));

        let allowed = table.restricted_to(&["b", "missing"]);
        assert_eq!(allowed.names(), vec!["b"]);
        assert!(allowed.get("a").is_none());
    }

    #[test]
    fn definitions_carry_schema() {
        let table = ToolTable::new().with_tool(echo("a", "first"));
        let defs = table.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].parameters["type"], "object");
    }
}
