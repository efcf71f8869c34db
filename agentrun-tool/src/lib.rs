#![deny(missing_docs)]
//! The tool registry: a `name → Tool` mapping, snapshotted by the
//! orchestrator at run start and read-only for the run's duration.

use agentrun_types::tool::{ToolContext, ToolDefinition, ToolDyn};
use std::collections::HashMap;
use std::sync::Arc;

/// Owns a mapping `name → Tool`. Insertion allows replacement — a later
/// `register` of the same name shadows the earlier one. Names are the
/// only identity and comparison is case-sensitive.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolDyn>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self { tools: HashMap::new() }
    }

    /// Register one tool, replacing any earlier tool of the same name.
    pub fn register(&mut self, tool: Arc<dyn ToolDyn>) {
        let name = tool.name().to_string();
        let replaced = self.tools.insert(name.clone(), tool);
        if replaced.is_some() {
            tracing::debug!(tool = %name, "tool.replaced");
        } else {
            tracing::debug!(tool = %name, "tool.registered");
        }
    }

    /// Register several tools in order.
    pub fn register_many(&mut self, tools: impl IntoIterator<Item = Arc<dyn ToolDyn>>) {
        for tool in tools {
            self.register(tool);
        }
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolDyn>> {
        self.tools.get(name)
    }

    /// Whether a tool is registered under this name.
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All registered tools, in no particular order.
    pub fn get_all(&self) -> Vec<&Arc<dyn ToolDyn>> {
        self.tools.values().collect()
    }

    /// All registered tool names, in no particular order.
    pub fn get_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// The declared parameter schemas for every registered tool, in the
    /// JSON-Schema-compatible form a backend's function-calling channel
    /// expects.
    pub fn get_schemas(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Remove every registered tool.
    pub fn clear(&mut self) {
        self.tools.clear();
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Snapshot this registry for one run. The orchestrator calls this at
    /// run start so later mutation of the caller's live registry (if
    /// any) cannot affect an in-flight run.
    pub fn snapshot(&self) -> ToolRegistry {
        ToolRegistry { tools: self.tools.clone() }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-exported so callers dispatching a tool call don't need to depend
/// on `agentrun-types` directly just for this one type.
pub use agentrun_types::tool::ToolContext as Context;
