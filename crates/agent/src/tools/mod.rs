//! Tool capability table.
//!
//! A tool is a plain function plus an explicit registration entry (name,
//! description, JSON-Schema parameters). The registry keeps registration order,
//! which is the order tools are advertised to the model and in the agent card.

pub mod calculator;
pub mod current_time;
pub mod letter_counter;

use std::fmt;

use agentcore_core::errors::ToolError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

pub use calculator::Calculator;
pub use current_time::CurrentTime;
pub use letter_counter::LetterCounter;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> Value;
    async fn execute(&self, input: Value) -> Result<Value, ToolError>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Adds a tool; a tool with the same name is replaced in its original slot.
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        let tool: Box<dyn Tool> = Box::new(tool);
        match self.tools.iter().position(|existing| existing.name() == tool.name()) {
            Some(index) => self.tools[index] = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|tool| tool.name() == name).map(|tool| tool.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|tool| tool.spec()).collect()
    }

    pub async fn execute(&self, name: &str, input: Value) -> Result<Value, ToolError> {
        let tool = self.get(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.execute(input).await
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use agentcore_core::errors::ToolError;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::{Calculator, LetterCounter, Tool, ToolRegistry};

    struct Echo(&'static str);

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &'static str {
            "letter_counter"
        }

        fn description(&self) -> &'static str {
            self.0
        }

        fn input_schema(&self) -> Value {
            json!({ "type": "object", "properties": {} })
        }

        async fn execute(&self, input: Value) -> Result<Value, ToolError> {
            Ok(input)
        }
    }

    #[test]
    fn registry_preserves_registration_order() {
        let mut registry = ToolRegistry::default();
        registry.register(LetterCounter);
        registry.register(Calculator);

        assert_eq!(registry.names(), vec!["letter_counter", "calculator"]);
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }

    #[test]
    fn re_registering_a_name_replaces_in_place() {
        let mut registry = ToolRegistry::default();
        registry.register(LetterCounter);
        registry.register(Calculator);
        registry.register(Echo("replacement"));

        assert_eq!(registry.names(), vec!["letter_counter", "calculator"]);
        let specs = registry.specs();
        assert_eq!(specs[0].description, "replacement");
    }

    #[tokio::test]
    async fn executing_unknown_tool_fails() {
        let registry = ToolRegistry::default();

        let result = registry.execute("shell", json!({})).await;

        assert_eq!(result, Err(ToolError::UnknownTool("shell".to_string())));
    }

    #[tokio::test]
    async fn execute_dispatches_by_name() {
        let mut registry = ToolRegistry::default();
        registry.register(LetterCounter);

        let result = registry
            .execute("letter_counter", json!({ "word": "strawberry", "letter": "r" }))
            .await;

        assert_eq!(result, Ok(json!(3)));
    }
}
