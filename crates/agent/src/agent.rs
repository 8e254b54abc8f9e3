use crate::tools::{Calculator, CurrentTime, LetterCounter, Tool, ToolRegistry};

pub const AGENT_NAME: &str = "AWS Agentcore Agent";
pub const AGENT_DESCRIPTION: &str =
    "A production grade AI agent built for Amazon Bedrock Agent Runtime";
pub const MODEL_ID: &str = "amazon.nova-micro-v1:0";

/// A named, model-bound bundle of tools.
#[derive(Debug)]
pub struct Agent {
    name: String,
    description: String,
    model: String,
    system_prompt: Option<String>,
    tools: ToolRegistry,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            model: model.into(),
            system_prompt: None,
            tools: ToolRegistry::default(),
        }
    }

    pub fn with_tool<T>(mut self, tool: T) -> Self
    where
        T: Tool + 'static,
    {
        self.tools.register(tool);
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
}

/// Builds the service agent: Nova Micro with calculator, clock and letter counter.
pub fn create_agent() -> Agent {
    Agent::new(AGENT_NAME, AGENT_DESCRIPTION, MODEL_ID)
        .with_tool(Calculator)
        .with_tool(CurrentTime)
        .with_tool(LetterCounter)
}
