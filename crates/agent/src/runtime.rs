use std::sync::Arc;

use agentcore_core::errors::AgentError;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::llm::{
    ContentBlock, ConverseRequest, Message, ModelClient, Role, StopReason, ToolResult,
    ToolResultContent, ToolResultStatus, ToolUse, Usage,
};

#[derive(Clone, Debug, PartialEq)]
pub struct AgentReply {
    pub text: String,
    pub turns: u32,
    pub tool_calls: Vec<String>,
    pub usage: Usage,
}

pub struct AgentRuntime {
    agent: Agent,
    model: Arc<dyn ModelClient>,
    max_turns: u32,
}

impl AgentRuntime {
    pub fn new(agent: Agent, model: Arc<dyn ModelClient>, max_turns: u32) -> Self {
        Self { agent, model, max_turns: max_turns.max(1) }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Runs one conversation to completion, executing any tools the model asks for.
    pub async fn handle_message(&self, text: &str) -> Result<AgentReply, AgentError> {
        let tools = self.agent.tools().specs();
        let mut messages = vec![Message::user_text(text)];
        let mut tool_calls = Vec::new();
        let mut usage = Usage::default();

        for turn in 1..=self.max_turns {
            let request = ConverseRequest {
                model_id: self.agent.model().to_string(),
                system: self.agent.system_prompt().map(str::to_string),
                messages: messages.clone(),
                tools: tools.clone(),
            };
            let response = self.model.converse(&request).await?;
            usage.accumulate(&response.usage);

            let tool_uses = response.message.tool_uses().cloned().collect::<Vec<_>>();
            if response.stop_reason != StopReason::ToolUse || tool_uses.is_empty() {
                info!(
                    event_name = "agent.turn.completed",
                    turns = turn,
                    tool_calls = tool_calls.len(),
                    stop_reason = ?response.stop_reason,
                    total_tokens = usage.total_tokens,
                    "agent produced final answer"
                );
                return Ok(AgentReply { text: response.message.text(), turns: turn, tool_calls, usage });
            }

            messages.push(response.message);
            let mut results = Vec::with_capacity(tool_uses.len());
            for tool_use in &tool_uses {
                tool_calls.push(tool_use.name.clone());
                results.push(ContentBlock::ToolResult(self.run_tool(tool_use).await));
            }
            messages.push(Message { role: Role::User, content: results });
        }

        warn!(
            event_name = "agent.turn.limit_exceeded",
            max_turns = self.max_turns,
            tool_calls = tool_calls.len(),
            "agent stopped at turn limit"
        );
        Err(AgentError::TurnLimit { max_turns: self.max_turns })
    }

    async fn run_tool(&self, tool_use: &ToolUse) -> ToolResult {
        let outcome = self.agent.tools().execute(&tool_use.name, tool_use.input.clone()).await;

        let (content, status) = match outcome {
            Ok(value) => {
                debug!(
                    event_name = "agent.tool.succeeded",
                    tool = %tool_use.name,
                    tool_use_id = %tool_use.tool_use_id,
                    "tool call succeeded"
                );
                (ToolResultContent::Json(as_json_document(value)), ToolResultStatus::Success)
            }
            Err(error) => {
                warn!(
                    event_name = "agent.tool.failed",
                    tool = %tool_use.name,
                    tool_use_id = %tool_use.tool_use_id,
                    error = %error,
                    "tool call failed"
                );
                (ToolResultContent::Text(error.to_string()), ToolResultStatus::Error)
            }
        };

        ToolResult { tool_use_id: tool_use.tool_use_id.clone(), content: vec![content], status }
    }
}

// Converse only accepts JSON objects as tool result documents.
fn as_json_document(value: Value) -> Value {
    match value {
        Value::Object(_) => value,
        other => json!({ "result": other }),
    }
}
