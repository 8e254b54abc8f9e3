//! A2A protocol wire types (JSON-RPC binding, protocol 0.3).

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
pub const TASK_NOT_FOUND: i64 = -32001;
pub const PUSH_NOTIFICATION_NOT_SUPPORTED: i64 = -32003;
pub const UNSUPPORTED_OPERATION: i64 = -32004;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub url: String,
    pub version: String,
    pub protocol_version: String,
    pub preferred_transport: String,
    pub capabilities: AgentCapabilities,
    pub default_input_modes: Vec<String>,
    pub default_output_modes: Vec<String>,
    pub skills: Vec<AgentSkill>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    pub streaming: bool,
    pub push_notifications: bool,
    pub state_transition_history: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self { jsonrpc: JSONRPC_VERSION, id, result: Some(result), error: None }
    }

    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(JsonRpcError { code, message: message.into() }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessageSendParams {
    pub message: A2aMessage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Agent,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct A2aMessage {
    pub role: MessageRole,
    pub parts: Vec<Part>,
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default = "message_kind")]
    pub kind: String,
}

fn message_kind() -> String {
    "message".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Part {
    Text { text: String },
    File { file: Value },
    Data { data: Value },
}

impl A2aMessage {
    pub fn agent_text(text: impl Into<String>, context_id: &str, task_id: &str) -> Self {
        Self {
            role: MessageRole::Agent,
            parts: vec![Part::Text { text: text.into() }],
            message_id: uuid::Uuid::new_v4().to_string(),
            context_id: Some(context_id.to_string()),
            task_id: Some(task_id.to_string()),
            kind: message_kind(),
        }
    }

    /// Text parts joined with newlines; file and data parts are ignored.
    /// `None` when the message carries no text part at all.
    pub fn text(&self) -> Option<String> {
        let texts = self
            .parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>();
        (!texts.is_empty()).then(|| texts.join("\n"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    Completed,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<A2aMessage>,
    pub timestamp: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub artifact_id: String,
    pub name: String,
    pub parts: Vec<Part>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub context_id: String,
    pub status: TaskStatus,
    pub artifacts: Vec<Artifact>,
    pub history: Vec<A2aMessage>,
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{A2aMessage, JsonRpcResponse, MessageRole, Part, TaskState};

    #[test]
    fn message_parts_are_tagged_by_kind() {
        let message: A2aMessage = serde_json::from_value(json!({
            "role": "user",
            "parts": [
                { "kind": "text", "text": "How many" },
                { "kind": "data", "data": { "ignored": true } },
                { "kind": "text", "text": "r's in strawberry?" }
            ],
            "messageId": "m-1"
        }))
        .expect("decode");

        assert_eq!(message.role, MessageRole::User);
        assert_eq!(message.kind, "message");
        assert_eq!(message.context_id, None);
        assert_eq!(message.text().as_deref(), Some("How many\nr's in strawberry?"));
        assert!(matches!(message.parts[1], Part::Data { .. }));
    }

    #[test]
    fn blank_text_part_still_counts_as_text() {
        let blank: A2aMessage = serde_json::from_value(json!({
            "role": "user",
            "parts": [{ "kind": "text", "text": "  " }],
            "messageId": "m-2"
        }))
        .expect("decode");
        let data_only: A2aMessage = serde_json::from_value(json!({
            "role": "user",
            "parts": [{ "kind": "data", "data": {} }],
            "messageId": "m-3"
        }))
        .expect("decode");

        assert_eq!(blank.text().as_deref(), Some("  "));
        assert_eq!(data_only.text(), None);
    }

    #[test]
    fn task_states_use_kebab_case() {
        assert_eq!(serde_json::to_value(TaskState::Completed).expect("encode"), json!("completed"));
        assert_eq!(serde_json::to_value(TaskState::Failed).expect("encode"), json!("failed"));
    }

    #[test]
    fn error_responses_omit_result() {
        let response = JsonRpcResponse::failure(json!(7), -32601, "Method not found");

        assert_eq!(
            serde_json::to_value(&response).expect("encode"),
            json!({
                "jsonrpc": "2.0",
                "id": 7,
                "error": { "code": -32601, "message": "Method not found" }
            })
        );
    }
}
