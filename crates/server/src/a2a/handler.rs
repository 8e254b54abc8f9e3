use axum::{body::Bytes, extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::types::{
    A2aMessage, AgentCard, Artifact, JsonRpcRequest, JsonRpcResponse, MessageSendParams, Part,
    Task, TaskState, TaskStatus, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION,
    METHOD_NOT_FOUND, PARSE_ERROR, PUSH_NOTIFICATION_NOT_SUPPORTED, TASK_NOT_FOUND,
    UNSUPPORTED_OPERATION,
};
use super::A2aState;

pub async fn agent_card(State(state): State<A2aState>) -> Json<AgentCard> {
    Json(state.card.as_ref().clone())
}

/// JSON-RPC entry point. Protocol-level failures are reported in the body with HTTP 200.
pub async fn rpc(State(state): State<A2aState>, body: Bytes) -> Json<JsonRpcResponse> {
    let raw = match serde_json::from_slice::<Value>(&body) {
        Ok(raw) => raw,
        Err(error) => {
            return Json(JsonRpcResponse::failure(
                Value::Null,
                PARSE_ERROR,
                format!("Parse error: {error}"),
            ))
        }
    };

    let request = match serde_json::from_value::<JsonRpcRequest>(raw) {
        Ok(request) => request,
        Err(_) => {
            return Json(JsonRpcResponse::failure(Value::Null, INVALID_REQUEST, "Invalid Request"))
        }
    };
    let id = request.id.clone().unwrap_or(Value::Null);

    let method = match (request.jsonrpc.as_deref(), request.method.as_deref()) {
        (Some(JSONRPC_VERSION), Some(method)) => method.to_string(),
        _ => return Json(JsonRpcResponse::failure(id, INVALID_REQUEST, "Invalid Request")),
    };

    Json(dispatch(&state, id, &method, request.params).await)
}

async fn dispatch(
    state: &A2aState,
    id: Value,
    method: &str,
    params: Option<Value>,
) -> JsonRpcResponse {
    match method {
        "message/send" => message_send(state, id, params).await,
        "tasks/get" | "tasks/cancel" => {
            JsonRpcResponse::failure(id, TASK_NOT_FOUND, "Task not found")
        }
        "message/stream" | "tasks/resubscribe" => {
            JsonRpcResponse::failure(id, UNSUPPORTED_OPERATION, "This operation is not supported")
        }
        method if method.starts_with("tasks/pushNotificationConfig/") => JsonRpcResponse::failure(
            id,
            PUSH_NOTIFICATION_NOT_SUPPORTED,
            "Push Notification is not supported",
        ),
        other => {
            warn!(event_name = "a2a.rpc.unknown_method", method = %other, "unknown json-rpc method");
            JsonRpcResponse::failure(id, METHOD_NOT_FOUND, "Method not found")
        }
    }
}

async fn message_send(state: &A2aState, id: Value, params: Option<Value>) -> JsonRpcResponse {
    let params = match params.map(serde_json::from_value::<MessageSendParams>) {
        Some(Ok(params)) => params,
        Some(Err(error)) => {
            return JsonRpcResponse::failure(id, INVALID_PARAMS, format!("Invalid params: {error}"))
        }
        None => return JsonRpcResponse::failure(id, INVALID_PARAMS, "Invalid params: missing"),
    };

    let Some(text) = params.message.text() else {
        return JsonRpcResponse::failure(
            id,
            INVALID_PARAMS,
            "Invalid params: message must contain at least one text part",
        );
    };

    let task_id = params.message.task_id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
    let context_id =
        params.message.context_id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
    let mut user_message = params.message;
    user_message.task_id = Some(task_id.clone());
    user_message.context_id = Some(context_id.clone());

    let task = match state.runtime.handle_message(&text).await {
        Ok(reply) => {
            info!(
                event_name = "a2a.message.completed",
                correlation_id = %task_id,
                context_id = %context_id,
                turns = reply.turns,
                tool_calls = reply.tool_calls.len(),
                "message/send completed"
            );
            Task {
                id: task_id,
                context_id,
                status: TaskStatus { state: TaskState::Completed, message: None, timestamp: now() },
                artifacts: vec![Artifact {
                    artifact_id: Uuid::new_v4().to_string(),
                    name: "agent_response".to_string(),
                    parts: vec![Part::Text { text: reply.text }],
                }],
                history: vec![user_message],
                kind: "task".to_string(),
            }
        }
        Err(agent_error) => {
            error!(
                event_name = "a2a.message.failed",
                correlation_id = %task_id,
                context_id = %context_id,
                retryable = agent_error.is_retryable(),
                error = %agent_error,
                "message/send failed"
            );
            let status_message =
                A2aMessage::agent_text(agent_error.user_message(), &context_id, &task_id);
            Task {
                id: task_id,
                context_id,
                status: TaskStatus {
                    state: TaskState::Failed,
                    message: Some(status_message),
                    timestamp: now(),
                },
                artifacts: Vec::new(),
                history: vec![user_message],
                kind: "task".to_string(),
            }
        }
    };

    match serde_json::to_value(&task) {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(error) => {
            JsonRpcResponse::failure(id, INTERNAL_ERROR, format!("Internal error: {error}"))
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
