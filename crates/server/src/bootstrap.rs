use std::sync::Arc;

use agentcore_agent::bedrock::BedrockClient;
use agentcore_agent::llm::ModelClient;
use agentcore_agent::{create_agent, AgentRuntime};
use agentcore_core::config::AppConfig;
use agentcore_core::errors::ModelError;
use axum::Router;
use thiserror::Error;
use tracing::{debug, info};

use crate::a2a::A2aServer;
use crate::health;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("model client construction failed: {0}")]
    Model(#[from] ModelError),
}

/// Composes the served application against the Bedrock model backend.
pub fn create_app(config: &AppConfig) -> Result<Router, BootstrapError> {
    let model = BedrockClient::from_config(&config.model)?;
    create_app_with_model(config, Arc::new(model))
}

pub fn create_app_with_model(
    config: &AppConfig,
    model: Arc<dyn ModelClient>,
) -> Result<Router, BootstrapError> {
    let runtime_url = config.runtime.url.as_str();
    info!(
        event_name = "system.bootstrap.runtime_url",
        correlation_id = "bootstrap",
        runtime_url = %runtime_url,
        "Runtime URL: {runtime_url}"
    );

    let agent = create_agent();
    let runtime = Arc::new(AgentRuntime::new(agent, model, config.model.max_turns));
    let a2a_server = A2aServer::new(runtime, runtime_url, true);

    debug!(
        event_name = "system.bootstrap.a2a_ready",
        correlation_id = "bootstrap",
        agent = %a2a_server.agent_card().name,
        skills = a2a_server.agent_card().skills.len(),
        mount_path = %a2a_server.mount_path(),
        "a2a adapter constructed"
    );

    Ok(health::router().merge(a2a_server.router()))
}
