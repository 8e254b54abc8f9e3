use agentcore_agent::Agent;

use super::types::{AgentCapabilities, AgentCard, AgentSkill};

pub const AGENT_VERSION: &str = "0.0.1";
pub const PROTOCOL_VERSION: &str = "0.3.0";

/// Agent card advertising one skill per registered tool.
pub fn build_agent_card(agent: &Agent, url: &str) -> AgentCard {
    let skills = agent
        .tools()
        .specs()
        .into_iter()
        .map(|spec| AgentSkill {
            id: spec.name.clone(),
            name: spec.name,
            description: spec.description,
            tags: Vec::new(),
        })
        .collect();

    AgentCard {
        name: agent.name().to_string(),
        description: agent.description().to_string(),
        url: url.to_string(),
        version: AGENT_VERSION.to_string(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        preferred_transport: "JSONRPC".to_string(),
        capabilities: AgentCapabilities::default(),
        default_input_modes: vec!["text".to_string()],
        default_output_modes: vec!["text".to_string()],
        skills,
    }
}
