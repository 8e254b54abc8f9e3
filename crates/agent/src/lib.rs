//! Agent runtime - a tool-using conversational agent backed by a hosted model
//!
//! This crate provides everything between an incoming user message and the
//! model backend:
//! - **Tools** (`tools`) - the `Tool` trait, the ordered `ToolRegistry`, and the
//!   bundled `calculator`, `current_time` and `letter_counter` tools
//! - **Agent** (`agent`) - the agent value and its `create_agent` factory
//! - **Model seam** (`llm`) - Converse-shaped message types and `ModelClient`
//! - **Bedrock** (`bedrock`) - `ModelClient` over the Bedrock Converse HTTP API
//! - **Runtime** (`runtime`) - the bounded model/tool turn loop
//!
//! # Turn loop
//!
//! ```text
//! user text → ModelClient::converse ─┬─ end_turn → reply text
//!                  ↑                 └─ tool_use → ToolRegistry::execute
//!                  └──────── tool results ──────────────┘
//! ```

pub mod agent;
pub mod bedrock;
pub mod llm;
pub mod runtime;
pub mod tools;

pub use agent::{create_agent, Agent};
pub use runtime::{AgentReply, AgentRuntime};
