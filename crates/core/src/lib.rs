//! Shared configuration and error taxonomy for the agentcore workspace.
//!
//! - `config` - layered `AppConfig` loading (defaults, TOML file, env, overrides)
//! - `errors` - tool, model and agent error types used across crates

pub mod config;
pub mod errors;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
pub use errors::{AgentError, ModelError, ToolError};
