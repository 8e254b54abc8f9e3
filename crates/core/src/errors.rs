use thiserror::Error;

/// Failure raised by a tool invocation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unknown tool `{0}`")]
    UnknownTool(String),
    #[error("tool execution failed: {0}")]
    Execution(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("model client misconfigured: {0}")]
    Config(String),
    #[error("model transport failure: {0}")]
    Transport(String),
    #[error("model returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model response could not be decoded: {0}")]
    Decode(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("agent exceeded {max_turns} model turns without a final answer")]
    TurnLimit { max_turns: u32 },
}

impl AgentError {
    /// Message safe to hand back to a remote caller; never includes upstream bodies.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Model(ModelError::Status { status, .. }) if (400..500).contains(status) => {
                "The model backend rejected the request."
            }
            Self::Model(_) => "The model backend is temporarily unavailable. Please retry shortly.",
            Self::TurnLimit { .. } => "The agent could not finish within its turn limit.",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Model(ModelError::Transport(_)) => true,
            Self::Model(ModelError::Status { status, .. }) => *status == 429 || *status >= 500,
            Self::Model(ModelError::Config(_) | ModelError::Decode(_)) | Self::TurnLimit { .. } => {
                false
            }
        }
    }
}
