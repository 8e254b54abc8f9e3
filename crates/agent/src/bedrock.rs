//! `ModelClient` over the Bedrock Runtime Converse API.
//!
//! Requests are authenticated with a Bedrock API key sent as a bearer token.

use std::time::Duration;

use agentcore_core::config::ModelConfig;
use agentcore_core::errors::ModelError;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::llm::{ConverseRequest, ConverseResponse, Message, ModelClient, StopReason, Usage};

#[derive(Clone, Debug)]
pub struct BedrockClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: Option<SecretString>,
}

impl BedrockClient {
    pub fn from_config(config: &ModelConfig) -> Result<Self, ModelError> {
        let endpoint_url = config.endpoint_url();
        let endpoint = Url::parse(&endpoint_url).map_err(|error| {
            ModelError::Config(format!("invalid model endpoint `{endpoint_url}`: {error}"))
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(ModelError::Config(format!(
                "model endpoint `{endpoint_url}` cannot be used as a base URL"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| ModelError::Config(format!("http client build failed: {error}")))?;

        Ok(Self { http, endpoint, api_key: config.api_key.clone() })
    }

    fn converse_url(&self, model_id: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["model", model_id, "converse"]);
        }
        url
    }
}

#[async_trait]
impl ModelClient for BedrockClient {
    async fn converse(&self, request: &ConverseRequest) -> Result<ConverseResponse, ModelError> {
        let url = self.converse_url(&request.model_id);
        let body = ConverseBody::from_request(request);

        debug!(
            event_name = "agent.model.request",
            model_id = %request.model_id,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "sending converse request"
        );

        let mut builder = self.http.post(url).json(&body);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response =
            builder.send().await.map_err(|error| ModelError::Transport(error.to_string()))?;
        let status = response.status();
        let text = response.text().await.map_err(|error| ModelError::Transport(error.to_string()))?;

        if !status.is_success() {
            return Err(ModelError::Status { status: status.as_u16(), body: text });
        }

        let decoded = serde_json::from_str::<ConverseOutputBody>(&text)
            .map_err(|error| ModelError::Decode(error.to_string()))?;

        Ok(ConverseResponse {
            message: decoded.output.message,
            stop_reason: decoded.stop_reason,
            usage: decoded.usage,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConverseBody<'a> {
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    system: Vec<SystemBlock<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<ToolConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct SystemBlock<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct ToolConfig<'a> {
    tools: Vec<ToolEntry<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolEntry<'a> {
    tool_spec: ToolSpecBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSpecBody<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: InputSchema<'a>,
}

#[derive(Debug, Serialize)]
struct InputSchema<'a> {
    json: &'a Value,
}

impl<'a> ConverseBody<'a> {
    fn from_request(request: &'a ConverseRequest) -> Self {
        let system = request.system.as_deref().map(|text| SystemBlock { text }).into_iter().collect();
        let tool_config = (!request.tools.is_empty()).then(|| ToolConfig {
            tools: request
                .tools
                .iter()
                .map(|spec| ToolEntry {
                    tool_spec: ToolSpecBody {
                        name: &spec.name,
                        description: &spec.description,
                        input_schema: InputSchema { json: &spec.input_schema },
                    },
                })
                .collect(),
        });

        Self { messages: &request.messages, system, tool_config }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConverseOutputBody {
    output: OutputBody,
    stop_reason: StopReason,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct OutputBody {
    message: Message,
}
