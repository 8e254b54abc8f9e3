//! A2A (agent-to-agent) adapter over the JSON-RPC transport.
//!
//! Endpoints (relative to the mount path):
//! - `GET  /.well-known/agent-card.json`: agent card
//! - `GET  /.well-known/agent.json`: agent card (legacy path)
//! - `POST /`: JSON-RPC 2.0 (`message/send`, ...)
//!
//! No task store is kept: `message/send` answers with a finished task and
//! `tasks/get` / `tasks/cancel` always report the task as unknown.

pub mod card;
pub mod handler;
pub mod types;

use std::sync::Arc;

use agentcore_agent::AgentRuntime;
use axum::{
    routing::{get, post},
    Router,
};
use tracing::debug;
use url::Url;

use self::types::AgentCard;

#[derive(Clone)]
pub struct A2aState {
    runtime: Arc<AgentRuntime>,
    card: Arc<AgentCard>,
}

pub struct A2aServer {
    runtime: Arc<AgentRuntime>,
    url: Option<Url>,
    card: AgentCard,
    serve_at_root: bool,
}

impl A2aServer {
    /// Binds the runtime to its public URL.
    ///
    /// The URL is advertised in the agent card exactly as given. With
    /// `serve_at_root`, or when the URL is not an absolute http(s) URL, routes
    /// are served at `/`; otherwise they are nested under the URL path.
    pub fn new(runtime: Arc<AgentRuntime>, http_url: &str, serve_at_root: bool) -> Self {
        let url = Url::parse(http_url)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"));
        if url.is_none() {
            debug!(
                event_name = "a2a.server.url_unparsed",
                url = %http_url,
                "runtime url is not an absolute http(s) url; serving at root"
            );
        }

        let card = card::build_agent_card(runtime.agent(), http_url);
        Self { runtime, url, card, serve_at_root }
    }

    pub fn agent_card(&self) -> &AgentCard {
        &self.card
    }

    pub fn mount_path(&self) -> String {
        let path = match &self.url {
            Some(url) if !self.serve_at_root => url.path().trim_end_matches('/'),
            _ => "",
        };
        match path {
            "" => "/".to_string(),
            path => path.to_string(),
        }
    }

    pub fn router(&self) -> Router {
        let state = A2aState { runtime: self.runtime.clone(), card: Arc::new(self.card.clone()) };
        let routes = Router::new()
            .route("/", post(handler::rpc))
            .route("/.well-known/agent-card.json", get(handler::agent_card))
            .route("/.well-known/agent.json", get(handler::agent_card))
            .with_state(state);

        match self.mount_path().as_str() {
            "/" => routes,
            path => Router::new().nest(path, routes),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use agentcore_agent::llm::{ConverseRequest, ConverseResponse, ModelClient};
    use agentcore_agent::{create_agent, AgentRuntime};
    use agentcore_core::errors::ModelError;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::A2aServer;

    struct Unreachable;

    #[async_trait]
    impl ModelClient for Unreachable {
        async fn converse(&self, _: &ConverseRequest) -> Result<ConverseResponse, ModelError> {
            Err(ModelError::Transport("no backend in tests".to_string()))
        }
    }

    fn runtime() -> Arc<AgentRuntime> {
        Arc::new(AgentRuntime::new(create_agent(), Arc::new(Unreachable), 4))
    }

    #[test]
    fn unparseable_url_is_advertised_verbatim_and_served_at_root() {
        for url in ["agentcore-runtime:9000", "not a url", "/relative/path"] {
            let at_root = A2aServer::new(runtime(), url, true);
            let nested = A2aServer::new(runtime(), url, false);

            assert_eq!(at_root.agent_card().url, url);
            assert_eq!(at_root.mount_path(), "/");
            assert_eq!(nested.mount_path(), "/", "{url:?}");
        }
    }

    #[test]
    fn serve_at_root_ignores_url_path() {
        let url = "https://runtime.example.com/runtimes/arn%3Aagent/invocations/";

        let at_root = A2aServer::new(runtime(), url, true);
        let nested = A2aServer::new(runtime(), url, false);

        assert_eq!(at_root.mount_path(), "/");
        assert_eq!(nested.mount_path(), "/runtimes/arn%3Aagent/invocations");
        assert_eq!(at_root.agent_card().url, url);
    }

    #[tokio::test]
    async fn nested_mount_serves_card_under_url_path() {
        let server = A2aServer::new(runtime(), "http://127.0.0.1:9000/agents/letters/", false);

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/agents/letters/.well-known/agent-card.json")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let card: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(card["url"], "http://127.0.0.1:9000/agents/letters/");
        assert_eq!(card["protocolVersion"], "0.3.0");
    }
}
