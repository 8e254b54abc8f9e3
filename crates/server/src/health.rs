use axum::{routing::get, Json, Router};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
}

pub fn router() -> Router {
    Router::new().route("/ping", get(ping))
}

pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { status: "healthy" })
}
