use crate::state::AppState;
use axum::{extract::State, Json};
use reddit_client::metrics::ApiMetrics;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reddit_metrics: Option<ApiMetrics>,
}

/// `GET /health`.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let reddit_metrics = match &state.reddit_metrics {
        Some(collector) => Some(collector.snapshot().await),
        None => None,
    };
    Json(HealthResponse {
        status: "ok",
        reddit_metrics,
    })
}
