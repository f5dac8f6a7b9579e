use api_types::Stats;
use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};
use tracing::instrument;

use super::error::ErrorResponse;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(get_stats))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[instrument(name = "stats.get_stats", skip(state))]
async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>, ErrorResponse> {
    let stats = state.reviews().stats(&state.op_context()).await?;
    Ok(Json(stats))
}
