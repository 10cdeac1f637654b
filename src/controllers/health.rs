use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::domain::artifact::ArtifactStore;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn health_ready(State(store): State<Arc<ArtifactStore>>) -> impl IntoResponse {
    if store.is_ready().await {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "storage": "writable",
                "pending_expirations": store.pending_expirations()
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "storage": "unavailable",
                "pending_expirations": store.pending_expirations()
            })),
        )
    }
}
