//! Metrics dashboard handler

use crate::AppState;
use axum::{extract::State, http::header, response::IntoResponse, Json};

pub async fn snapshot(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.snapshot().await;
    ([(header::CACHE_CONTROL, "no-cache")], Json(snapshot))
}
