//! Admin status, reload and export handlers

use crate::handlers::{auth, live::LiveResponse};
use crate::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Datelike;
use livemeta_core::{LiveData, Locale, StorageStatus};
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    storage: StorageStatus,
    data: LiveData,
    timestamp: chrono::DateTime<chrono::Utc>,
}

pub async fn status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, StatusCode> {
    auth::require_admin(&state, &headers)?;

    Ok(Json(StatusResponse {
        storage: state.live.status(),
        data: state.live.get_all().await,
        timestamp: chrono::Utc::now(),
    }))
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    message: String,
    storage: StorageStatus,
    data: LiveData,
}

/// Drop the read cache and reload from the backend
pub async fn reload(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ReloadResponse>, StatusCode> {
    auth::require_admin(&state, &headers)?;

    state.live.invalidate().await;
    let data = state.live.get_all().await;

    Ok(Json(ReloadResponse {
        message: "Live data reloaded".to_string(),
        storage: state.live.status(),
        data,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    language: Locale,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    success: bool,
    key: String,
}

/// Publish one locale's envelope as a JSON blob under the object root
pub async fn export(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ExportRequest>,
) -> Result<Json<ExportResponse>, StatusCode> {
    auth::require_admin(&state, &headers)?;

    let record = state.live.get_record(req.language).await;
    let body = serde_json::to_vec(&LiveResponse::new(record))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let key = format!("live/{}-{}.json", req.language, chrono::Utc::now().year());
    if let Err(e) = state.objects.put_object(&key, &body).await {
        error!("Failed to export {}: {:#}", key, e);
        state.metrics.record_error(req.language).await;
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    Ok(Json(ExportResponse { success: true, key }))
}
