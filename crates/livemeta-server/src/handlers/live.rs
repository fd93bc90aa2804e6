//! Live-stream metadata handlers
//!
//! The per-locale GET endpoints serve the `{ "acf": { "live": ... } }`
//! envelope the front-end consumes; the update endpoint applies partial
//! edits from the admin form.

use crate::handlers::auth;
use crate::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use livemeta_core::{LiveData, LivePatch, LiveRecord, Locale};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Short edge cache for the public read endpoints
const PUBLIC_CACHE_CONTROL: &str = "public, max-age=5, s-maxage=5";

#[derive(Debug, Serialize)]
pub struct LiveResponse {
    pub(crate) acf: AcfEnvelope,
}

#[derive(Debug, Serialize)]
pub struct AcfEnvelope {
    pub(crate) live: LiveRecord,
}

impl LiveResponse {
    pub(crate) fn new(record: LiveRecord) -> Self {
        Self {
            acf: AcfEnvelope { live: record },
        }
    }
}

pub async fn get_pt(State(state): State<AppState>) -> impl IntoResponse {
    get_locale(state, Locale::Pt).await
}

pub async fn get_es(State(state): State<AppState>) -> impl IntoResponse {
    get_locale(state, Locale::Es).await
}

async fn get_locale(state: AppState, locale: Locale) -> impl IntoResponse {
    let started = Instant::now();
    let record = state.live.get_record(locale).await;
    state.metrics.record_request(locale, started.elapsed()).await;

    (
        [(header::CACHE_CONTROL, PUBLIC_CACHE_CONTROL)],
        Json(LiveResponse::new(record)),
    )
}

pub async fn get_all(State(state): State<AppState>) -> Json<LiveData> {
    Json(state.live.get_all().await)
}

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    acf: UpdatePayload,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePayload {
    #[serde(default)]
    live_pt: Option<LivePatch>,
    #[serde(default)]
    live_es: Option<LivePatch>,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    message: String,
    data: LiveData,
}

pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<UpdateResponse>, StatusCode> {
    auth::require_admin(&state, &headers)?;

    if let Some(patch) = &req.acf.live_pt {
        apply_patch(&state, Locale::Pt, patch).await;
    }
    if let Some(patch) = &req.acf.live_es {
        apply_patch(&state, Locale::Es, patch).await;
    }

    Ok(Json(UpdateResponse {
        message: "Live data updated".to_string(),
        data: state.live.get_all().await,
    }))
}

async fn apply_patch(state: &AppState, locale: Locale, patch: &LivePatch) {
    let outcome = state.live.update(locale, patch).await;
    if outcome.used_fallback {
        // The write landed in the in-process record only
        state.metrics.record_error(locale).await;
    }
}
