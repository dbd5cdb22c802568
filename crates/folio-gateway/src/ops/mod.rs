//! Operational HTTP endpoints.
//!
//! - `/healthz` : liveness
//! - `/readyz`  : readiness (503 when draining)
//! - `/stats`   : presence snapshot from the dispatcher task
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::app_state::AppState;
use crate::dispatch::PresenceStats;
use crate::error::ApiError;

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_draining() {
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    } else {
        (StatusCode::OK, "ready")
    }
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<PresenceStats>, ApiError> {
    let stats = state.presence().stats().await?;
    Ok(Json(stats))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let extra = state.metrics_extra();
    let body = state.metrics().render(&extra);

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}
