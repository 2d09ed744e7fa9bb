use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use yardline::error::AppError;
use yardline::workflows::jobs::{
    job_router, CandidateDirectory, JobRepository, JobService, LandscaperCandidate,
    NotificationPublisher,
};
use yardline::workflows::roster::RosterImporter;

#[derive(Debug, Deserialize)]
pub(crate) struct RosterPreviewRequest {
    pub(crate) csv: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RosterPreviewResponse {
    pub(crate) count: usize,
    pub(crate) candidates: Vec<LandscaperCandidate>,
}

pub(crate) fn with_job_routes<R, D, N>(service: Arc<JobService<R, D, N>>) -> axum::Router
where
    R: JobRepository + 'static,
    D: CandidateDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    job_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/roster/preview",
            axum::routing::post(roster_preview_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Parses a roster export without loading it, so operators can check a file
/// before pointing `ROSTER_CSV` at it.
pub(crate) async fn roster_preview_endpoint(
    Json(payload): Json<RosterPreviewRequest>,
) -> Result<Json<RosterPreviewResponse>, AppError> {
    let candidates = RosterImporter::from_reader(Cursor::new(payload.csv.into_bytes()))?;

    Ok(Json(RosterPreviewResponse {
        count: candidates.len(),
        candidates,
    }))
}
