use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{Actor, GeoPoint, JobDraft, JobId, JobStatus, LandscaperId};
use super::lifecycle::{allowed_transitions, Transition};
use super::repository::{
    CandidateDirectory, JobRepository, JobView, NotificationPublisher, RepositoryError,
};
use super::service::{JobService, JobServiceError, MatchRequest, TransitionRequest};

type SharedService<R, D, N> = Arc<JobService<R, D, N>>;

/// Router builder exposing job lifecycle, matching, and dashboard endpoints.
pub fn job_router<R, D, N>(service: SharedService<R, D, N>) -> Router
where
    R: JobRepository + 'static,
    D: CandidateDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/jobs", post(create_handler::<R, D, N>))
        .route("/api/v1/jobs/:job_id", get(view_handler::<R, D, N>))
        .route(
            "/api/v1/jobs/:job_id/transitions",
            post(transition_handler::<R, D, N>),
        )
        .route("/api/v1/jobs/:job_id/price", post(price_handler::<R, D, N>))
        .route(
            "/api/v1/jobs/:job_id/matches",
            post(matches_handler::<R, D, N>),
        )
        .route(
            "/api/v1/jobs/:job_id/assignment",
            post(assignment_handler::<R, D, N>),
        )
        .route(
            "/api/v1/jobs/:job_id/arrival",
            post(arrival_handler::<R, D, N>),
        )
        .route(
            "/api/v1/admin/dashboard",
            get(dashboard_handler::<R, D, N>),
        )
        .route("/api/v1/lifecycle/transitions", get(transitions_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoleQuery {
    #[serde(default)]
    role: Option<Actor>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PriceRequest {
    amount: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignmentRequest {
    landscaper_id: String,
    #[serde(default)]
    actor: Option<Actor>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArrivalRequest {
    landscaper_id: String,
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionsQuery {
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    actor: Option<Actor>,
}

pub(crate) async fn create_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    axum::Json(draft): axum::Json<JobDraft>,
) -> Response
where
    R: JobRepository + 'static,
    D: CandidateDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    match service.create(draft) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn view_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    Path(job_id): Path<String>,
    Query(query): Query<RoleQuery>,
) -> Response
where
    R: JobRepository + 'static,
    D: CandidateDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let role = query.role.unwrap_or(Actor::Admin);
    match service.view(&JobId(job_id), role) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn transition_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<TransitionRequest>,
) -> Response
where
    R: JobRepository + 'static,
    D: CandidateDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let role = request.actor;
    match service.transition(&JobId(job_id), request) {
        Ok(record) => {
            let view = JobView::for_role(record, role);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn price_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<PriceRequest>,
) -> Response
where
    R: JobRepository + 'static,
    D: CandidateDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    match service.set_price(&JobId(job_id), request.amount) {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn matches_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<MatchRequest>,
) -> Response
where
    R: JobRepository + 'static,
    D: CandidateDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    match service.find_matches(&JobId(job_id), request) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn assignment_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<AssignmentRequest>,
) -> Response
where
    R: JobRepository + 'static,
    D: CandidateDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let job_id = JobId(job_id);
    let landscaper_id = LandscaperId(request.landscaper_id);
    let actor = request.actor.unwrap_or(Actor::Admin);
    let assigned = service.auto_assign_job(&job_id, &landscaper_id, actor);
    let payload = json!({
        "job_id": job_id.0,
        "landscaper_id": landscaper_id.0,
        "assigned": assigned,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn arrival_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    Path(job_id): Path<String>,
    axum::Json(request): axum::Json<ArrivalRequest>,
) -> Response
where
    R: JobRepository + 'static,
    D: CandidateDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    let position = GeoPoint {
        lat: request.lat,
        lng: request.lng,
    };
    let landscaper_id = LandscaperId(request.landscaper_id);
    match service.record_arrival(&JobId(job_id), &landscaper_id, position) {
        Ok(started) => {
            (StatusCode::OK, axum::Json(json!({ "started": started }))).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn dashboard_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
) -> Response
where
    R: JobRepository + 'static,
    D: CandidateDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    match service.dashboard() {
        Ok(buckets) => {
            (StatusCode::OK, axum::Json(json!({ "buckets": buckets }))).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn transitions_handler(Query(query): Query<TransitionsQuery>) -> Response {
    let rows: Vec<(String, Vec<Transition>)> = match query.from.as_deref() {
        Some(raw) => match JobStatus::parse(raw) {
            Some(status) => vec![(status.as_str().to_string(), edges_for(status, query.actor))],
            None => vec![(raw.to_string(), Vec::new())],
        },
        None => JobStatus::ordered()
            .into_iter()
            .map(|status| (status.as_str().to_string(), edges_for(status, query.actor)))
            .collect(),
    };

    let table: Vec<_> = rows
        .into_iter()
        .map(|(from, transitions)| json!({ "from": from, "transitions": transitions }))
        .collect();

    (StatusCode::OK, axum::Json(json!({ "table": table }))).into_response()
}

fn edges_for(from: JobStatus, actor: Option<Actor>) -> Vec<Transition> {
    allowed_transitions(from)
        .iter()
        .copied()
        .filter(|edge| actor.map_or(true, |actor| edge.actor == actor))
        .collect()
}

fn error_response(err: JobServiceError) -> Response {
    let status = match &err {
        JobServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        JobServiceError::Repository(RepositoryError::Conflict)
        | JobServiceError::Repository(RepositoryError::Stale)
        | JobServiceError::TransitionRejected { .. }
        | JobServiceError::Superseded => StatusCode::CONFLICT,
        JobServiceError::Completion(_)
        | JobServiceError::DedicatedOperation { .. }
        | JobServiceError::InvalidDraft(_)
        | JobServiceError::InvalidPrice(_) => StatusCode::UNPROCESSABLE_ENTITY,
        JobServiceError::Repository(RepositoryError::Unavailable(_))
        | JobServiceError::Directory(_) => StatusCode::SERVICE_UNAVAILABLE,
    };

    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
