use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryCandidateDirectory, InMemoryJobRepository, InMemoryNotificationPublisher,
};
use crate::routes::with_job_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use yardline::config::AppConfig;
use yardline::error::AppError;
use yardline::telemetry;
use yardline::workflows::jobs::JobService;
use yardline::workflows::roster::RosterImporter;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(roster) = args.roster.take() {
        config.roster_path = Some(roster);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let directory = match config.roster_path.as_deref() {
        Some(path) => {
            let candidates = RosterImporter::from_path(path)?;
            info!(path = %path.display(), candidates = candidates.len(), "roster loaded");
            InMemoryCandidateDirectory::new(candidates)
        }
        None => InMemoryCandidateDirectory::default(),
    };
    let directory_size = directory.len();

    let job_service = Arc::new(JobService::new(
        Arc::new(InMemoryJobRepository::default()),
        Arc::new(directory),
        Arc::new(InMemoryNotificationPublisher::default()),
        config.workflow,
    ));

    let app = with_job_routes(job_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::Bind { addr, source })?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, directory_size, "yardline job service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
