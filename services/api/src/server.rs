use crate::cli::ServeArgs;
use crate::infra::{seed_requests, AppState, InMemoryPatientDirectory, InMemoryRequestDirectory};
use crate::routes::platform_routes;
use acolhe::config::AppConfig;
use acolhe::error::AppError;
use acolhe::telemetry;
use acolhe::workflows::requests::RemoteDirectory;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = match config.remote.base_url.clone() {
        Some(base_url) => {
            info!(%base_url, "reviewing requests against the remote platform API");
            let remote = Arc::new(RemoteDirectory::new(base_url));
            platform_routes(remote.clone(), remote)
        }
        None => {
            info!("no remote API configured, serving the in-memory substitute");
            let directory = Arc::new(InMemoryRequestDirectory::seeded(seed_requests()));
            let patients = Arc::new(InMemoryPatientDirectory::default());
            platform_routes(directory, patients)
        }
    };

    let app = app.layer(Extension(app_state)).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "request review service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
