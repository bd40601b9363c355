use std::sync::Arc;

use crate::infra::{AppState, TracingNotifier};
use acolhe::workflows::patients::{roster_router, PatientRoster};
use acolhe::workflows::requests::{
    request_router, PatientDirectory, RequestDirectory, RequestIntakeService,
    RequestReviewService, RequestRouterState,
};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json, Router};
use serde_json::json;

/// Assemble the platform routes for one pair of directory implementations:
/// request review + intake, the patient roster, and the operational endpoints.
pub(crate) fn platform_routes<R, P>(directory: Arc<R>, patients: Arc<P>) -> Router
where
    R: RequestDirectory + 'static,
    P: PatientDirectory + 'static,
{
    let notifier = Arc::new(TracingNotifier);
    let review = Arc::new(RequestReviewService::new(
        directory.clone(),
        patients.clone(),
        notifier,
    ));
    let intake = Arc::new(RequestIntakeService::new(directory));
    let roster = Arc::new(PatientRoster::new(patients));

    request_router(RequestRouterState { review, intake })
        .merge(roster_router(roster))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body.get("status"), Some(&json!("ok")));
    }
}
