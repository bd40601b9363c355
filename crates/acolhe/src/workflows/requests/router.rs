use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::directory::{PatientDirectory, PatientDirectoryError, RequestDirectory, ReviewNotifier};
use super::domain::{NewRequest, PsychologistId, RequestId, RequestView};
use super::intake::{IntakeError, RequestIntakeService};
use super::review::{RequestReviewService, ReviewError, ReviewOutcome};
use super::summary::QueueSummary;

/// Shared state for the request endpoints: the reviewer-side queue service and
/// the patient-side intake service, backed by the same request directory.
pub struct RequestRouterState<R, P, N> {
    pub review: Arc<RequestReviewService<R, P, N>>,
    pub intake: Arc<RequestIntakeService<R>>,
}

impl<R, P, N> Clone for RequestRouterState<R, P, N> {
    fn clone(&self) -> Self {
        Self {
            review: self.review.clone(),
            intake: self.intake.clone(),
        }
    }
}

/// Router builder exposing the request workflow over HTTP.
pub fn request_router<R, P, N>(state: RequestRouterState<R, P, N>) -> Router
where
    R: RequestDirectory + 'static,
    P: PatientDirectory + 'static,
    N: ReviewNotifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/requests",
            get(queue_handler::<R, P, N>).post(submit_handler::<R, P, N>),
        )
        .route("/api/v1/requests/summary", get(summary_handler::<R, P, N>))
        .route(
            "/api/v1/requests/:request_id/accept",
            post(accept_handler::<R, P, N>),
        )
        .route(
            "/api/v1/requests/:request_id/reject",
            post(reject_handler::<R, P, N>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecisionBody {
    pub(crate) psychologist_id: PsychologistId,
}

pub(crate) async fn queue_handler<R, P, N>(
    State(state): State<RequestRouterState<R, P, N>>,
) -> Response
where
    R: RequestDirectory + 'static,
    P: PatientDirectory + 'static,
    N: ReviewNotifier + 'static,
{
    match state.review.load().await {
        Ok(requests) => {
            let views: Vec<RequestView> = requests.iter().map(|request| request.view()).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(error) => review_error_response(error),
    }
}

/// KPI counters over the pending queue. A failed refresh falls back to the
/// stale local queue, mirroring the review screen.
pub(crate) async fn summary_handler<R, P, N>(
    State(state): State<RequestRouterState<R, P, N>>,
) -> Response
where
    R: RequestDirectory + 'static,
    P: PatientDirectory + 'static,
    N: ReviewNotifier + 'static,
{
    let requests = match state.review.load().await {
        Ok(requests) => requests,
        Err(_) => state.review.pending(),
    };
    (StatusCode::OK, Json(QueueSummary::from_requests(&requests))).into_response()
}

pub(crate) async fn submit_handler<R, P, N>(
    State(state): State<RequestRouterState<R, P, N>>,
    Json(submission): Json<NewRequest>,
) -> Response
where
    R: RequestDirectory + 'static,
    P: PatientDirectory + 'static,
    N: ReviewNotifier + 'static,
{
    match state.intake.submit(submission).await {
        Ok(stored) => (StatusCode::CREATED, Json(stored.view())).into_response(),
        Err(error @ (IntakeError::MissingDescription | IntakeError::MissingPsychologist)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn accept_handler<R, P, N>(
    State(state): State<RequestRouterState<R, P, N>>,
    Path(request_id): Path<String>,
    Json(decision): Json<DecisionBody>,
) -> Response
where
    R: RequestDirectory + 'static,
    P: PatientDirectory + 'static,
    N: ReviewNotifier + 'static,
{
    let id = RequestId(request_id);
    match state.review.accept(&id, &decision.psychologist_id).await {
        Ok(outcome) => outcome_response(&id, outcome, "aceito"),
        Err(error) => review_error_response(error),
    }
}

pub(crate) async fn reject_handler<R, P, N>(
    State(state): State<RequestRouterState<R, P, N>>,
    Path(request_id): Path<String>,
) -> Response
where
    R: RequestDirectory + 'static,
    P: PatientDirectory + 'static,
    N: ReviewNotifier + 'static,
{
    let id = RequestId(request_id);
    match state.review.reject(&id).await {
        Ok(outcome) => outcome_response(&id, outcome, "rejeitado"),
        Err(error) => review_error_response(error),
    }
}

fn outcome_response(id: &RequestId, outcome: ReviewOutcome, resolution: &str) -> Response {
    match outcome {
        ReviewOutcome::Completed => {
            let payload = json!({ "request_id": id, "result": resolution });
            (StatusCode::OK, Json(payload)).into_response()
        }
        ReviewOutcome::AlreadyInFlight => {
            let payload = json!({ "request_id": id, "result": "processing" });
            (StatusCode::ACCEPTED, Json(payload)).into_response()
        }
    }
}

fn review_error_response(error: ReviewError) -> Response {
    let status = match &error {
        ReviewError::UnknownRequest(_) => StatusCode::NOT_FOUND,
        ReviewError::Upsert(PatientDirectoryError::Validation(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ReviewError::Fetch(_) | ReviewError::Upsert(_) | ReviewError::StatusUpdate(_) => {
            StatusCode::BAD_GATEWAY
        }
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
