use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use serde_json::Value;
use tokio::sync::Notify;

use crate::workflows::requests::directory::{
    PatientDirectory, PatientDirectoryError, RequestDirectory, RequestDirectoryError,
    ReviewNotice, ReviewNotifier,
};
use crate::workflows::requests::domain::{
    NewRequest, PatientId, PatientRecord, PatientRequest, PatientSnapshot, PatientUpsert,
    PsychologistId, RequestId, RequestStatus, Resolution, Urgency,
};
use crate::workflows::requests::intake::RequestIntakeService;
use crate::workflows::requests::review::RequestReviewService;
use crate::workflows::requests::router::{request_router, RequestRouterState};

pub(super) fn reviewer() -> PsychologistId {
    PsychologistId("psi-9".to_string())
}

pub(super) fn snapshot(id: &str) -> PatientSnapshot {
    PatientSnapshot {
        patient_id: PatientId(format!("pat-{id}")),
        name: format!("Paciente {id}"),
        email: format!("paciente{id}@example.com"),
        phone: "(11) 98888-0001".to_string(),
        birth_date: None,
    }
}

pub(super) fn request_with_status(id: &str, status: RequestStatus) -> PatientRequest {
    PatientRequest {
        id: RequestId(id.to_string()),
        patient: snapshot(id),
        preferred_psychologist: reviewer(),
        description: "Procuro acompanhamento para ansiedade".to_string(),
        urgency: Urgency::Medium,
        status,
        created_at: Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).single().expect("valid"),
        notes: None,
    }
}

pub(super) fn pending_request(id: &str) -> PatientRequest {
    request_with_status(id, RequestStatus::Pending)
}

pub(super) fn new_request(description: &str) -> NewRequest {
    NewRequest {
        patient: snapshot("novo"),
        preferred_psychologist: reviewer(),
        description: description.to_string(),
        urgency: Urgency::High,
        notes: None,
    }
}

/// In-memory request directory with injectable failures and call recording.
#[derive(Default)]
pub(super) struct MemoryRequests {
    requests: Mutex<Vec<PatientRequest>>,
    list_error: Mutex<Option<RequestDirectoryError>>,
    status_error: Mutex<Option<RequestDirectoryError>>,
    status_calls: Mutex<Vec<(RequestId, Resolution)>>,
    submitted: Mutex<Vec<NewRequest>>,
    sequence: AtomicUsize,
}

impl MemoryRequests {
    pub(super) fn seeded(requests: Vec<PatientRequest>) -> Self {
        Self {
            requests: Mutex::new(requests),
            ..Self::default()
        }
    }

    pub(super) fn set_list_error(&self, error: Option<RequestDirectoryError>) {
        *self.list_error.lock().expect("lock") = error;
    }

    pub(super) fn set_status_error(&self, error: Option<RequestDirectoryError>) {
        *self.status_error.lock().expect("lock") = error;
    }

    pub(super) fn status_calls(&self) -> Vec<(RequestId, Resolution)> {
        self.status_calls.lock().expect("lock").clone()
    }

    pub(super) fn submitted(&self) -> Vec<NewRequest> {
        self.submitted.lock().expect("lock").clone()
    }
}

impl RequestDirectory for MemoryRequests {
    async fn list(&self) -> Result<Vec<PatientRequest>, RequestDirectoryError> {
        if let Some(error) = self.list_error.lock().expect("lock").clone() {
            return Err(error);
        }
        Ok(self.requests.lock().expect("lock").clone())
    }

    async fn submit(&self, request: NewRequest) -> Result<PatientRequest, RequestDirectoryError> {
        self.submitted.lock().expect("lock").push(request.clone());
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let stored = PatientRequest {
            id: RequestId(format!("req-{id:04}")),
            patient: request.patient,
            preferred_psychologist: request.preferred_psychologist,
            description: request.description,
            urgency: request.urgency,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            notes: request.notes,
        };
        self.requests.lock().expect("lock").push(stored.clone());
        Ok(stored)
    }

    async fn set_status(
        &self,
        id: &RequestId,
        resolution: Resolution,
    ) -> Result<(), RequestDirectoryError> {
        self.status_calls
            .lock()
            .expect("lock")
            .push((id.clone(), resolution));

        if let Some(error) = self.status_error.lock().expect("lock").clone() {
            return Err(error);
        }

        let mut requests = self.requests.lock().expect("lock");
        match requests.iter_mut().find(|request| request.id == *id) {
            Some(request) if request.status == RequestStatus::Pending => {
                request.status = resolution.as_status();
                Ok(())
            }
            _ => Err(RequestDirectoryError::NotFound),
        }
    }
}

/// In-memory patient directory that records upsert attempts and applies the
/// association update on success.
#[derive(Default)]
pub(super) struct MemoryPatients {
    records: Mutex<Vec<PatientRecord>>,
    upsert_error: Mutex<Option<PatientDirectoryError>>,
    attempts: AtomicUsize,
}

impl MemoryPatients {
    pub(super) fn set_upsert_error(&self, error: Option<PatientDirectoryError>) {
        *self.upsert_error.lock().expect("lock") = error;
    }

    pub(super) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub(super) fn records(&self) -> Vec<PatientRecord> {
        self.records.lock().expect("lock").clone()
    }
}

impl PatientDirectory for MemoryPatients {
    async fn upsert(&self, patient: PatientUpsert) -> Result<(), PatientDirectoryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.upsert_error.lock().expect("lock").clone() {
            return Err(error);
        }

        let mut records = self.records.lock().expect("lock");
        match records
            .iter_mut()
            .find(|record| record.id == patient.patient_id)
        {
            Some(existing) => existing.psychologist_id = patient.psychologist_id,
            None => records.push(PatientRecord {
                id: patient.patient_id,
                name: patient.name,
                email: patient.email,
                phone: patient.phone,
                birth_date: patient.birth_date,
                psychologist_id: patient.psychologist_id,
                total_sessions: 0,
            }),
        }
        Ok(())
    }

    async fn list_for(
        &self,
        psychologist: &PsychologistId,
    ) -> Result<Vec<PatientRecord>, PatientDirectoryError> {
        Ok(self
            .records
            .lock()
            .expect("lock")
            .iter()
            .filter(|record| record.psychologist_id == *psychologist)
            .cloned()
            .collect())
    }
}

/// Patient directory whose upserts block until released, for racing two
/// actions on the same request.
#[derive(Default)]
pub(super) struct GatedPatients {
    started: AtomicUsize,
    release: Notify,
}

impl GatedPatients {
    pub(super) fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub(super) fn release_one(&self) {
        self.release.notify_one();
    }
}

impl PatientDirectory for GatedPatients {
    async fn upsert(&self, _patient: PatientUpsert) -> Result<(), PatientDirectoryError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok(())
    }

    async fn list_for(
        &self,
        _psychologist: &PsychologistId,
    ) -> Result<Vec<PatientRecord>, PatientDirectoryError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub(super) struct CollectingNotifier {
    notices: Mutex<Vec<ReviewNotice>>,
}

impl CollectingNotifier {
    pub(super) fn notices(&self) -> Vec<ReviewNotice> {
        self.notices.lock().expect("lock").clone()
    }
}

impl ReviewNotifier for CollectingNotifier {
    fn notify(&self, notice: ReviewNotice) {
        self.notices.lock().expect("lock").push(notice);
    }
}

pub(super) type ReviewFixture = (
    Arc<RequestReviewService<MemoryRequests, MemoryPatients, CollectingNotifier>>,
    Arc<MemoryRequests>,
    Arc<MemoryPatients>,
    Arc<CollectingNotifier>,
);

pub(super) fn build_review(seed: Vec<PatientRequest>) -> ReviewFixture {
    let directory = Arc::new(MemoryRequests::seeded(seed));
    let patients = Arc::new(MemoryPatients::default());
    let notifier = Arc::new(CollectingNotifier::default());
    let service = Arc::new(RequestReviewService::new(
        directory.clone(),
        patients.clone(),
        notifier.clone(),
    ));
    (service, directory, patients, notifier)
}

pub(super) fn build_router(
    seed: Vec<PatientRequest>,
) -> (axum::Router, Arc<MemoryRequests>, Arc<MemoryPatients>) {
    let directory = Arc::new(MemoryRequests::seeded(seed));
    let patients = Arc::new(MemoryPatients::default());
    let notifier = Arc::new(CollectingNotifier::default());
    let review = Arc::new(RequestReviewService::new(
        directory.clone(),
        patients.clone(),
        notifier,
    ));
    let intake = Arc::new(RequestIntakeService::new(directory.clone()));
    let router = request_router(RequestRouterState { review, intake });
    (router, directory, patients)
}

pub(super) async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
