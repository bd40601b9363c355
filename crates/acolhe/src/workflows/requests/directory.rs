use std::future::Future;

use serde::Serialize;

use super::domain::{
    NewRequest, PatientRecord, PatientRequest, PatientUpsert, PsychologistId, RequestId,
    Resolution,
};

/// Remote service owning the request records. The wire format belongs to the
/// remote API; implementations translate it into these contracts.
pub trait RequestDirectory: Send + Sync {
    fn list(
        &self,
    ) -> impl Future<Output = Result<Vec<PatientRequest>, RequestDirectoryError>> + Send;

    fn submit(
        &self,
        request: NewRequest,
    ) -> impl Future<Output = Result<PatientRequest, RequestDirectoryError>> + Send;

    fn set_status(
        &self,
        id: &RequestId,
        resolution: Resolution,
    ) -> impl Future<Output = Result<(), RequestDirectoryError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestDirectoryError {
    #[error("request directory unreachable: {0}")]
    Network(String),
    /// The request was already resolved or deleted remotely.
    #[error("request not found")]
    NotFound,
    #[error("request directory error: {0}")]
    Server(String),
}

/// Remote service owning patient records keyed by patient id.
pub trait PatientDirectory: Send + Sync {
    fn upsert(
        &self,
        patient: PatientUpsert,
    ) -> impl Future<Output = Result<(), PatientDirectoryError>> + Send;

    fn list_for(
        &self,
        psychologist: &PsychologistId,
    ) -> impl Future<Output = Result<Vec<PatientRecord>, PatientDirectoryError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatientDirectoryError {
    /// Non-fatal during an accept: the record exists, the flow continues.
    #[error("patient already registered")]
    AlreadyRegistered,
    #[error("invalid patient data: {0}")]
    Validation(String),
    #[error("patient directory error: {0}")]
    Server(String),
}

/// Operator-facing notification seam. One notice per action outcome; never
/// fails, never retries.
pub trait ReviewNotifier: Send + Sync {
    fn notify(&self, notice: ReviewNotice);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeOutcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewNotice {
    /// Absent for failures that are not tied to a single request (load).
    pub request_id: Option<RequestId>,
    pub outcome: NoticeOutcome,
    pub message: String,
}

impl ReviewNotice {
    pub fn success(request_id: RequestId, message: impl Into<String>) -> Self {
        Self {
            request_id: Some(request_id),
            outcome: NoticeOutcome::Success,
            message: message.into(),
        }
    }

    pub fn failure(request_id: Option<RequestId>, message: impl Into<String>) -> Self {
        Self {
            request_id,
            outcome: NoticeOutcome::Failure,
            message: message.into(),
        }
    }
}
