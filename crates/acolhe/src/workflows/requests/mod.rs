//! Patient request intake and review.
//!
//! A patient submits a request asking a psychologist to take them on; the
//! psychologist later reviews the pending queue and accepts or rejects each
//! request exactly once. The review service keeps the only client-side state
//! in the system: the pending list for the current session plus the set of
//! request ids with an action in flight.

pub mod directory;
pub mod domain;
pub mod intake;
pub mod remote;
pub mod review;
pub mod router;
pub mod summary;

#[cfg(test)]
mod tests;

pub use directory::{
    NoticeOutcome, PatientDirectory, PatientDirectoryError, RequestDirectory,
    RequestDirectoryError, ReviewNotice, ReviewNotifier,
};
pub use domain::{
    NewRequest, PatientId, PatientRecord, PatientRequest, PatientSnapshot, PatientUpsert,
    PsychologistId, RequestId, RequestStatus, RequestView, Resolution, Urgency,
};
pub use intake::{IntakeError, RequestIntakeService};
pub use remote::RemoteDirectory;
pub use review::{RequestReviewService, ReviewError, ReviewOutcome};
pub use router::{request_router, RequestRouterState};
pub use summary::QueueSummary;
