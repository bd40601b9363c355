use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::directory::{
    PatientDirectory, PatientDirectoryError, RequestDirectory, RequestDirectoryError,
    ReviewNotice, ReviewNotifier,
};
use super::domain::{PatientRequest, PsychologistId, RequestId, RequestStatus, Resolution};

const MSG_ACCEPTED: &str = "Solicitação aceita! Paciente adicionado à sua lista.";
const MSG_REJECTED: &str = "Solicitação rejeitada.";
const MSG_ACTION_FAILED: &str = "Erro ao processar solicitação";
const MSG_LOAD_FAILED: &str = "Erro ao carregar solicitações";

/// Review workflow for the pending request queue of the current session.
///
/// State is transient: the pending list mirrors the last successful `load`
/// minus optimistic removals, and the processing set is the only guard against
/// duplicate in-flight actions on the same request. The remote API stays
/// authoritative; removals are not reconciled until the next `load`.
pub struct RequestReviewService<R, P, N> {
    directory: Arc<R>,
    patients: Arc<P>,
    notifier: Arc<N>,
    state: Mutex<ReviewState>,
}

#[derive(Default)]
struct ReviewState {
    pending: Vec<PatientRequest>,
    processing: HashSet<RequestId>,
}

/// Result of a duplicate-guard check: the action either runs or is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Completed,
    AlreadyInFlight,
}

enum Begin {
    Started(PatientRequest),
    AlreadyInFlight,
}

impl<R, P, N> RequestReviewService<R, P, N>
where
    R: RequestDirectory + 'static,
    P: PatientDirectory + 'static,
    N: ReviewNotifier + 'static,
{
    pub fn new(directory: Arc<R>, patients: Arc<P>, notifier: Arc<N>) -> Self {
        Self {
            directory,
            patients,
            notifier,
            state: Mutex::new(ReviewState::default()),
        }
    }

    /// Snapshot of the local pending queue, in remote order.
    pub fn pending(&self) -> Vec<PatientRequest> {
        self.lock_state().pending.clone()
    }

    /// Snapshot of the request ids with an action currently in flight.
    pub fn processing(&self) -> HashSet<RequestId> {
        self.lock_state().processing.clone()
    }

    /// Refresh the pending queue from the remote directory. Non-pending
    /// entries are dropped, relative order is preserved. On failure the stale
    /// queue is kept and the operator is notified once.
    pub async fn load(&self) -> Result<Vec<PatientRequest>, ReviewError> {
        let fetched = match self.directory.list().await {
            Ok(requests) => requests,
            Err(error) => {
                warn!(%error, "failed to refresh request queue");
                self.notifier
                    .notify(ReviewNotice::failure(None, MSG_LOAD_FAILED));
                return Err(ReviewError::Fetch(error));
            }
        };

        let pending: Vec<PatientRequest> = fetched
            .into_iter()
            .filter(|request| request.status == RequestStatus::Pending)
            .collect();

        self.lock_state().pending = pending.clone();
        Ok(pending)
    }

    /// Accept a pending request: upsert the patient record under the acting
    /// psychologist, then mark the request accepted remotely. An "already
    /// registered" conflict on the upsert is swallowed and the flow continues.
    /// A successful upsert is not rolled back if the status update fails; the
    /// request simply stays pending and actionable.
    pub async fn accept(
        &self,
        id: &RequestId,
        reviewer: &PsychologistId,
    ) -> Result<ReviewOutcome, ReviewError> {
        let request = match self.begin(id)? {
            Begin::AlreadyInFlight => return Ok(ReviewOutcome::AlreadyInFlight),
            Begin::Started(request) => request,
        };

        match self.patients.upsert(request.upsert_for(reviewer)).await {
            Ok(()) => {}
            Err(PatientDirectoryError::AlreadyRegistered) => {
                debug!(request = %id, "patient already registered, continuing accept");
            }
            Err(error) => {
                warn!(request = %id, %error, "patient upsert failed, aborting accept");
                self.abandon(id);
                return Err(ReviewError::Upsert(error));
            }
        }

        self.resolve(id, Resolution::Accepted, MSG_ACCEPTED).await
    }

    /// Reject a pending request: mark it rejected remotely, no patient side
    /// effects.
    pub async fn reject(&self, id: &RequestId) -> Result<ReviewOutcome, ReviewError> {
        match self.begin(id)? {
            Begin::AlreadyInFlight => return Ok(ReviewOutcome::AlreadyInFlight),
            Begin::Started(_) => {}
        }

        self.resolve(id, Resolution::Rejected, MSG_REJECTED).await
    }

    /// Duplicate guard plus processing mark. Runs under one lock acquisition
    /// so two racing actions on the same id cannot both start.
    fn begin(&self, id: &RequestId) -> Result<Begin, ReviewError> {
        let mut state = self.lock_state();
        if state.processing.contains(id) {
            return Ok(Begin::AlreadyInFlight);
        }

        let request = state
            .pending
            .iter()
            .find(|request| request.id == *id)
            .cloned()
            .ok_or_else(|| ReviewError::UnknownRequest(id.clone()))?;

        state.processing.insert(id.clone());
        Ok(Begin::Started(request))
    }

    async fn resolve(
        &self,
        id: &RequestId,
        resolution: Resolution,
        success_message: &str,
    ) -> Result<ReviewOutcome, ReviewError> {
        match self.directory.set_status(id, resolution).await {
            Ok(()) => {
                let mut state = self.lock_state();
                state.pending.retain(|request| request.id != *id);
                state.processing.remove(id);
                drop(state);

                self.notifier
                    .notify(ReviewNotice::success(id.clone(), success_message));
                Ok(ReviewOutcome::Completed)
            }
            Err(error) => {
                warn!(request = %id, status = resolution.label(), %error, "status update failed");
                self.abandon(id);
                Err(ReviewError::StatusUpdate(error))
            }
        }
    }

    /// Unmark a failed action so the request stays actionable, and surface the
    /// failure once.
    fn abandon(&self, id: &RequestId) {
        self.lock_state().processing.remove(id);
        self.notifier
            .notify(ReviewNotice::failure(Some(id.clone()), MSG_ACTION_FAILED));
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ReviewState> {
        self.state.lock().expect("review state mutex poisoned")
    }
}

/// Error raised by the review workflow. Nothing here is fatal to the process;
/// after any failure the queue stays usable.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    #[error("could not refresh requests: {0}")]
    Fetch(#[source] RequestDirectoryError),
    #[error("request {0} is not in the pending queue")]
    UnknownRequest(RequestId),
    #[error("patient upsert failed: {0}")]
    Upsert(#[source] PatientDirectoryError),
    #[error("status update failed: {0}")]
    StatusUpdate(#[source] RequestDirectoryError),
}
