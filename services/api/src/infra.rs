use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use acolhe::workflows::requests::{
    NewRequest, NoticeOutcome, PatientDirectory, PatientDirectoryError, PatientId, PatientRecord,
    PatientRequest, PatientSnapshot, PatientUpsert, PsychologistId, RequestDirectory,
    RequestDirectoryError, RequestId, RequestStatus, Resolution, ReviewNotice, ReviewNotifier,
    Urgency,
};
use chrono::{TimeZone, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory substitute for the remote request API, used when no remote base
/// URL is configured and by the demo.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRequestDirectory {
    requests: Arc<Mutex<Vec<PatientRequest>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryRequestDirectory {
    pub(crate) fn seeded(requests: Vec<PatientRequest>) -> Self {
        Self {
            requests: Arc::new(Mutex::new(requests)),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> Vec<PatientRequest> {
        self.requests.lock().expect("request mutex poisoned").clone()
    }
}

impl RequestDirectory for InMemoryRequestDirectory {
    async fn list(&self) -> Result<Vec<PatientRequest>, RequestDirectoryError> {
        Ok(self.requests.lock().expect("request mutex poisoned").clone())
    }

    async fn submit(&self, request: NewRequest) -> Result<PatientRequest, RequestDirectoryError> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let stored = PatientRequest {
            id: RequestId(format!("req-{sequence:04}")),
            patient: request.patient,
            preferred_psychologist: request.preferred_psychologist,
            description: request.description,
            urgency: request.urgency,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            notes: request.notes,
        };
        self.requests
            .lock()
            .expect("request mutex poisoned")
            .push(stored.clone());
        Ok(stored)
    }

    async fn set_status(
        &self,
        id: &RequestId,
        resolution: Resolution,
    ) -> Result<(), RequestDirectoryError> {
        let mut requests = self.requests.lock().expect("request mutex poisoned");
        match requests.iter_mut().find(|request| request.id == *id) {
            // Transitions are one-way; anything already resolved reads as gone.
            Some(request) if request.status == RequestStatus::Pending => {
                request.status = resolution.as_status();
                Ok(())
            }
            _ => Err(RequestDirectoryError::NotFound),
        }
    }
}

/// In-memory substitute for the remote patient API. Upserts create the record
/// or move the psychologist association, matching the platform contract.
#[derive(Default, Clone)]
pub(crate) struct InMemoryPatientDirectory {
    records: Arc<Mutex<HashMap<PatientId, PatientRecord>>>,
}

impl PatientDirectory for InMemoryPatientDirectory {
    async fn upsert(&self, patient: PatientUpsert) -> Result<(), PatientDirectoryError> {
        let mut records = self.records.lock().expect("patient mutex poisoned");
        match records.get_mut(&patient.patient_id) {
            Some(existing) => {
                existing.psychologist_id = patient.psychologist_id;
                existing.phone = patient.phone;
                existing.email = patient.email;
            }
            None => {
                records.insert(
                    patient.patient_id.clone(),
                    PatientRecord {
                        id: patient.patient_id,
                        name: patient.name,
                        email: patient.email,
                        phone: patient.phone,
                        birth_date: patient.birth_date,
                        psychologist_id: patient.psychologist_id,
                        total_sessions: 0,
                    },
                );
            }
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
            .expect("patient mutex poisoned")
            .values()
            .filter(|record| record.psychologist_id == *psychologist)
            .cloned()
            .collect())
    }
}

/// Review notices become log lines; the service has no richer operator surface.
#[derive(Default, Clone)]
pub(crate) struct TracingNotifier;

impl ReviewNotifier for TracingNotifier {
    fn notify(&self, notice: ReviewNotice) {
        let request = notice
            .request_id
            .as_ref()
            .map(|id| id.0.as_str())
            .unwrap_or("-");
        match notice.outcome {
            NoticeOutcome::Success => info!(request, "{}", notice.message),
            NoticeOutcome::Failure => warn!(request, "{}", notice.message),
        }
    }
}

/// Seed queue for the in-memory substitute so the review endpoints have
/// something to act on out of the box.
pub(crate) fn seed_requests() -> Vec<PatientRequest> {
    let base = Utc
        .with_ymd_and_hms(2026, 8, 20, 14, 0, 0)
        .single()
        .expect("valid seed timestamp");

    vec![
        PatientRequest {
            id: RequestId("req-seed-1".to_string()),
            patient: PatientSnapshot {
                patient_id: PatientId("pat-101".to_string()),
                name: "Ana Souza".to_string(),
                email: "ana.souza@example.com".to_string(),
                phone: "(11) 98888-1010".to_string(),
                birth_date: chrono::NaiveDate::from_ymd_opt(1994, 3, 12),
            },
            preferred_psychologist: PsychologistId("psi-1".to_string()),
            description: "Crises de ansiedade frequentes no trabalho".to_string(),
            urgency: Urgency::High,
            status: RequestStatus::Pending,
            created_at: base,
            notes: Some("Prefere atendimento no fim do dia".to_string()),
        },
        PatientRequest {
            id: RequestId("req-seed-2".to_string()),
            patient: PatientSnapshot {
                patient_id: PatientId("pat-102".to_string()),
                name: "Bruno Carvalho".to_string(),
                email: "bruno.carvalho@example.com".to_string(),
                phone: "(21) 97777-2020".to_string(),
                birth_date: chrono::NaiveDate::from_ymd_opt(1988, 11, 2),
            },
            preferred_psychologist: PsychologistId("psi-1".to_string()),
            description: "Acompanhamento após luto recente".to_string(),
            urgency: Urgency::Medium,
            status: RequestStatus::Pending,
            created_at: base,
            notes: None,
        },
        PatientRequest {
            id: RequestId("req-seed-3".to_string()),
            patient: PatientSnapshot {
                patient_id: PatientId("pat-103".to_string()),
                name: "Clara Mendes".to_string(),
                email: "clara.mendes@example.com".to_string(),
                phone: String::new(),
                birth_date: None,
            },
            preferred_psychologist: PsychologistId("psi-2".to_string()),
            description: "Dificuldades de sono e concentração".to_string(),
            urgency: Urgency::Low,
            status: RequestStatus::Accepted,
            created_at: base,
            notes: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_status_is_one_way() {
        let directory = InMemoryRequestDirectory::seeded(seed_requests());
        let id = RequestId("req-seed-1".to_string());

        directory
            .set_status(&id, Resolution::Accepted)
            .await
            .expect("pending request resolves");

        // A second transition reads as already resolved.
        let error = directory
            .set_status(&id, Resolution::Rejected)
            .await
            .expect_err("resolved request rejects further transitions");
        assert_eq!(error, RequestDirectoryError::NotFound);

        let stored = directory
            .snapshot()
            .into_iter()
            .find(|request| request.id == id)
            .expect("request present");
        assert_eq!(stored.status, RequestStatus::Accepted);
    }

    #[tokio::test]
    async fn upsert_moves_the_association_for_existing_patients() {
        let directory = InMemoryPatientDirectory::default();
        let upsert = PatientUpsert {
            patient_id: PatientId("pat-1".to_string()),
            name: "Ana Souza".to_string(),
            email: "ana@example.com".to_string(),
            phone: "(11) 98888-0000".to_string(),
            birth_date: None,
            psychologist_id: PsychologistId("psi-1".to_string()),
        };

        directory.upsert(upsert.clone()).await.expect("creates");

        let moved = PatientUpsert {
            psychologist_id: PsychologistId("psi-2".to_string()),
            ..upsert
        };
        directory.upsert(moved).await.expect("updates");

        let for_old = directory
            .list_for(&PsychologistId("psi-1".to_string()))
            .await
            .expect("list");
        assert!(for_old.is_empty());

        let for_new = directory
            .list_for(&PsychologistId("psi-2".to_string()))
            .await
            .expect("list");
        assert_eq!(for_new.len(), 1);
    }

    #[tokio::test]
    async fn submitted_requests_receive_sequential_ids() {
        let directory = InMemoryRequestDirectory::default();
        let request = NewRequest {
            patient: PatientSnapshot {
                patient_id: PatientId("pat-9".to_string()),
                name: "Davi Rocha".to_string(),
                email: "davi@example.com".to_string(),
                phone: "(31) 96666-3030".to_string(),
                birth_date: None,
            },
            preferred_psychologist: PsychologistId("psi-1".to_string()),
            description: "Primeira consulta".to_string(),
            urgency: Urgency::Medium,
            notes: None,
        };

        let first = directory.submit(request.clone()).await.expect("submit");
        let second = directory.submit(request).await.expect("submit");
        assert_eq!(first.id.0, "req-0001");
        assert_eq!(second.id.0, "req-0002");
        assert_eq!(first.status, RequestStatus::Pending);
    }
}
