use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for patient requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for patient records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientId(pub String);

/// Identifier wrapper for psychologists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PsychologistId(pub String);

/// How urgent the patient marked their request. Display tagging only; the
/// review queue is processed in whatever order the remote API returned it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    #[serde(rename = "baixa")]
    Low,
    #[default]
    #[serde(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    High,
}

impl Urgency {
    pub const fn label(self) -> &'static str {
        match self {
            Urgency::Low => "baixa",
            Urgency::Medium => "media",
            Urgency::High => "alta",
        }
    }

    /// Three-level priority tag for display surfaces.
    pub const fn priority_label(self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }
}

/// Lifecycle of a request. Pending is the only mutable state; transitions are
/// one-way and triggered exactly once by a reviewer action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    #[serde(rename = "pendente")]
    Pending,
    #[serde(rename = "aceito")]
    Accepted,
    #[serde(rename = "rejeitado")]
    Rejected,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pendente",
            RequestStatus::Accepted => "aceito",
            RequestStatus::Rejected => "rejeitado",
        }
    }
}

/// The two terminal statuses a reviewer can assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "aceito")]
    Accepted,
    #[serde(rename = "rejeitado")]
    Rejected,
}

impl Resolution {
    pub const fn as_status(self) -> RequestStatus {
        match self {
            Resolution::Accepted => RequestStatus::Accepted,
            Resolution::Rejected => RequestStatus::Rejected,
        }
    }

    pub const fn label(self) -> &'static str {
        self.as_status().label()
    }
}

/// Contact data the patient provided at submission time, frozen into the
/// request so review works even if the live patient record drifts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSnapshot {
    pub patient_id: PatientId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
}

/// A patient's submission asking a psychologist to accept them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRequest {
    pub id: RequestId,
    pub patient: PatientSnapshot,
    pub preferred_psychologist: PsychologistId,
    pub description: String,
    pub urgency: Urgency,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PatientRequest {
    /// Patient upsert payload for an accept action: the submission snapshot
    /// plus the acting psychologist as the new association.
    pub fn upsert_for(&self, psychologist: &PsychologistId) -> PatientUpsert {
        PatientUpsert {
            patient_id: self.patient.patient_id.clone(),
            name: self.patient.name.clone(),
            email: self.patient.email.clone(),
            phone: self.patient.phone.clone(),
            birth_date: self.patient.birth_date,
            psychologist_id: psychologist.clone(),
        }
    }

    pub fn view(&self) -> RequestView {
        RequestView {
            id: self.id.clone(),
            patient_name: self.patient.name.clone(),
            patient_email: self.patient.email.clone(),
            patient_phone: self.patient.phone.clone(),
            description: self.description.clone(),
            urgency: self.urgency.label(),
            priority: self.urgency.priority_label(),
            status: self.status.label(),
            created_at: self.created_at,
            notes: self.notes.clone(),
        }
    }
}

/// Submission payload for a new request. Urgency defaults to media, matching
/// the intake form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRequest {
    pub patient: PatientSnapshot,
    pub preferred_psychologist: PsychologistId,
    pub description: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Create-if-absent-else-update payload for the patient directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientUpsert {
    pub patient_id: PatientId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub psychologist_id: PsychologistId,
}

/// A patient as stored remotely, tied to the psychologist caring for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: PatientId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub psychologist_id: PsychologistId,
    #[serde(default)]
    pub total_sessions: u32,
}

/// Sanitized representation of a request for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct RequestView {
    pub id: RequestId,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub description: String,
    pub urgency: &'static str,
    pub priority: &'static str,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
