//! Patient roster for a psychologist: the accepted patients with their
//! contact data, computed age, and session count.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use serde_json::json;

use crate::workflows::requests::directory::{PatientDirectory, PatientDirectoryError};
use crate::workflows::requests::domain::{PatientId, PatientRecord, PsychologistId};

pub struct PatientRoster<P> {
    directory: Arc<P>,
}

impl<P> PatientRoster<P>
where
    P: PatientDirectory + 'static,
{
    pub fn new(directory: Arc<P>) -> Self {
        Self { directory }
    }

    pub async fn for_psychologist(
        &self,
        psychologist: &PsychologistId,
    ) -> Result<Vec<PatientView>, PatientDirectoryError> {
        let records = self.directory.list_for(psychologist).await?;
        let today = Local::now().date_naive();
        Ok(records
            .iter()
            .map(|record| PatientView::from_record(record, today))
            .collect())
    }
}

/// Roster entry for API responses. Age is derived, not stored.
#[derive(Debug, Clone, Serialize)]
pub struct PatientView {
    pub id: PatientId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub total_sessions: u32,
}

impl PatientView {
    pub fn from_record(record: &PatientRecord, today: NaiveDate) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            birth_date: record.birth_date,
            age: record.birth_date.map(|birth| age_on(birth, today)),
            total_sessions: record.total_sessions,
        }
    }
}

/// Completed years between `birth` and `today`, adjusting for a birthday that
/// has not happened yet this year. Future birth dates clamp to zero.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

/// Router builder exposing the roster for a psychologist.
pub fn roster_router<P>(roster: Arc<PatientRoster<P>>) -> Router
where
    P: PatientDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/psychologists/:psychologist_id/patients",
            get(roster_handler::<P>),
        )
        .with_state(roster)
}

pub(crate) async fn roster_handler<P>(
    State(roster): State<Arc<PatientRoster<P>>>,
    Path(psychologist_id): Path<String>,
) -> Response
where
    P: PatientDirectory + 'static,
{
    let psychologist = PsychologistId(psychologist_id);
    match roster.for_psychologist(&psychologist).await {
        Ok(patients) => (StatusCode::OK, Json(patients)).into_response(),
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
    }
}
