use reqwest::StatusCode;
use serde_json::json;

use super::directory::{
    PatientDirectory, PatientDirectoryError, RequestDirectory, RequestDirectoryError,
};
use super::domain::{
    NewRequest, PatientRecord, PatientRequest, PatientUpsert, PsychologistId, RequestId,
    Resolution,
};

/// Client for the remote platform API, implementing both directory contracts
/// over plain JSON endpoints.
#[derive(Debug, Clone)]
pub struct RemoteDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

impl RequestDirectory for RemoteDirectory {
    async fn list(&self) -> Result<Vec<PatientRequest>, RequestDirectoryError> {
        let response = self
            .client
            .get(self.endpoint("/api/v1/requests"))
            .send()
            .await
            .map_err(|error| RequestDirectoryError::Network(error.to_string()))?;

        if !response.status().is_success() {
            return Err(request_error_for(response.status()));
        }

        response
            .json()
            .await
            .map_err(|error| RequestDirectoryError::Server(error.to_string()))
    }

    async fn submit(&self, request: NewRequest) -> Result<PatientRequest, RequestDirectoryError> {
        let response = self
            .client
            .post(self.endpoint("/api/v1/requests"))
            .json(&request)
            .send()
            .await
            .map_err(|error| RequestDirectoryError::Network(error.to_string()))?;

        if !response.status().is_success() {
            return Err(request_error_for(response.status()));
        }

        response
            .json()
            .await
            .map_err(|error| RequestDirectoryError::Server(error.to_string()))
    }

    async fn set_status(
        &self,
        id: &RequestId,
        resolution: Resolution,
    ) -> Result<(), RequestDirectoryError> {
        let response = self
            .client
            .put(self.endpoint(&format!("/api/v1/requests/{id}/status")))
            .json(&json!({ "status": resolution }))
            .send()
            .await
            .map_err(|error| RequestDirectoryError::Network(error.to_string()))?;

        if !response.status().is_success() {
            return Err(request_error_for(response.status()));
        }
        Ok(())
    }
}

impl PatientDirectory for RemoteDirectory {
    async fn upsert(&self, patient: PatientUpsert) -> Result<(), PatientDirectoryError> {
        let response = self
            .client
            .put(self.endpoint(&format!("/api/v1/patients/{}", patient.patient_id.0)))
            .json(&patient)
            .send()
            .await
            .map_err(|error| PatientDirectoryError::Server(error.to_string()))?;

        if !response.status().is_success() {
            return Err(patient_error_for(response.status()));
        }
        Ok(())
    }

    async fn list_for(
        &self,
        psychologist: &PsychologistId,
    ) -> Result<Vec<PatientRecord>, PatientDirectoryError> {
        let response = self
            .client
            .get(self.endpoint(&format!(
                "/api/v1/psychologists/{}/patients",
                psychologist.0
            )))
            .send()
            .await
            .map_err(|error| PatientDirectoryError::Server(error.to_string()))?;

        if !response.status().is_success() {
            return Err(patient_error_for(response.status()));
        }

        response
            .json()
            .await
            .map_err(|error| PatientDirectoryError::Server(error.to_string()))
    }
}

fn request_error_for(status: StatusCode) -> RequestDirectoryError {
    match status {
        StatusCode::NOT_FOUND => RequestDirectoryError::NotFound,
        other => RequestDirectoryError::Server(format!("unexpected status {other}")),
    }
}

fn patient_error_for(status: StatusCode) -> PatientDirectoryError {
    match status {
        StatusCode::CONFLICT => PatientDirectoryError::AlreadyRegistered,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            PatientDirectoryError::Validation(format!("rejected with status {status}"))
        }
        other => PatientDirectoryError::Server(format!("unexpected status {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_request_maps_to_not_found() {
        assert_eq!(
            request_error_for(StatusCode::NOT_FOUND),
            RequestDirectoryError::NotFound
        );
        assert!(matches!(
            request_error_for(StatusCode::INTERNAL_SERVER_ERROR),
            RequestDirectoryError::Server(_)
        ));
    }

    #[test]
    fn patient_conflict_maps_to_already_registered() {
        assert_eq!(
            patient_error_for(StatusCode::CONFLICT),
            PatientDirectoryError::AlreadyRegistered
        );
        assert!(matches!(
            patient_error_for(StatusCode::UNPROCESSABLE_ENTITY),
            PatientDirectoryError::Validation(_)
        ));
        assert!(matches!(
            patient_error_for(StatusCode::BAD_GATEWAY),
            PatientDirectoryError::Server(_)
        ));
    }

    #[test]
    fn endpoints_tolerate_trailing_slash_in_base() {
        let directory = RemoteDirectory::new("https://api.acolhe.org/");
        assert_eq!(
            directory.endpoint("/api/v1/requests"),
            "https://api.acolhe.org/api/v1/requests"
        );
    }
}
