use std::sync::Arc;

use tracing::info;

use super::directory::{RequestDirectory, RequestDirectoryError};
use super::domain::{NewRequest, PatientRequest};

/// Placeholder contact used when the patient profile carries no phone number,
/// kept from the original intake form.
const FALLBACK_PHONE: &str = "(11) 99999-9999";

/// Patient-side submission of a new request. Validation mirrors the intake
/// form: a psychologist must be chosen and the need description must not be
/// blank.
pub struct RequestIntakeService<R> {
    directory: Arc<R>,
}

impl<R> RequestIntakeService<R>
where
    R: RequestDirectory + 'static,
{
    pub fn new(directory: Arc<R>) -> Self {
        Self { directory }
    }

    pub async fn submit(&self, mut request: NewRequest) -> Result<PatientRequest, IntakeError> {
        let description = request.description.trim();
        if description.is_empty() {
            return Err(IntakeError::MissingDescription);
        }
        request.description = description.to_string();

        if request.preferred_psychologist.0.trim().is_empty() {
            return Err(IntakeError::MissingPsychologist);
        }

        if request.patient.phone.trim().is_empty() {
            request.patient.phone = FALLBACK_PHONE.to_string();
        }

        let stored = self.directory.submit(request).await?;
        info!(request = %stored.id, urgency = stored.urgency.label(), "request submitted");
        Ok(stored)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("a descrição da necessidade é obrigatória")]
    MissingDescription,
    #[error("selecione um psicólogo para a solicitação")]
    MissingPsychologist,
    #[error(transparent)]
    Directory(#[from] RequestDirectoryError),
}
