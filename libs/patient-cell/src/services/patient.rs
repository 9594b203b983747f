use std::sync::Arc;

use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};

use shared_api_client::ClinicApiClient;
use shared_models::{ClientError, Session};

use crate::models::{CreatePatientRequest, Patient};

pub struct PatientService {
    api: Arc<ClinicApiClient>,
}

impl PatientService {
    pub fn new(api: Arc<ClinicApiClient>) -> Self {
        Self { api }
    }

    /// Looks a patient up by external identifier. `Ok(None)` means the
    /// patient is not registered yet.
    pub async fn find_by_identifier(
        &self,
        identifier: &str,
        session: &Session,
    ) -> Result<Option<Patient>, ClientError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(ClientError::validation("Enter the patient's identifier"));
        }

        debug!("Looking up patient by identifier");

        let path = format!("/api/patients/{}", urlencoding::encode(identifier));
        let patient: Option<Patient> = self
            .api
            .request_optional(Method::GET, &path, Some(session.token()), None)
            .await?;

        if patient.is_none() {
            debug!("No patient registered under the given identifier");
        }

        Ok(patient)
    }

    pub async fn create_patient(
        &self,
        request: CreatePatientRequest,
        session: &Session,
    ) -> Result<Patient, ClientError> {
        let errors = request.validation_errors();
        if !errors.is_empty() {
            return Err(ClientError::Validation(errors.join("; ")));
        }

        let body = json!({
            "identifier": request.identifier.trim(),
            "firstName": request.first_name.trim(),
            "lastName": request.last_name.trim(),
            "dateOfBirth": request.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()),
            "phone": request.phone,
            "email": request.email
        });

        let patient: Patient = self
            .api
            .request(Method::POST, "/api/patients", Some(session.token()), Some(body))
            .await?;

        info!("Patient registered with ID: {}", patient.id);
        Ok(patient)
    }
}
