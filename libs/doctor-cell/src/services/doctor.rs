use std::sync::Arc;

use reqwest::Method;
use tracing::debug;
use uuid::Uuid;

use shared_api_client::ClinicApiClient;
use shared_models::{ClientError, Session};

use crate::models::{Branch, Doctor, Specialty, VisitType};

pub struct DoctorService {
    api: Arc<ClinicApiClient>,
}

impl DoctorService {
    pub fn new(api: Arc<ClinicApiClient>) -> Self {
        Self { api }
    }

    /// Specialties offered for the given visit type. The server scopes the
    /// list through `visitType`; for virtual visits rows explicitly marked
    /// `supportsVirtual: false` are dropped as well.
    pub async fn list_specialties(
        &self,
        visit_type: VisitType,
        session: &Session,
    ) -> Result<Vec<Specialty>, ClientError> {
        debug!("Fetching specialties for visit type {}", visit_type);

        let path = format!("/api/specialties?visitType={}", visit_type.as_str());
        let specialties: Vec<Specialty> = self
            .api
            .request(Method::GET, &path, Some(session.token()), None)
            .await?;

        Ok(match visit_type {
            VisitType::Virtual => specialties.into_iter().filter(Specialty::offers_virtual).collect(),
            VisitType::InPerson => specialties,
        })
    }

    pub async fn list_branches(&self, session: &Session) -> Result<Vec<Branch>, ClientError> {
        debug!("Fetching branches");

        self.api
            .request(Method::GET, "/api/branches", Some(session.token()), None)
            .await
    }

    pub async fn list_doctors(
        &self,
        specialty_id: Uuid,
        branch_id: Uuid,
        session: &Session,
    ) -> Result<Vec<Doctor>, ClientError> {
        debug!("Fetching doctors for specialty {} at branch {}", specialty_id, branch_id);

        let path = format!(
            "/api/doctors?specialtyId={}&branchId={}",
            specialty_id, branch_id
        );

        self.api
            .request(Method::GET, &path, Some(session.token()), None)
            .await
    }
}
