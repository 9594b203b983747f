use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_api_client::ClinicApiClient;
use shared_models::{ClientError, Session};

use crate::models::{CreateUserRequest, SetUserStatusRequest, UserAccount};

/// Staff account management. Every call requires an admin session.
pub struct UserService {
    api: Arc<ClinicApiClient>,
}

impl UserService {
    pub fn new(api: Arc<ClinicApiClient>) -> Self {
        Self { api }
    }

    fn require_admin(session: &Session) -> Result<(), ClientError> {
        if session.is_admin() {
            return Ok(());
        }
        warn!(
            "User {} with role {} attempted user management",
            session.user.username, session.user.role
        );
        Err(ClientError::Unauthorized(
            "Only administrators can manage users".to_string(),
        ))
    }

    pub async fn list_users(&self, session: &Session) -> Result<Vec<UserAccount>, ClientError> {
        Self::require_admin(session)?;
        debug!("Fetching user accounts");

        self.api
            .request(Method::GET, "/api/users", Some(session.token()), None)
            .await
    }

    pub async fn create_user(
        &self,
        request: CreateUserRequest,
        session: &Session,
    ) -> Result<UserAccount, ClientError> {
        Self::require_admin(session)?;

        let errors = request.validation_errors();
        if !errors.is_empty() {
            return Err(ClientError::Validation(errors.join(", ")));
        }

        debug!("Creating user {} with role {}", request.username, request.role);

        let body = serde_json::to_value(&request)?;
        let account: UserAccount = self
            .api
            .request(Method::POST, "/api/users", Some(session.token()), Some(body))
            .await?;

        info!("Created user {} ({})", account.username, account.id);
        Ok(account)
    }

    pub async fn set_user_active(
        &self,
        user_id: Uuid,
        active: bool,
        session: &Session,
    ) -> Result<(), ClientError> {
        Self::require_admin(session)?;
        debug!("Setting user {} active={}", user_id, active);

        let path = format!("/api/users/{}/status", user_id);
        let body = serde_json::to_value(SetUserStatusRequest { active })?;

        self.api
            .request_ack(Method::PATCH, &path, Some(session.token()), Some(body))
            .await?;

        info!("User {} is now {}", user_id, if active { "active" } else { "inactive" });
        Ok(())
    }
}
