use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, info, warn};

use shared_api_client::ClinicApiClient;
use shared_models::{ClientError, Session};
use shared_utils::jwt::token_expiry;

use crate::models::{LoginRequest, LoginResponse};

pub struct AuthService {
    api: Arc<ClinicApiClient>,
}

impl AuthService {
    pub fn new(api: Arc<ClinicApiClient>) -> Self {
        Self { api }
    }

    /// Exchanges credentials for a session. The expiry comes from the token's
    /// `exp` claim when it has one.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ClientError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ClientError::validation("Username and password are required"));
        }

        debug!("Logging in as {}", username);

        let body = serde_json::to_value(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;

        let response: LoginResponse = self
            .api
            .request(Method::POST, "/api/auth/login", None, Some(body))
            .await?;

        let expires_at = token_expiry(&response.token);
        if expires_at.is_none() {
            debug!("Session token carries no readable expiry");
        }

        info!("User {} logged in as {}", response.user.username, response.user.role);
        Ok(Session::new(response.token, response.user, expires_at))
    }

    /// Tells the server the session is over. Failures are logged and ignored;
    /// the caller drops the session either way.
    pub async fn logout(&self, session: &Session) {
        match self
            .api
            .request_ack(Method::POST, "/api/auth/logout", Some(session.token()), None)
            .await
        {
            Ok(_) => info!("User {} logged out", session.user.username),
            Err(err) => warn!("Logout notification failed: {}", err),
        }
    }
}
