use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::auth::{User, UserRole};

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// A staff account as listed on the user management screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub role: UserRole,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub full_name: String,
    pub email: Option<String>,
    pub password: String,
    pub role: UserRole,
}

impl CreateUserRequest {
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.username.trim().is_empty() {
            errors.push("Username is required".to_string());
        } else if self.username.trim().contains(char::is_whitespace) {
            errors.push("Username cannot contain spaces".to_string());
        }
        if self.full_name.trim().is_empty() {
            errors.push("Full name is required".to_string());
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ));
        }
        if let Some(email) = &self.email {
            if !email.trim().is_empty() && !email.contains('@') {
                errors.push("Email address is not valid".to_string());
            }
        }

        errors
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SetUserStatusRequest {
    pub active: bool,
}
