use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::ClientConfig;
use shared_models::auth::{Session, User, UserRole};

pub struct TestConfig {
    pub api_url: String,
    pub timeout_secs: u64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            timeout_secs: 5,
        }
    }
}

impl TestConfig {
    pub fn with_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_url.clone()).with_timeout_secs(self.timeout_secs)
    }
}

pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub role: UserRole,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("reception", UserRole::Receptionist)
    }
}

impl TestUser {
    pub fn new(username: &str, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            full_name: format!("Test {}", username),
            role,
        }
    }

    pub fn admin(username: &str) -> Self {
        Self::new(username, UserRole::Admin)
    }

    pub fn doctor(username: &str) -> Self {
        Self::new(username, UserRole::Doctor)
    }

    pub fn receptionist(username: &str) -> Self {
        Self::new(username, UserRole::Receptionist)
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            role: self.role,
        }
    }

    pub fn to_session(&self) -> Session {
        Session::new("test-session-token", self.to_user(), None)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "username": self.username,
            "fullName": self.full_name,
            "role": self.role.to_string()
        })
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id.to_string(),
            "role": user.role.to_string(),
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// JSON bodies shaped like the clinic API's envelope.
pub struct MockApiResponses;

impl MockApiResponses {
    pub fn success(data: Value) -> Value {
        json!({
            "success": true,
            "message": "",
            "data": data
        })
    }

    pub fn failure(message: &str) -> Value {
        json!({
            "success": false,
            "message": message,
            "data": null
        })
    }

    pub fn login_response(user: &TestUser, token: &str) -> Value {
        Self::success(json!({
            "token": token,
            "user": user.to_json()
        }))
    }

    pub fn specialty(id: Uuid, name: &str, supports_virtual: bool) -> Value {
        json!({
            "id": id,
            "name": name,
            "supportsVirtual": supports_virtual
        })
    }

    pub fn branch(id: Uuid, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "address": "Av. Principal 123"
        })
    }

    pub fn doctor(id: Uuid, full_name: &str, specialty_id: Uuid, branch_id: Uuid) -> Value {
        json!({
            "id": id,
            "fullName": full_name,
            "specialtyId": specialty_id,
            "branchId": branch_id
        })
    }

    pub fn slot(time: &str, available: bool) -> Value {
        json!({
            "time": time,
            "available": available
        })
    }

    pub fn patient(id: Uuid, identifier: &str, first_name: &str, last_name: &str) -> Value {
        json!({
            "id": id,
            "identifier": identifier,
            "firstName": first_name,
            "lastName": last_name,
            "dateOfBirth": "1988-04-12",
            "phone": "+51 999 111 222",
            "email": null
        })
    }

    pub fn triage_question(id: i64, prompt: &str, kind: &str, required: bool, order: i32) -> Value {
        json!({
            "id": id,
            "prompt": prompt,
            "kind": kind,
            "options": [],
            "required": required,
            "order": order
        })
    }
}
