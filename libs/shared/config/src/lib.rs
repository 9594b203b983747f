use std::env;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub username: Option<String>,
    pub password: Option<String>,
    api_url_provided: bool,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            username: None,
            password: None,
            api_url_provided: true,
        }
    }

    pub fn from_env() -> Self {
        let (api_base_url, api_url_provided) = match env::var("CLINIC_API_URL") {
            Ok(url) if !url.trim().is_empty() => (url, true),
            _ => {
                warn!("CLINIC_API_URL not set, using default {}", DEFAULT_API_URL);
                (DEFAULT_API_URL.to_string(), false)
            }
        };

        let request_timeout_secs = match env::var("CLINIC_API_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout(&raw).unwrap_or_else(|| {
                warn!("CLINIC_API_TIMEOUT_SECS is not a positive integer ({}), using default", raw);
                DEFAULT_TIMEOUT_SECS
            }),
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let config = Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            request_timeout_secs,
            username: env::var("CLINIC_USERNAME").ok(),
            password: env::var("CLINIC_PASSWORD").ok(),
            api_url_provided,
        };

        if !config.is_configured() {
            warn!("Client not fully configured - missing environment variables");
        }

        config
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_url_provided && !self.api_base_url.is_empty()
    }

    pub fn has_credentials(&self) -> bool {
        matches!(
            (&self.username, &self.password),
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty()
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_timeout(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|secs| *secs > 0)
}
