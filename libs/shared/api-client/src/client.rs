use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::ClientConfig;
use shared_models::{ApiResponse, ClientError};

pub struct ClinicApiClient {
    client: Client,
    base_url: String,
}

impl ClinicApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::Unauthorized("Invalid session token".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, String), ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let headers = self.get_headers(auth_token)?;

        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await.map_err(transport_error)?;
        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        Ok((status, text))
    }

    /// Sends a request and returns the envelope's `data`, failing when the
    /// server answers with `success: false` or without data.
    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let (status, text) = self.send(method, path, auth_token, body).await?;
        let envelope: ApiResponse<T> = unwrap_envelope(status, &text)?;

        envelope
            .data
            .ok_or_else(|| ClientError::Decode(format!("Response from {} carried no data", path)))
    }

    /// Like `request`, but a 404 or a successful envelope with `data: null`
    /// yields `None` instead of an error.
    pub async fn request_optional<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<Option<T>, ClientError>
    where
        T: DeserializeOwned,
    {
        let (status, text) = self.send(method, path, auth_token, body).await?;

        if status == StatusCode::NOT_FOUND {
            debug!("{} returned 404", path);
            return Ok(None);
        }

        let envelope: ApiResponse<T> = unwrap_envelope(status, &text)?;
        Ok(envelope.data)
    }

    /// For endpoints whose `data` carries nothing the caller needs. Returns
    /// the server's message.
    pub async fn request_ack(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<String, ClientError> {
        let (status, text) = self.send(method, path, auth_token, body).await?;
        let envelope: ApiResponse<Value> = unwrap_envelope(status, &text)?;
        Ok(envelope.message)
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

fn transport_error(err: reqwest::Error) -> ClientError {
    if err.is_decode() {
        ClientError::Decode(err.to_string())
    } else {
        ClientError::Transport(err.to_string())
    }
}

fn unwrap_envelope<T>(status: StatusCode, text: &str) -> Result<ApiResponse<T>, ClientError>
where
    T: DeserializeOwned,
{
    if !status.is_success() {
        let message = error_message(text);
        error!("API error ({}): {}", status, message);

        return Err(match status.as_u16() {
            401 | 403 => ClientError::Unauthorized(message),
            404 => ClientError::NotFound(message),
            code => ClientError::Server {
                status: Some(code),
                message,
            },
        });
    }

    let envelope: ApiResponse<T> = serde_json::from_str(text)?;

    if !envelope.success {
        error!("API rejected request ({}): {}", status, envelope.message);
        return Err(ClientError::Server {
            status: Some(status.as_u16()),
            message: envelope.message,
        });
    }

    Ok(envelope)
}

/// Pulls the envelope message out of an error body, falling back to the raw
/// text when the body is not an envelope.
fn error_message(text: &str) -> String {
    serde_json::from_str::<ApiResponse<Value>>(text)
        .map(|envelope| envelope.message)
        .ok()
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| text.trim().to_string())
}
