use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Connection error: {0}")]
    Transport(String),

    #[error("Server error: {message}")]
    Server {
        status: Option<u16>,
        message: String,
    },

    #[error("Authentication error: {0}")]
    Unauthorized(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn server(message: impl Into<String>) -> Self {
        ClientError::Server {
            status: None,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    /// Plain text for the current screen. Server messages are passed through
    /// unchanged.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(_) => {
                "Unable to reach the clinic server. Check your connection and try again.".to_string()
            }
            ClientError::Server { message, .. } if message.trim().is_empty() => {
                "The server rejected the request.".to_string()
            }
            ClientError::Server { message, .. } => message.clone(),
            ClientError::Unauthorized(msg) if msg.trim().is_empty() => {
                "You are not authorized to perform this action.".to_string()
            }
            ClientError::Unauthorized(msg) => msg.clone(),
            ClientError::NotFound(msg) => msg.clone(),
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Decode(_) => {
                "The server sent a response this app could not read.".to_string()
            }
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
