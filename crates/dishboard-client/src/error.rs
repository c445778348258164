use thiserror::Error;

/// Errors returned by the dishboard client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure talking to the REST API.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// The API answered with a non-success status.
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },
    /// Real-time channel failure.
    #[error("websocket error: {0}")]
    WebSocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid api url: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Message suitable for a user-facing notice.
    pub fn notice_text(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
