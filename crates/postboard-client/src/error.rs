use thiserror::Error;

/// A response body that does not match the expected envelope.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response reported success but carried no data")]
    MissingData,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The server answered `success: false`.
    #[error("rejected by server: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },
}

impl ClientError {
    /// Server-provided message of an application-level rejection.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Rejected { message } => message.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AccountError {
    /// No user in the session; the controller has already asked to navigate to login.
    #[error("no authenticated user")]
    NotAuthenticated,

    #[error(transparent)]
    Client(#[from] ClientError),
}
