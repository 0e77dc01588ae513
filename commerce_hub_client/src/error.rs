use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommerceHubError {
    #[error("Missing API credentials. {0} is required.")]
    MissingCredentials(&'static str),
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
    #[error("Invalid provider path {0}")]
    InvalidPath(String),
    #[error("Could not serialize payload: {0}")]
    Serialization(String),
    #[error("Request failed with status code {status}. {message}")]
    Upstream { status: u16, body: Option<Value>, message: String },
    #[error("Request failed: {0}")]
    Transport(String),
}

impl CommerceHubError {
    /// The provider's HTTP status for upstream rejections. Every failure that never got an HTTP response reports 0.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Upstream { status, .. } => *status,
            _ => 0,
        }
    }

    /// The provider's parsed JSON error body, if there was one.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Upstream { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}
