use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use commerce_hub_client::CommerceHubError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("Missing required parameters. {0}")]
    MissingParameters(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Commerce Hub call failed. {}", .0.message)]
    GatewayError(GatewayFailure),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameters(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::GatewayError(f) => f.response_status(),
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::GatewayError(f) => serde_json::to_string(f).unwrap_or_default(),
            _ => serde_json::json!({ "error": self.to_string() }).to_string(),
        };
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body)
    }
}

impl From<CommerceHubError> for ServerError {
    fn from(e: CommerceHubError) -> Self {
        match e {
            CommerceHubError::MissingCredentials(_) => Self::MissingParameters(e.to_string()),
            CommerceHubError::InvalidPath(_) => Self::InvalidRequestBody(e.to_string()),
            e => Self::GatewayError(GatewayFailure::from(e)),
        }
    }
}

/// The body returned to proxy clients when a Commerce Hub call fails.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayFailure {
    pub success: bool,
    /// The provider's status code, or 0 if no response was received.
    pub http_status: u16,
    pub data: Option<Value>,
    pub message: String,
}

impl GatewayFailure {
    pub fn with_message<S: Into<String>>(mut self, message: S) -> Self {
        self.message = message.into();
        self
    }

    /// Mirror the provider's status. Failures without a provider response become a 500.
    pub fn response_status(&self) -> StatusCode {
        match self.http_status {
            0 => StatusCode::INTERNAL_SERVER_ERROR,
            s => StatusCode::from_u16(s).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl From<CommerceHubError> for GatewayFailure {
    fn from(e: CommerceHubError) -> Self {
        Self { success: false, http_status: e.status_code(), data: e.body().cloned(), message: e.to_string() }
    }
}
