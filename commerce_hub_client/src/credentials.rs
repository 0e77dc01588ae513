use ch_common::Secret;

use crate::CommerceHubError;

/// A Commerce Hub API key and secret. Both are validated as non-empty on construction, so any `Credentials` value can
/// be used to sign a request.
#[derive(Debug, Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: Secret<String>,
}

impl Credentials {
    pub fn new<K: Into<String>>(api_key: K, api_secret: Secret<String>) -> Result<Self, CommerceHubError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CommerceHubError::MissingCredentials("apiKey"));
        }
        if api_secret.reveal().is_empty() {
            return Err(CommerceHubError::MissingCredentials("apiSecret"));
        }
        Ok(Self { api_key, api_secret })
    }

    /// Build credentials from optional inputs, as they arrive in an inbound request body.
    pub fn from_parts(api_key: Option<&str>, api_secret: Option<&Secret<String>>) -> Result<Self, CommerceHubError> {
        let api_key = api_key.ok_or(CommerceHubError::MissingCredentials("apiKey"))?;
        let api_secret = api_secret.ok_or(CommerceHubError::MissingCredentials("apiSecret"))?;
        Self::new(api_key, api_secret.clone())
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &Secret<String> {
        &self.api_secret
    }
}
