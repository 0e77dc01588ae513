use std::{error::Error, sync::Arc};

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde_json::Value;

use crate::{
    config::CommerceHubConfig,
    observer::{GatewayObserver, LogObserver},
    signer::{RequestSigner, SignedHeaders},
    CommerceHubError,
    Credentials,
};

/// A successful (2xx) provider response.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status_code: u16,
    /// The parsed JSON body, or `Null` if the body was empty or not JSON.
    pub body: Value,
}

/// Signs and dispatches requests to Commerce Hub.
///
/// Holds no per-request state: every call signs with a fresh timestamp and client request id, so a single instance
/// can be shared freely between workers.
#[derive(Clone)]
pub struct CommerceHubApi {
    config: CommerceHubConfig,
    client: Arc<Client>,
    observer: Arc<dyn GatewayObserver>,
}

impl CommerceHubApi {
    pub fn new(config: CommerceHubConfig) -> Result<Self, CommerceHubError> {
        Self::new_with_observer(config, Arc::new(LogObserver))
    }

    pub fn new_with_observer(
        config: CommerceHubConfig,
        observer: Arc<dyn GatewayObserver>,
    ) -> Result<Self, CommerceHubError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CommerceHubError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client), observer })
    }

    pub async fn post(
        &self,
        path: &str,
        credentials: &Credentials,
        payload: &Value,
    ) -> Result<GatewayResponse, CommerceHubError> {
        self.call(Method::POST, path, credentials, Some(payload)).await
    }

    pub async fn get(&self, path: &str, credentials: &Credentials) -> Result<GatewayResponse, CommerceHubError> {
        self.call(Method::GET, path, credentials, None).await
    }

    /// Sign and send a single request to `base_url + path`.
    ///
    /// The payload, if any, is serialized once. The signature covers exactly those bytes, and exactly those bytes are
    /// sent as the request body. Non-2xx responses come back as [`CommerceHubError::Upstream`]; failures without a
    /// response (connect errors, timeouts) as [`CommerceHubError::Transport`], with a status code of 0. Paths that
    /// would resolve outside the configured base URL are refused with [`CommerceHubError::InvalidPath`] before
    /// anything is signed.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        credentials: &Credentials,
        payload: Option<&Value>,
    ) -> Result<GatewayResponse, CommerceHubError> {
        let result = self.dispatch(method, path, credentials, payload).await;
        match &result {
            Ok(response) => self.observer.on_response(path, response.status_code, &response.body),
            Err(e) => self.observer.on_failure(path, e),
        }
        result
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        credentials: &Credentials,
        payload: Option<&Value>,
    ) -> Result<GatewayResponse, CommerceHubError> {
        let url = self.config.resolve(path)?;
        let body = payload
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| CommerceHubError::Serialization(e.to_string()))?;
        let signed = RequestSigner::new(credentials).sign(body.as_deref());
        trace!("💳️ Signed request {} for {path}", signed.request().request_id);
        let headers = header_map(&signed)?;
        self.observer.on_request(&method, url.as_str());
        let mut req = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            req = req.body(body);
        }
        let response = req.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await.map_err(transport_error)?;
            Ok(GatewayResponse { status_code: status.as_u16(), body: parse_body(&bytes).unwrap_or(Value::Null) })
        } else {
            let body = response.bytes().await.ok().and_then(|b| parse_body(&b));
            let message = status.canonical_reason().unwrap_or("Unknown status").to_string();
            Err(CommerceHubError::Upstream { status: status.as_u16(), body, message })
        }
    }
}

fn header_map(signed: &SignedHeaders) -> Result<HeaderMap, CommerceHubError> {
    let mut headers = HeaderMap::with_capacity(6);
    for (name, value) in signed.pairs() {
        let val = HeaderValue::from_str(value).map_err(|e| CommerceHubError::InvalidHeader(format!("{name}: {e}")))?;
        headers.insert(name, val);
    }
    Ok(headers)
}

/// reqwest's own message only says which request failed. The cause (refused, reset, timed out) is further down the
/// source chain.
fn transport_error(e: reqwest::Error) -> CommerceHubError {
    let mut message = if e.is_timeout() { format!("timeout: {e}") } else { e.to_string() };
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    CommerceHubError::Transport(message)
}

fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    serde_json::from_slice(bytes)
        .map_err(|e| debug!("💳️ Response body is not valid JSON. {e}"))
        .ok()
}
