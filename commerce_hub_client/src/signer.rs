//! HMAC-SHA256 request signing for Commerce Hub.
//!
//! The canonical string is the plain concatenation
//!
//! ```text
//! api_key ++ client_request_id ++ timestamp ++ [compact JSON body]
//! ```
//!
//! keyed with the raw UTF-8 bytes of the API secret. The digest is sent base64-encoded in the `Authorization` header,
//! alongside the other inputs so that the provider can recompute it. The body part is omitted for requests that carry
//! no payload (GET).
//!
//! The body bytes are signed as given. The provider derives the signature from the bytes it receives, so callers must
//! sign exactly the bytes they transmit and never re-serialize (or re-order the keys of) the payload in between.
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::{thread_rng, RngCore};
use sha2::Sha256;

use crate::Credentials;

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_API_KEY: &str = "Api-Key";
pub const HEADER_TIMESTAMP: &str = "Timestamp";
pub const HEADER_CLIENT_REQUEST_ID: &str = "Client-Request-Id";
pub const HEADER_AUTH_TOKEN_TYPE: &str = "Auth-Token-Type";
pub const HEADER_AUTHORIZATION: &str = "Authorization";

/// The per-call signing inputs and their result. Never reused across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// Milliseconds since the Unix epoch, in decimal.
    pub timestamp: String,
    /// `{timestamp}-{8 hex chars}`
    pub request_id: String,
    /// Base64 (standard alphabet, padded) HMAC-SHA256 digest.
    pub signature: String,
}

/// The full set of authentication headers for a single request.
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    api_key: String,
    request: SignedRequest,
}

impl SignedHeaders {
    pub fn request(&self) -> &SignedRequest {
        &self.request
    }

    /// The header name/value pairs, in the order Commerce Hub documents them.
    pub fn pairs(&self) -> [(&'static str, &str); 6] {
        [
            (HEADER_CONTENT_TYPE, "application/json"),
            (HEADER_API_KEY, self.api_key.as_str()),
            (HEADER_TIMESTAMP, self.request.timestamp.as_str()),
            (HEADER_CLIENT_REQUEST_ID, self.request.request_id.as_str()),
            (HEADER_AUTH_TOKEN_TYPE, "HMAC"),
            (HEADER_AUTHORIZATION, self.request.signature.as_str()),
        ]
    }
}

/// Request signer for authenticated Commerce Hub calls.
pub struct RequestSigner<'a> {
    credentials: &'a Credentials,
}

impl<'a> RequestSigner<'a> {
    pub fn new(credentials: &'a Credentials) -> Self {
        Self { credentials }
    }

    /// Compute the base64 HMAC-SHA256 signature for the given inputs. Deterministic: no clock, no randomness.
    pub fn signature(&self, request_id: &str, timestamp: &str, payload: Option<&[u8]>) -> String {
        let mut mac = HmacSha256::new_from_slice(self.credentials.api_secret().reveal().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(self.credentials.api_key().as_bytes());
        mac.update(request_id.as_bytes());
        mac.update(timestamp.as_bytes());
        if let Some(body) = payload {
            mac.update(body);
        }
        base64::encode(mac.finalize().into_bytes())
    }

    /// Sign a request using the current time and a fresh random request id.
    ///
    /// `payload` is the exact serialized body that will be sent, or `None` for requests without a body.
    pub fn sign(&self, payload: Option<&[u8]>) -> SignedHeaders {
        let timestamp = new_timestamp();
        let request_id = new_request_id(&timestamp);
        self.sign_at(timestamp, request_id, payload)
    }

    /// Sign a request with caller-supplied timestamp and request id.
    pub fn sign_at(&self, timestamp: String, request_id: String, payload: Option<&[u8]>) -> SignedHeaders {
        let signature = self.signature(&request_id, &timestamp, payload);
        SignedHeaders {
            api_key: self.credentials.api_key().to_string(),
            request: SignedRequest { timestamp, request_id, signature },
        }
    }
}

pub fn new_timestamp() -> String {
    Utc::now().timestamp_millis().to_string()
}

pub fn new_request_id(timestamp: &str) -> String {
    let mut suffix = [0u8; 4];
    thread_rng().fill_bytes(&mut suffix);
    let hex = suffix.iter().map(|b| format!("{b:02x}")).collect::<String>();
    format!("{timestamp}-{hex}")
}
