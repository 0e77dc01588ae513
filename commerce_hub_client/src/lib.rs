//! # Commerce Hub client
//!
//! Signs and dispatches requests to the Fiserv Commerce Hub API.
//!
//! Every request carries a set of authentication headers derived from an HMAC-SHA256 over
//! `api_key ++ client_request_id ++ timestamp ++ body`. See [`RequestSigner`] for the details and
//! [`CommerceHubApi`] for the dispatch side.
mod api;
mod config;
mod credentials;
mod error;
mod observer;
pub mod payloads;
mod signer;

pub use api::{CommerceHubApi, GatewayResponse};
pub use config::{CommerceHubConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use credentials::Credentials;
pub use error::CommerceHubError;
pub use observer::{GatewayObserver, LogObserver};
pub use signer::{RequestSigner, SignedHeaders, SignedRequest};
