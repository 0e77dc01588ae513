//! # Commerce Hub signing proxy
//! This crate hosts the server side of the Commerce Hub integration. It is responsible for:
//! Accepting JSON requests that carry a merchant's Commerce Hub credentials.
//! Building the provider payload for each operation.
//! Signing and forwarding the call to Commerce Hub, and mapping the provider's answer back to the caller.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/api/health`: A health check route.
//! * `/api/test-connection`: Checks that a set of credentials authenticates.
//! * `/api/create-customer`, `/api/provider-credentials`, `/api/nonce-inquiry`, `/api/charges`: The pay-by-bank flow.
//! * `/api/proxy`: A generic signed passthrough.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod policy;
pub mod routes;
pub mod server;
