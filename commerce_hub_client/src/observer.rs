use log::*;
use reqwest::Method;
use serde_json::Value;

use crate::CommerceHubError;

/// Receives notifications about outbound Commerce Hub calls. The default implementations do nothing, so
/// implementors only override the events they care about.
pub trait GatewayObserver: Send + Sync {
    fn on_request(&self, _method: &Method, _url: &str) {}

    fn on_response(&self, _path: &str, _status: u16, _body: &Value) {}

    fn on_failure(&self, _path: &str, _error: &CommerceHubError) {}
}

/// Writes gateway activity to the `log` facade. Target paths are logged at `info`; bodies at `debug`, since they are
/// only useful when diagnosing integration issues.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl GatewayObserver for LogObserver {
    fn on_request(&self, method: &Method, url: &str) {
        info!("💳️ {method} {url}");
    }

    fn on_response(&self, path: &str, status: u16, body: &Value) {
        debug!("💳️ [{path}] {status} response: {body:#}");
    }

    fn on_failure(&self, path: &str, error: &CommerceHubError) {
        match error.body() {
            Some(body) => warn!("💳️ [{path}] error: {error} {body}"),
            None => warn!("💳️ [{path}] error: {error}"),
        }
    }
}
