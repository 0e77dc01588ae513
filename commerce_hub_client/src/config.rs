use std::time::Duration;

use ch_common::env_or_default;
use log::*;
use reqwest::Url;

use crate::CommerceHubError;

/// The Commerce Hub certification environment.
pub const DEFAULT_BASE_URL: &str = "https://connect-cert.fiservapis.com/ch";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct CommerceHubConfig {
    /// Prefix for every provider path, e.g. `https://connect-cert.fiservapis.com/ch`. No trailing slash.
    pub base_url: String,
    /// Upper bound on a single outbound call, including connecting and reading the body.
    pub timeout: Duration,
}

impl Default for CommerceHubConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS) }
    }
}

impl CommerceHubConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), timeout }
    }

    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("CHP_BASE_URL").unwrap_or_else(|_| {
            info!("🪛️ CHP_BASE_URL not set, using the certification host {DEFAULT_BASE_URL}");
            DEFAULT_BASE_URL.to_string()
        });
        let timeout_secs = env_or_default("CHP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        Self::new(&base_url, Duration::from_secs(timeout_secs))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Parse `base_url + path`, refusing any path that resolves outside the base path once dot segments
    /// (including percent-encoded ones such as `%2e%2e`) are normalized.
    pub fn resolve(&self, path: &str) -> Result<Url, CommerceHubError> {
        let invalid = |reason: &str| CommerceHubError::InvalidPath(format!("{path}: {reason}"));
        let base = Url::parse(&self.base_url).map_err(|e| invalid(&format!("bad base URL. {e}")))?;
        let url = Url::parse(&self.url(path)).map_err(|e| invalid(&e.to_string()))?;
        let base_path = base.path().trim_end_matches('/');
        let inside = url.path() == base_path || url.path().starts_with(&format!("{base_path}/"));
        if url.origin() != base.origin() || !inside {
            return Err(invalid("resolves outside the Commerce Hub base URL"));
        }
        Ok(url)
    }
}
