use std::env;

use ch_common::{env_flag, env_or_default};
use commerce_hub_client::CommerceHubConfig;
use log::*;

const DEFAULT_CHP_HOST: &str = "0.0.0.0";
const DEFAULT_CHP_PORT: u16 = 3000;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// If true, every inbound request is written to the `chp::access_log` log target.
    pub access_log: bool,
    /// Where, and how patiently, to call Commerce Hub.
    pub commerce_hub: CommerceHubConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CHP_HOST.to_string(),
            port: DEFAULT_CHP_PORT,
            access_log: true,
            commerce_hub: CommerceHubConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CHP_HOST").ok().unwrap_or_else(|| DEFAULT_CHP_HOST.into());
        // PORT is honoured for hosting platforms that assign one. CHP_PORT wins if both are set.
        let port_var = if env::var("CHP_PORT").is_ok() { "CHP_PORT" } else { "PORT" };
        let port = env_or_default(port_var, DEFAULT_CHP_PORT);
        let access_log = env_flag("CHP_ACCESS_LOG", true);
        let commerce_hub = CommerceHubConfig::new_from_env_or_default();
        if !commerce_hub.base_url.starts_with("https://") {
            warn!("🚨️ Commerce Hub base URL {} is not using TLS. Do not do this in production.", commerce_hub.base_url);
        }
        Self { host, port, access_log, commerce_hub }
    }
}
