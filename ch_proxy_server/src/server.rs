use std::time::Duration;

use actix_web::{
    dev::Server,
    http::KeepAlive,
    middleware::{Condition, Logger},
    web,
    App,
    HttpServer,
};
use commerce_hub_client::CommerceHubApi;
use log::*;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{charges, create_customer, health, nonce_inquiry, provider_credentials, proxy, test_connection},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let api = CommerceHubApi::new(config.commerce_hub.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🚀️ Forwarding requests to {} (timeout {:?})", config.commerce_hub.base_url, config.commerce_hub.timeout);
    let srv = create_server_instance(config, api)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, api: CommerceHubApi) -> Result<Server, ServerError> {
    let access_log = config.access_log;
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Condition::new(
                access_log,
                Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("chp::access_log"),
            ))
            .app_data(web::Data::new(api.clone()))
            .configure(configure_routes)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Registers the `/api` routes and the JSON error handling. The caller provides the [`CommerceHubApi`] as app data.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        debug!("💻️ Could not deserialize request body. {err}");
        ServerError::InvalidRequestBody(err.to_string()).into()
    });
    cfg.app_data(json_config).service(
        web::scope("/api")
            .service(health)
            .service(test_connection)
            .service(create_customer)
            .service(provider_credentials)
            .service(nonce_inquiry)
            .service(charges)
            .service(proxy),
    );
}
