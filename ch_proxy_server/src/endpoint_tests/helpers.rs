use std::time::Duration;

use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use ch_common::Secret;
use commerce_hub_client::{CommerceHubApi, CommerceHubConfig, Credentials, RequestSigner};
use log::debug;
use serde_json::Value;
use wiremock::{MockServer, Request};

use crate::server::configure_routes;

pub const API_KEY: &str = "test-api-key";
pub const API_SECRET: &str = "test-api-secret";

pub fn api_for(server: &MockServer) -> CommerceHubApi {
    api_for_url(&format!("{}/ch", server.uri()))
}

pub fn api_for_url(base_url: &str) -> CommerceHubApi {
    CommerceHubApi::new(CommerceHubConfig::new(base_url, Duration::from_secs(5))).expect("Failed to create client")
}

pub async fn post_request(api: CommerceHubApi, path: &str, body: Value) -> (StatusCode, Value) {
    let app = App::new().app_data(web::Data::new(api)).configure(configure_routes);
    let service = test::init_service(app).await;
    let req = TestRequest::post().uri(path).set_json(body).to_request();
    debug!("Making request to {path}");
    let res = test::call_service(&service, req).await;
    let status = res.status();
    let body = test::read_body_json::<Value, _>(res).await;
    (status, body)
}

/// Check that the provider received a request whose `Authorization` header is the HMAC of exactly the bytes it got.
pub fn assert_correctly_signed(req: &Request) {
    let header = |name: &str| req.headers.get(name).expect("Missing header").to_str().unwrap().to_string();
    assert_eq!(header("Api-Key"), API_KEY);
    assert_eq!(header("Auth-Token-Type"), "HMAC");
    let creds = Credentials::new(API_KEY, Secret::new(API_SECRET.to_string())).unwrap();
    let body = (!req.body.is_empty()).then_some(req.body.as_slice());
    let expected = RequestSigner::new(&creds).signature(&header("Client-Request-Id"), &header("Timestamp"), body);
    assert_eq!(header("Authorization"), expected);
}

pub fn received_json(req: &Request) -> Value {
    serde_json::from_slice(&req.body).expect("Request body was not JSON")
}
