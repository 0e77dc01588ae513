use actix_web::{http::StatusCode, test, test::TestRequest, App};
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock,
    MockServer,
    ResponseTemplate,
};

use super::helpers::{api_for, assert_correctly_signed, post_request, received_json, API_KEY, API_SECRET};
use crate::server::configure_routes;

async fn provider_answers(status: u16, body: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ch/payments/v1/charges"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[actix_web::test]
async fn health_check() {
    let _ = env_logger::try_init().ok();
    let app = test::init_service(App::new().configure(configure_routes)).await;
    let req = TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "running");
    assert!(body["time"].as_str().unwrap().ends_with('Z'));
}

#[actix_web::test]
async fn missing_credentials_never_reach_the_provider() {
    let _ = env_logger::try_init().ok();
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;
    let (status, body) = post_request(api_for(&server), "/api/test-connection", json!({"apiKey": API_KEY})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing required parameters. Missing API credentials. apiSecret is required."}));
    let (status, _) =
        post_request(api_for(&server), "/api/test-connection", json!({"apiKey": "", "apiSecret": API_SECRET})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[actix_web::test]
async fn malformed_bodies_are_rejected() {
    let _ = env_logger::try_init().ok();
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;
    let (status, body) = post_request(api_for(&server), "/api/test-connection", json!({"apiKey": 42})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Could not read request body"));
}

#[actix_web::test]
async fn mistyped_secrets_are_not_echoed() {
    let _ = env_logger::try_init().ok();
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;
    for route in ["/api/test-connection", "/api/charges", "/api/proxy"] {
        let body = json!({"apiKey": API_KEY, "apiSecret": 918273645, "merchantId": "M1"});
        let (status, body) = post_request(api_for(&server), route, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{route}");
        let error = body["error"].as_str().unwrap();
        assert!(error.starts_with("Could not read request body"), "{error}");
        assert!(!error.contains("918273645"), "{error}");
    }
}

#[actix_web::test]
async fn accepted_test_charge() {
    let _ = env_logger::try_init().ok();
    let server = provider_answers(201, json!({"gatewayResponse": {"transactionState": "AUTHORIZED"}})).await;
    let body = json!({"apiKey": API_KEY, "apiSecret": API_SECRET, "merchantId": "M1", "terminalId": "T1"});
    let (status, body) = post_request(api_for(&server), "/api/test-connection", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "httpStatus": 201,
            "rawResponse": {"gatewayResponse": {"transactionState": "AUTHORIZED"}}
        })
    );
    let requests = server.received_requests().await.unwrap();
    assert_correctly_signed(&requests[0]);
    let sent = received_json(&requests[0]);
    assert_eq!(sent["amount"], json!({"total": 0.01, "currency": "USD"}));
    assert_eq!(sent["merchantDetails"], json!({"merchantId": "M1", "terminalId": "T1"}));
}

#[actix_web::test]
async fn business_rejection_means_the_credentials_work() {
    let _ = env_logger::try_init().ok();
    let error = json!({"error": [{"type": "HOST", "message": "Invalid routing number"}]});
    let server = provider_answers(400, error.clone()).await;
    let body = json!({"apiKey": API_KEY, "apiSecret": API_SECRET, "merchantId": "M1", "terminalId": "T1"});
    let (status, body) = post_request(api_for(&server), "/api/test-connection", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["note"], "Credentials authenticated. Business rejection expected for test.");
    assert_eq!(body["httpStatus"], 400);
    assert_eq!(body["rawResponse"], error);
    assert_eq!(body["errorMessage"], "Request failed with status code 400. Bad Request");
}

#[actix_web::test]
async fn unauthorized_credentials() {
    let _ = env_logger::try_init().ok();
    let server = provider_answers(401, json!({"error": [{"type": "GATEWAY", "message": "Unauthorized"}]})).await;
    let body = json!({"apiKey": API_KEY, "apiSecret": API_SECRET});
    let (status, body) = post_request(api_for(&server), "/api/test-connection", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["note"], "Could not authenticate.");
    assert_eq!(body["httpStatus"], 401);
}
