use std::net::TcpListener;

use actix_web::http::StatusCode;
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock,
    MockServer,
    ResponseTemplate,
};

use super::helpers::{api_for, api_for_url, assert_correctly_signed, post_request, received_json, API_KEY, API_SECRET};

#[actix_web::test]
async fn merchant_id_is_required() {
    let _ = env_logger::try_init().ok();
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;
    for route in ["/api/create-customer", "/api/provider-credentials", "/api/nonce-inquiry", "/api/charges"] {
        let body = json!({"apiKey": API_KEY, "apiSecret": API_SECRET, "terminalId": "T1", "nonce": "abc"});
        let (status, body) = post_request(api_for(&server), route, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{route}");
        assert_eq!(body, json!({"error": "Missing required parameters. merchantId is required."}), "{route}");
    }
    let signed_routes = [
        "/api/test-connection",
        "/api/create-customer",
        "/api/provider-credentials",
        "/api/nonce-inquiry",
        "/api/charges",
        "/api/proxy",
    ];
    for route in signed_routes {
        let body = json!({"merchantId": "M1", "terminalId": "T1", "nonce": "abc"});
        let (status, body) = post_request(api_for(&server), route, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{route}");
        assert_eq!(body, json!({"error": "Missing required parameters. Missing API credentials. apiKey is required."}));
        let body = json!({"apiKey": API_KEY, "merchantId": "M1", "nonce": "abc"});
        let (status, _) = post_request(api_for(&server), route, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{route}");
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[actix_web::test]
async fn create_customer() {
    let _ = env_logger::try_init().ok();
    let server = MockServer::start().await;
    let provider_body = json!({"customer": {"merchantCustomerId": "CUST-42", "providerCustomerId": "PCID-9"}});
    Mock::given(method("POST"))
        .and(path("/ch/payments-vas/v1/tokens"))
        .respond_with(ResponseTemplate::new(201).set_body_json(provider_body.clone()))
        .expect(1)
        .mount(&server)
        .await;
    let body = json!({
        "apiKey": API_KEY, "apiSecret": API_SECRET, "merchantId": "M1", "terminalId": "T1",
        "merchantCustomerId": "CUST-42"
    });
    let (status, body) = post_request(api_for(&server), "/api/create-customer", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "httpStatus": 201,
            "providerCustomerId": "PCID-9",
            "merchantCustomerId": "CUST-42",
            "data": provider_body
        })
    );
    let requests = server.received_requests().await.unwrap();
    assert_correctly_signed(&requests[0]);
    assert_eq!(
        String::from_utf8_lossy(&requests[0].body),
        r#"{"customer":{"merchantCustomerId":"CUST-42"},"merchantDetails":{"merchantId":"M1","terminalId":"T1"},"transactionDetails":{"tokenProvider":"FISERV_PAY_BY_BANK","operationType":"CREATE"}}"#
    );
}

#[actix_web::test]
async fn create_customer_generates_an_id() {
    let _ = env_logger::try_init().ok();
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(201).set_body_json(json!({}))).mount(&server).await;
    let body = json!({"apiKey": API_KEY, "apiSecret": API_SECRET, "merchantId": "M1"});
    let (status, body) = post_request(api_for(&server), "/api/create-customer", body).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["merchantCustomerId"].as_str().unwrap().starts_with("CUST-"));
    assert_eq!(body["providerCustomerId"], json!(null));
}

#[actix_web::test]
async fn provider_credentials_are_flattened() {
    let _ = env_logger::try_init().ok();
    let server = MockServer::start().await;
    let provider_body = json!({
        "providerCredentials": {
            "credentialType": "FISERV_PAY_BY_BANK",
            "attributes": [{"key": "publicKey", "value": "MIIB..."}, {"key": "configId", "value": "cfg-1"}]
        }
    });
    Mock::given(method("POST"))
        .and(path("/ch/payments-vas/v1/security/provider-credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(provider_body))
        .expect(1)
        .mount(&server)
        .await;
    let body = json!({
        "apiKey": API_KEY, "apiSecret": API_SECRET, "merchantId": "M1", "terminalId": "T1",
        "providerCustomerId": "PCID-9"
    });
    let (status, body) = post_request(api_for(&server), "/api/provider-credentials", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["credentials"], json!({"publicKey": "MIIB...", "configId": "cfg-1"}));
    let requests = server.received_requests().await.unwrap();
    assert_correctly_signed(&requests[0]);
    let attrs = received_json(&requests[0])["providerCredentials"]["attributes"].clone();
    assert_eq!(attrs.as_array().unwrap().len(), 3);
    assert_eq!(attrs[2], json!({"key": "tokenData", "value": "PCID-9"}));
}

#[actix_web::test]
async fn nonce_inquiry() {
    let _ = env_logger::try_init().ok();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ch/payments-vas/v1/tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"source": {"tokenData": "TOKEN-1"}})))
        .expect(1)
        .mount(&server)
        .await;
    let body = json!({
        "apiKey": API_KEY, "apiSecret": API_SECRET, "merchantId": "M1", "terminalId": "T1",
        "nonce": "n0nce", "merchantCustomerId": "CUST-42"
    });
    let (status, body) = post_request(api_for(&server), "/api/nonce-inquiry", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokenData"], "TOKEN-1");
    let sent = received_json(&server.received_requests().await.unwrap()[0]);
    assert_eq!(sent["source"]["tokenData"], "n0nce");
    assert_eq!(sent["customer"], json!({"merchantCustomerId": "CUST-42"}));
}

#[actix_web::test]
async fn nonce_inquiry_upstream_500() {
    let _ = env_logger::try_init().ok();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal error"))
        .expect(1)
        .mount(&server)
        .await;
    let body = json!({"apiKey": API_KEY, "apiSecret": API_SECRET, "merchantId": "M1", "nonce": "n0nce"});
    let (status, body) = post_request(api_for(&server), "/api/nonce-inquiry", body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "success": false,
            "httpStatus": 500,
            "data": null,
            "message": "Backend returned 500 error - nonce inquiry endpoint might not be available yet in cert"
        })
    );
}

#[actix_web::test]
async fn charge() {
    let _ = env_logger::try_init().ok();
    let server = MockServer::start().await;
    let provider_body = json!({"gatewayResponse": {"transactionState": "CAPTURED"}});
    Mock::given(method("POST"))
        .and(path("/ch/payments/v1/charges"))
        .respond_with(ResponseTemplate::new(201).set_body_json(provider_body.clone()))
        .expect(1)
        .mount(&server)
        .await;
    let body = json!({
        "apiKey": API_KEY, "apiSecret": API_SECRET, "merchantId": "M1", "terminalId": "T1",
        "amount": "25.10", "captureFlag": false, "providerCustomerId": "PCID-9",
        "source": {"sourceType": "PaymentToken", "tokenData": "TOKEN-1", "tokenSource": "FISERV_PAY_BY_BANK"}
    });
    let (status, body) = post_request(api_for(&server), "/api/charges", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "httpStatus": 201, "data": provider_body}));
    let requests = server.received_requests().await.unwrap();
    assert_correctly_signed(&requests[0]);
    let sent = received_json(&requests[0]);
    assert_eq!(sent["amount"], json!({"total": 25.1, "currency": "USD"}));
    assert_eq!(sent["source"]["tokenData"], "TOKEN-1");
    assert_eq!(sent["transactionDetails"], json!({"captureFlag": false}));
    assert_eq!(sent["customer"], json!({"providerCustomerId": "PCID-9"}));
}

#[actix_web::test]
async fn charge_upstream_500_with_garbage_body() {
    let _ = env_logger::try_init().ok();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&server)
        .await;
    let body = json!({"apiKey": API_KEY, "apiSecret": API_SECRET, "merchantId": "M1"});
    let (status, body) = post_request(api_for(&server), "/api/charges", body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["httpStatus"], 500);
    assert_eq!(body["data"], json!(null));
    assert_eq!(body["message"], "Request failed with status code 500. Internal Server Error");
}

#[actix_web::test]
async fn charge_upstream_rejection_keeps_status() {
    let _ = env_logger::try_init().ok();
    let server = MockServer::start().await;
    let error = json!({"error": [{"type": "GATEWAY", "code": "117", "message": "Invalid token"}]});
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_json(error.clone()))
        .mount(&server)
        .await;
    let body = json!({"apiKey": API_KEY, "apiSecret": API_SECRET, "merchantId": "M1"});
    let (status, body) = post_request(api_for(&server), "/api/charges", body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["httpStatus"], 422);
    assert_eq!(body["data"], error);
}

#[actix_web::test]
async fn charge_without_a_provider() {
    let _ = env_logger::try_init().ok();
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let body = json!({"apiKey": API_KEY, "apiSecret": API_SECRET, "merchantId": "M1"});
    let (status, body) = post_request(api_for_url(&format!("http://{addr}/ch")), "/api/charges", body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["httpStatus"], 0);
    assert_eq!(body["data"], json!(null));
    assert!(body["message"].as_str().unwrap().starts_with("Request failed: "));
}

#[actix_web::test]
async fn invalid_amount() {
    let _ = env_logger::try_init().ok();
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;
    let body = json!({"apiKey": API_KEY, "apiSecret": API_SECRET, "merchantId": "M1", "amount": "a lot"});
    let (status, _) = post_request(api_for(&server), "/api/charges", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
