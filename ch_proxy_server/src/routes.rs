//! Request handler definitions
//!
//! Every route takes a JSON body carrying the caller's Commerce Hub credentials (`apiKey`, `apiSecret`) and, for most
//! routes, merchant details (`merchantId`, `terminalId`). Credentials are validated before anything is signed; a
//! request with missing credentials never reaches the provider.
//!
//! Handlers map the inbound body to a provider payload (see [`commerce_hub_client::payloads`]), hand it to
//! [`CommerceHubApi`] and map the result back. Keep them that thin.
use actix_web::{get, http::Method, post, web, HttpResponse, Responder};
use chrono::{SecondsFormat, Utc};
use commerce_hub_client::{
    payloads::{self, CHARGES_PATH, PROVIDER_CREDENTIALS_PATH, TOKENS_PATH},
    CommerceHubApi,
    CommerceHubError,
};
use log::*;
use serde_json::{json, Value};

use crate::{
    data_objects::{
        ChargeRequest,
        ConnectionTestResult,
        CreateCustomerRequest,
        HealthStatus,
        MerchantAuth,
        NonceInquiryRequest,
        ProviderCredentialsRequest,
        ProxyRequest,
    },
    errors::{GatewayFailure, ServerError},
    policy::classify_test_charge,
};

const DEFAULT_PROXY_ENDPOINT: &str = CHARGES_PATH;

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    let time = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    HttpResponse::Ok().json(HealthStatus { status: "running", time })
}

//----------------------------------------------   Connection test  ----------------------------------------------------
/// Route handler for the test-connection endpoint
///
/// Sends a one-cent, uncaptured check charge and reports whether the credentials were accepted. Commerce Hub will
/// usually reject the charge itself; see [`crate::policy`] for how the rejection is interpreted.
///
/// Always answers 200 once the credentials are present. The verdict is in the `success` field.
#[post("/test-connection")]
pub async fn test_connection(
    body: web::Json<MerchantAuth>,
    api: web::Data<CommerceHubApi>,
) -> Result<HttpResponse, ServerError> {
    let auth = body.into_inner();
    let credentials = auth.credentials()?;
    debug!("💻️ POST test-connection for merchant {:?}", auth.merchant_id);
    let payload = payloads::test_charge(&auth.merchant_details());
    let result = match api.post(CHARGES_PATH, &credentials, &payload).await {
        Ok(response) => ConnectionTestResult {
            success: true,
            note: None,
            http_status: response.status_code,
            raw_response: response.body,
            error_message: None,
        },
        Err(e) => {
            let verdict = classify_test_charge(e.status_code());
            info!("💻️ Test charge failed with status {}. {verdict:?}", e.status_code());
            ConnectionTestResult {
                success: verdict.credentials_ok(),
                note: Some(verdict.note()),
                http_status: e.status_code(),
                raw_response: e.body().cloned().unwrap_or(Value::Null),
                error_message: Some(e.to_string()),
            }
        },
    };
    Ok(HttpResponse::Ok().json(result))
}

//----------------------------------------------   Customers  ----------------------------------------------------
/// Route handler for the create-customer endpoint
///
/// Registers a pay-by-bank customer with Commerce Hub. If the request does not carry a `merchantCustomerId`, one is
/// generated from the current time.
#[post("/create-customer")]
pub async fn create_customer(
    body: web::Json<CreateCustomerRequest>,
    api: web::Data<CommerceHubApi>,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    let credentials = req.auth.merchant_credentials()?;
    let merchant_customer_id = req
        .merchant_customer_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(payloads::default_merchant_customer_id);
    debug!("💻️ POST create-customer for {merchant_customer_id}");
    let payload = payloads::create_customer(&merchant_customer_id, &req.auth.merchant_details());
    let response = api.post(TOKENS_PATH, &credentials, &payload).await?;
    let provider_customer_id = response.body["customer"]["providerCustomerId"].clone();
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "httpStatus": response.status_code,
        "providerCustomerId": provider_customer_id,
        "merchantCustomerId": merchant_customer_id,
        "data": response.body
    })))
}

//----------------------------------------------   Provider credentials  ----------------------------------------------
/// Route handler for the provider-credentials endpoint
///
/// Negotiates the credentials the pay-by-bank front end needs. The provider returns them as a key/value attribute
/// list, which is flattened into the `credentials` object of the response.
#[post("/provider-credentials")]
pub async fn provider_credentials(
    body: web::Json<ProviderCredentialsRequest>,
    api: web::Data<CommerceHubApi>,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    let credentials = req.auth.merchant_credentials()?;
    debug!("💻️ POST provider-credentials for merchant {:?}", req.auth.merchant_id);
    let payload = payloads::provider_credentials(
        &req.auth.merchant_details(),
        req.provider_customer_id.as_deref(),
        req.config_id.as_deref(),
    );
    let response = api.post(PROVIDER_CREDENTIALS_PATH, &credentials, &payload).await?;
    let creds = payloads::extract_provider_credentials(&response.body);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "httpStatus": response.status_code,
        "credentials": creds,
        "data": response.body
    })))
}

//----------------------------------------------   Nonce inquiry  ----------------------------------------------------
/// Route handler for the nonce-inquiry endpoint
///
/// Exchanges the one-time nonce produced by the pay-by-bank front end for a reusable payment token.
#[post("/nonce-inquiry")]
pub async fn nonce_inquiry(
    body: web::Json<NonceInquiryRequest>,
    api: web::Data<CommerceHubApi>,
) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    let credentials = req.auth.merchant_credentials()?;
    let nonce = req.nonce()?;
    debug!("💻️ POST nonce-inquiry for merchant {:?}", req.auth.merchant_id);
    let payload = payloads::nonce_inquiry(nonce, &req.auth.merchant_details(), &req.customer());
    let response = api.post(TOKENS_PATH, &credentials, &payload).await.map_err(nonce_inquiry_failure)?;
    let token_data = response.body["source"]["tokenData"].clone();
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "httpStatus": response.status_code,
        "tokenData": token_data,
        "data": response.body
    })))
}

fn nonce_inquiry_failure(e: CommerceHubError) -> ServerError {
    match e {
        CommerceHubError::Upstream { status: 500, .. } => ServerError::GatewayError(
            GatewayFailure::from(e)
                .with_message("Backend returned 500 error - nonce inquiry endpoint might not be available yet in cert"),
        ),
        e => e.into(),
    }
}

//----------------------------------------------   Charges  ----------------------------------------------------
/// Route handler for the charges endpoint
///
/// Charges `amount` USD (default 1.00) against `source` (default: the pay-by-bank token source).
#[post("/charges")]
pub async fn charges(body: web::Json<ChargeRequest>, api: web::Data<CommerceHubApi>) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    let credentials = req.auth.merchant_credentials()?;
    let params = req.charge_params()?;
    debug!("💻️ POST charges for {} USD", params.amount);
    let payload = payloads::charge(&params, &req.auth.merchant_details(), &req.customer());
    let response = api.post(CHARGES_PATH, &credentials, &payload).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "httpStatus": response.status_code, "data": response.body })))
}

//----------------------------------------------   Proxy  ----------------------------------------------------
/// Route handler for the generic signed passthrough
///
/// Signs and forwards `payload` to any Commerce Hub `endpoint` (default `/payments/v1/charges`). `method` may be
/// `GET` or `POST` (the default); GET requests are signed and sent without a body. If the payload has no
/// `merchantDetails`, they are filled in from `merchantId` and `terminalId`.
#[post("/proxy")]
pub async fn proxy(body: web::Json<ProxyRequest>, api: web::Data<CommerceHubApi>) -> Result<HttpResponse, ServerError> {
    let req = body.into_inner();
    let credentials = req.auth.credentials()?;
    let endpoint = proxy_endpoint(req.endpoint.as_deref())?;
    let method = proxy_method(req.method.as_deref())?;
    debug!("💻️ POST proxy {method} {endpoint}");
    let response = if method == Method::GET {
        api.get(endpoint, &credentials).await?
    } else {
        let payload = req.payload.filter(|p| !p.is_null()).unwrap_or_else(|| json!({}));
        let payload = payloads::with_merchant_details(payload, &req.auth.merchant_details());
        api.post(endpoint, &credentials, &payload).await?
    };
    Ok(HttpResponse::Ok().json(json!({ "success": true, "httpStatus": response.status_code, "data": response.body })))
}

fn proxy_endpoint(endpoint: Option<&str>) -> Result<&str, ServerError> {
    match endpoint.filter(|e| !e.is_empty()) {
        None => Ok(DEFAULT_PROXY_ENDPOINT),
        Some(e) if e.starts_with('/') && !e.split('/').any(is_dot_segment) => Ok(e),
        Some(e) => Err(ServerError::InvalidRequestBody(format!(
            "Invalid endpoint: {e}. Endpoints are paths relative to the Commerce Hub base URL and must start with '/'."
        ))),
    }
}

/// `.` or `..`, including percent-encoded forms, which URL parsers normalize the same way.
fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}

fn proxy_method(method: Option<&str>) -> Result<Method, ServerError> {
    match method.map(|m| m.trim().to_ascii_uppercase()).as_deref() {
        None | Some("") | Some("POST") => Ok(Method::POST),
        Some("GET") => Ok(Method::GET),
        Some(m) => Err(ServerError::InvalidRequestBody(format!("Unsupported method: {m}. Use GET or POST."))),
    }
}
