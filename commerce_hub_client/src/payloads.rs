//! Outbound payload shapes for the Commerce Hub endpoints used by the proxy.
//!
//! Key order matters: the payloads are signed as serialized, so fields are inserted in the order the provider's
//! examples use.
use chrono::Utc;
use serde_json::{json, Map, Value};

pub const CHARGES_PATH: &str = "/payments/v1/charges";
pub const TOKENS_PATH: &str = "/payments-vas/v1/tokens";
pub const PROVIDER_CREDENTIALS_PATH: &str = "/payments-vas/v1/security/provider-credentials";

pub const TOKEN_PROVIDER: &str = "FISERV_PAY_BY_BANK";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_CHARGE_AMOUNT: f64 = 1.00;
const TEST_CHARGE_AMOUNT: f64 = 0.01;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MerchantDetails {
    pub merchant_id: Option<String>,
    pub terminal_id: Option<String>,
}

impl MerchantDetails {
    pub fn new(merchant_id: Option<&str>, terminal_id: Option<&str>) -> Self {
        Self { merchant_id: merchant_id.map(String::from), terminal_id: terminal_id.map(String::from) }
    }

    /// The `merchantDetails` block. Unknown ids are left out rather than sent as `null`.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(id) = &self.merchant_id {
            map.insert("merchantId".into(), Value::String(id.clone()));
        }
        if let Some(id) = &self.terminal_id {
            map.insert("terminalId".into(), Value::String(id.clone()));
        }
        Value::Object(map)
    }
}

/// Customer identifiers. Either or both may be known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerRef {
    pub merchant_customer_id: Option<String>,
    pub provider_customer_id: Option<String>,
}

impl CustomerRef {
    pub fn new(merchant_customer_id: Option<&str>, provider_customer_id: Option<&str>) -> Self {
        Self {
            merchant_customer_id: non_empty(merchant_customer_id).map(String::from),
            provider_customer_id: non_empty(provider_customer_id).map(String::from),
        }
    }

    /// The `customer` block, or `None` if no identifiers are known.
    pub fn to_value(&self) -> Option<Value> {
        let mut map = Map::new();
        if let Some(id) = &self.merchant_customer_id {
            map.insert("merchantCustomerId".into(), Value::String(id.clone()));
        }
        if let Some(id) = &self.provider_customer_id {
            map.insert("providerCustomerId".into(), Value::String(id.clone()));
        }
        (!map.is_empty()).then_some(Value::Object(map))
    }
}

/// A zero-risk authorization (1 cent, not captured) used to check that a set of credentials authenticates.
pub fn test_charge(merchant: &MerchantDetails) -> Value {
    json!({
        "amount": { "total": TEST_CHARGE_AMOUNT, "currency": DEFAULT_CURRENCY },
        "source": {
            "sourceType": "PaymentCheck",
            "check": { "checkType": "PERSONAL", "accountNumber": "1234567890", "routingNumber": "021000021" }
        },
        "transactionDetails": { "captureFlag": false },
        "merchantDetails": merchant.to_value()
    })
}

pub fn default_merchant_customer_id() -> String {
    format!("CUST-{}", Utc::now().timestamp_millis())
}

pub fn create_customer(merchant_customer_id: &str, merchant: &MerchantDetails) -> Value {
    json!({
        "customer": { "merchantCustomerId": merchant_customer_id },
        "merchantDetails": merchant.to_value(),
        "transactionDetails": { "tokenProvider": TOKEN_PROVIDER, "operationType": "CREATE" }
    })
}

pub fn provider_credentials(
    merchant: &MerchantDetails,
    provider_customer_id: Option<&str>,
    config_id: Option<&str>,
) -> Value {
    let mut attributes = vec![attribute("publicKeyRequired", "true"), attribute("configIdRequired", "true")];
    if let Some(token) = non_empty(provider_customer_id) {
        attributes.push(attribute("tokenData", token));
    }
    if let Some(id) = non_empty(config_id) {
        attributes.push(attribute("configId", id));
    }
    json!({
        "providerCredentials": { "credentialType": TOKEN_PROVIDER, "attributes": attributes },
        "merchantDetails": merchant.to_value()
    })
}

/// Flatten the `providerCredentials.attributes` key/value list of a provider response into a single object.
pub fn extract_provider_credentials(response: &Value) -> Map<String, Value> {
    response["providerCredentials"]["attributes"]
        .as_array()
        .map(|attrs| {
            attrs
                .iter()
                .filter_map(|a| a["key"].as_str().map(|k| (k.to_string(), a["value"].clone())))
                .collect::<Map<String, Value>>()
        })
        .unwrap_or_default()
}

pub fn nonce_inquiry(nonce: &str, merchant: &MerchantDetails, customer: &CustomerRef) -> Value {
    let mut payload = json!({
        "source": { "sourceType": "PaymentToken", "tokenData": nonce, "tokenSource": TOKEN_PROVIDER },
        "merchantDetails": merchant.to_value()
    });
    insert_customer(&mut payload, customer);
    payload
}

/// The variable parts of a charge.
#[derive(Debug, Clone)]
pub struct ChargeParams {
    pub amount: f64,
    /// Overrides the default pay-by-bank token source.
    pub source: Option<Value>,
    pub capture_flag: bool,
}

impl Default for ChargeParams {
    fn default() -> Self {
        Self { amount: DEFAULT_CHARGE_AMOUNT, source: None, capture_flag: true }
    }
}

pub fn charge(params: &ChargeParams, merchant: &MerchantDetails, customer: &CustomerRef) -> Value {
    let source = params
        .source
        .clone()
        .unwrap_or_else(|| json!({ "sourceType": "PaymentToken", "tokenSource": TOKEN_PROVIDER }));
    let mut payload = json!({
        "amount": { "total": params.amount, "currency": DEFAULT_CURRENCY },
        "source": source,
        "transactionDetails": { "captureFlag": params.capture_flag },
        "merchantDetails": merchant.to_value(),
        "transactionInteraction": { "origin": "ECOM" }
    });
    insert_customer(&mut payload, customer);
    payload
}

/// Append a `merchantDetails` block to a caller-supplied payload, unless it already has one or no merchant id is
/// known. Payloads that are not JSON objects are returned untouched.
pub fn with_merchant_details(mut payload: Value, merchant: &MerchantDetails) -> Value {
    let has_details = !payload["merchantDetails"].is_null();
    if let (Value::Object(map), false, Some(_)) = (&mut payload, has_details, &merchant.merchant_id) {
        map.insert("merchantDetails".into(), merchant.to_value());
    }
    payload
}

fn insert_customer(payload: &mut Value, customer: &CustomerRef) {
    if let (Value::Object(map), Some(block)) = (payload, customer.to_value()) {
        map.insert("customer".into(), block);
    }
}

fn attribute(key: &str, value: &str) -> Value {
    json!({ "key": key, "value": value })
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}
