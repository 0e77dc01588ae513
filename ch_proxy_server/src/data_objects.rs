use ch_common::Secret;
use commerce_hub_client::{
    payloads::{ChargeParams, CustomerRef, MerchantDetails, DEFAULT_CHARGE_AMOUNT},
    Credentials,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ServerError;

/// The authentication and merchant fields that every proxy request carries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantAuth {
    pub api_key: Option<String>,
    pub api_secret: Option<Secret<String>>,
    pub merchant_id: Option<String>,
    pub terminal_id: Option<String>,
}

impl MerchantAuth {
    pub fn credentials(&self) -> Result<Credentials, ServerError> {
        Ok(Credentials::from_parts(self.api_key.as_deref(), self.api_secret.as_ref())?)
    }

    /// Credentials, for routes that also need a merchant id.
    pub fn merchant_credentials(&self) -> Result<Credentials, ServerError> {
        let credentials = self.credentials()?;
        match self.merchant_id.as_deref() {
            Some(id) if !id.trim().is_empty() => Ok(credentials),
            _ => Err(ServerError::MissingParameters("merchantId is required.".into())),
        }
    }

    pub fn merchant_details(&self) -> MerchantDetails {
        MerchantDetails::new(self.merchant_id.as_deref(), self.terminal_id.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    #[serde(flatten)]
    pub auth: MerchantAuth,
    pub merchant_customer_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCredentialsRequest {
    #[serde(flatten)]
    pub auth: MerchantAuth,
    pub provider_customer_id: Option<String>,
    pub config_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonceInquiryRequest {
    #[serde(flatten)]
    pub auth: MerchantAuth,
    pub nonce: Option<String>,
    pub merchant_customer_id: Option<String>,
    pub provider_customer_id: Option<String>,
}

impl NonceInquiryRequest {
    pub fn nonce(&self) -> Result<&str, ServerError> {
        self.nonce
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ServerError::MissingParameters("nonce is required.".into()))
    }

    pub fn customer(&self) -> CustomerRef {
        CustomerRef::new(self.merchant_customer_id.as_deref(), self.provider_customer_id.as_deref())
    }
}

/// Amounts arrive either as JSON numbers or as decimal strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    pub fn value(&self) -> Result<f64, ServerError> {
        let value = match self {
            Amount::Number(n) => *n,
            Amount::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| ServerError::InvalidRequestBody(format!("Invalid amount: {s}. {e}")))?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ServerError::InvalidRequestBody(format!("Invalid amount: {value}")))
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRequest {
    #[serde(flatten)]
    pub auth: MerchantAuth,
    pub amount: Option<Amount>,
    pub source: Option<Value>,
    pub capture_flag: Option<bool>,
    pub merchant_customer_id: Option<String>,
    pub provider_customer_id: Option<String>,
}

impl ChargeRequest {
    pub fn charge_params(&self) -> Result<ChargeParams, ServerError> {
        let amount = self.amount.as_ref().map(Amount::value).transpose()?.unwrap_or(DEFAULT_CHARGE_AMOUNT);
        Ok(ChargeParams {
            amount,
            source: self.source.clone().filter(|s| !s.is_null()),
            capture_flag: self.capture_flag.unwrap_or(true),
        })
    }

    pub fn customer(&self) -> CustomerRef {
        CustomerRef::new(self.merchant_customer_id.as_deref(), self.provider_customer_id.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    #[serde(flatten)]
    pub auth: MerchantAuth,
    pub endpoint: Option<String>,
    pub method: Option<String>,
    pub payload: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub time: String,
}

/// The connection-test result. Always sent with a 200 status; `success` carries the verdict.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTestResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
    pub http_status: u16,
    pub raw_response: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}
