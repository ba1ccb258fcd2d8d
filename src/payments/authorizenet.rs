use crate::payments::error::{GatewayError, GatewayResult};
use crate::payments::provider::HostedPageProvider;
use crate::payments::types::{HostedSessionRequest, SessionToken};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

const API_ENDPOINT_LIVE: &str = "https://api.authorize.net/xml/v1/request.api";
const API_ENDPOINT_TEST: &str = "https://apitest.authorize.net/xml/v1/request.api";

// The hosted payment page itself; the hidden redirect form posts the token
// here, not this client.
const REDIRECT_ENDPOINT_LIVE: &str = "https://secure.authorize.net/payment/payment";
const REDIRECT_ENDPOINT_TEST: &str = "https://test.authorize.net/payment/payment";

const RESULT_CODE_OK: &str = "Ok";

/// Sandbox vs production selection. `test` targets the apitest host and the
/// test redirect endpoint; everything else about the request is identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizeNetMode {
    Test,
    Live,
}

impl AuthorizeNetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizeNetMode::Test => "test",
            AuthorizeNetMode::Live => "live",
        }
    }
}

impl FromStr for AuthorizeNetMode {
    type Err = GatewayError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "test" => Ok(AuthorizeNetMode::Test),
            "live" => Ok(AuthorizeNetMode::Live),
            _ => Err(GatewayError::Config {
                message: format!("unsupported payment mode: {}", value),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthorizeNetConfig {
    pub api_login_id: String,
    pub transaction_key: String,
    pub mode: AuthorizeNetMode,
    pub timeout_secs: u64,
}

impl AuthorizeNetConfig {
    pub fn from_env() -> GatewayResult<Self> {
        let api_login_id =
            std::env::var("AUTHNET_API_LOGIN_ID").map_err(|_| GatewayError::Config {
                message: "AUTHNET_API_LOGIN_ID environment variable is required".to_string(),
            })?;
        let transaction_key =
            std::env::var("AUTHNET_TRANSACTION_KEY").map_err(|_| GatewayError::Config {
                message: "AUTHNET_TRANSACTION_KEY environment variable is required".to_string(),
            })?;
        let mode = std::env::var("AUTHNET_MODE")
            .unwrap_or_else(|_| "live".to_string())
            .parse::<AuthorizeNetMode>()?;

        Ok(Self {
            api_login_id,
            transaction_key,
            mode,
            timeout_secs: std::env::var("AUTHNET_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        })
    }
}

#[derive(Debug, Deserialize)]
struct HostedPageResponse {
    token: Option<String>,
    messages: ResponseMessages,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseMessages {
    result_code: String,
    #[serde(default)]
    message: Vec<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    code: String,
    text: String,
}

/// Stateless client for the `getHostedPaymentPageRequest` API. Credentials
/// live in an immutable config; nothing is shared mutably across requests.
pub struct AuthorizeNetClient {
    config: AuthorizeNetConfig,
    http: reqwest::Client,
}

impl AuthorizeNetClient {
    pub fn new(config: AuthorizeNetConfig) -> GatewayResult<Self> {
        // Single blocking round-trip per session; sessions are one-shot, so
        // there is no retry layer here.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Network {
                message: format!("failed to initialize HTTP client: {}", e),
            })?;
        Ok(Self { config, http })
    }

    pub fn from_env() -> GatewayResult<Self> {
        Self::new(AuthorizeNetConfig::from_env()?)
    }

    pub fn mode(&self) -> AuthorizeNetMode {
        self.config.mode
    }

    fn api_endpoint(&self) -> &'static str {
        match self.config.mode {
            AuthorizeNetMode::Live => API_ENDPOINT_LIVE,
            AuthorizeNetMode::Test => API_ENDPOINT_TEST,
        }
    }

    fn build_payload(&self, request: &HostedSessionRequest) -> GatewayResult<JsonValue> {
        // Hosted form display options: a plain "Pay" button, no order
        // summary, a receipt page, and the validation/cancel URLs. The
        // settingValue fields are JSON documents encoded as strings, per the
        // provider's wire format.
        let settings = vec![
            setting("hostedPaymentButtonOptions", &serde_json::json!({"text": "Pay"}))?,
            setting("hostedPaymentOrderOptions", &serde_json::json!({"show": false}))?,
            setting(
                "hostedPaymentReturnOptions",
                &serde_json::json!({
                    "url": request.return_url,
                    "cancelUrl": request.cancel_url,
                    "showReceipt": true,
                }),
            )?,
        ];

        Ok(serde_json::json!({
            "getHostedPaymentPageRequest": {
                "merchantAuthentication": {
                    "name": self.config.api_login_id,
                    "transactionKey": self.config.transaction_key,
                },
                "refId": request.reference_id.as_str(),
                "transactionRequest": {
                    "transactionType": "authCaptureTransaction",
                    "amount": request.amount.amount,
                    "customer": {
                        "email": request.customer.email,
                    },
                    "billTo": {
                        "firstName": request.bill_to.first_name,
                        "lastName": request.bill_to.last_name,
                        "city": request.bill_to.city,
                        "state": request.bill_to.state,
                        "zip": request.bill_to.zip,
                        "country": request.bill_to.country,
                    },
                },
                "hostedPaymentSettings": {
                    "setting": settings,
                },
            }
        }))
    }

    fn parse_response(body: &str) -> GatewayResult<SessionToken> {
        // The API prefixes responses with a UTF-8 BOM.
        let body = body.trim_start_matches('\u{feff}');
        let response: HostedPageResponse =
            serde_json::from_str(body).map_err(|e| GatewayError::Provider {
                code: "invalid_response".to_string(),
                text: format!("invalid provider JSON response: {}", e),
            })?;

        if response.messages.result_code == RESULT_CODE_OK {
            if let Some(token) = response.token.filter(|t| !t.is_empty()) {
                return Ok(SessionToken::new(token));
            }
        }

        let first = response.messages.message.first();
        Err(GatewayError::Provider {
            code: first.map(|m| m.code.clone()).unwrap_or_else(|| "unknown".to_string()),
            text: first
                .map(|m| m.text.clone())
                .unwrap_or_else(|| "provider returned no error detail".to_string()),
        })
    }
}

fn setting(name: &str, value: &JsonValue) -> GatewayResult<JsonValue> {
    let encoded = serde_json::to_string(value).map_err(|e| GatewayError::Validation {
        message: format!("failed to encode hosted payment setting: {}", e),
        field: Some(name.to_string()),
    })?;
    Ok(serde_json::json!({
        "settingName": name,
        "settingValue": encoded,
    }))
}

#[async_trait]
impl HostedPageProvider for AuthorizeNetClient {
    async fn create_hosted_session(
        &self,
        request: HostedSessionRequest,
    ) -> GatewayResult<SessionToken> {
        request.amount.validate_positive("amount")?;
        let payload = self.build_payload(&request)?;

        info!(
            reference_id = %request.reference_id,
            mode = self.config.mode.as_str(),
            "Requesting hosted payment page token"
        );

        let response = self
            .http
            .post(self.api_endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::Network {
                message: format!("provider request failed: {}", e),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(GatewayError::Provider {
                code: status.as_u16().to_string(),
                text: format!("HTTP {}: {}", status, body),
            });
        }

        Self::parse_response(&body)
    }

    fn redirect_endpoint(&self) -> &str {
        match self.config.mode {
            AuthorizeNetMode::Live => REDIRECT_ENDPOINT_LIVE,
            AuthorizeNetMode::Test => REDIRECT_ENDPOINT_TEST,
        }
    }
}
