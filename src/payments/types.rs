use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::payments::error::{GatewayError, GatewayResult};
use crate::payments::reference::ReferenceId;
use crate::store::{fields, Submission};

/// Hosted sessions are billed in a single fixed currency.
pub const SESSION_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Money {
    pub amount: String,
    pub currency: String,
}

impl Money {
    pub fn usd(amount: &str) -> Self {
        Self {
            amount: amount.trim().to_string(),
            currency: SESSION_CURRENCY.to_string(),
        }
    }

    pub fn validate_positive(&self, field: &str) -> Result<(), GatewayError> {
        let parsed =
            BigDecimal::from_str(&self.amount).map_err(|_| GatewayError::Validation {
                message: format!("invalid decimal amount: {}", self.amount),
                field: Some(field.to_string()),
            })?;
        if parsed <= BigDecimal::from(0) {
            return Err(GatewayError::Validation {
                message: "amount must be greater than zero".to_string(),
                field: Some(field.to_string()),
            });
        }
        Ok(())
    }
}

/// Payment state stored back into the submission's `paid` field.
///
/// `Pending` is written at session creation, `Success` by the browser
/// callback and `Complete` by the webhook. Both channels may fire for the
/// same attempt and in either order; the terminal states never regress to
/// `Pending` except when a new attempt mints a fresh reference id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unset,
    Pending,
    Success,
    Complete,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unset => "",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Complete => "complete",
        }
    }

    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("pending") => PaymentStatus::Pending,
            Some("success") => PaymentStatus::Success,
            Some("complete") => PaymentStatus::Complete,
            _ => PaymentStatus::Unset,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Success | PaymentStatus::Complete)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerContact {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingAddress {
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

/// One-time provider token handed to the browser-side redirect form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        SessionToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedSessionRequest {
    pub reference_id: ReferenceId,
    pub amount: Money,
    pub customer: CustomerContact,
    pub bill_to: BillingAddress,
    pub return_url: String,
    pub cancel_url: String,
}

impl HostedSessionRequest {
    /// Builds the provider request from the submission's field bag. Required
    /// fields are extracted by name; an absent field is a hard error rather
    /// than a null silently passed downstream.
    pub fn from_submission(
        submission: &Submission,
        amount: Money,
        reference_id: ReferenceId,
        return_url: String,
        cancel_url: String,
    ) -> GatewayResult<Self> {
        Ok(Self {
            reference_id,
            amount,
            customer: CustomerContact {
                email: required_field(submission, fields::EMAIL)?,
            },
            bill_to: BillingAddress {
                first_name: required_field(submission, fields::FIRST_NAME)?,
                last_name: required_field(submission, fields::LAST_NAME)?,
                city: required_field(submission, fields::CITY)?,
                state: required_field(submission, fields::STATE)?,
                zip: required_field(submission, fields::ZIP)?,
                country: required_field(submission, fields::COUNTRY)?,
            },
            return_url,
            cancel_url,
        })
    }
}

fn required_field(submission: &Submission, name: &str) -> GatewayResult<String> {
    submission
        .data
        .get(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| GatewayError::missing_field(name))
}
