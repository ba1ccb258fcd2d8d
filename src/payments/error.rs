use thiserror::Error;

use crate::store::StoreError;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Missing submission field: {field}")]
    MissingField { field: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Provider error: code={code}, text={text}")]
    Provider { code: String, text: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl GatewayError {
    pub fn missing_field(field: &str) -> Self {
        GatewayError::MissingField {
            field: field.to_string(),
        }
    }

    /// Provider and network failures abort only the current attempt; the
    /// next attempt mints a fresh reference id.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::Provider { .. } | GatewayError::Network { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display_carries_code_and_text() {
        let err = GatewayError::Provider {
            code: "E00007".to_string(),
            text: "User authentication failed.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Provider error: code=E00007, text=User authentication failed."
        );
    }

    #[test]
    fn provider_failure_classification() {
        assert!(GatewayError::Network {
            message: "timeout".to_string()
        }
        .is_provider_failure());
        assert!(!GatewayError::missing_field("email").is_provider_failure());
    }
}
