//! # Payment Error Types
//!
//! Typed error handling for the payment backend.
//! Every service and adapter operation returns `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller-supplied input is missing a required field or is out of range
    #[error("{0}")]
    Validation(String),

    /// Webhook signature or payload could not be verified
    #[error("{0}")]
    Verification(String),

    /// The payment processor reported a failure (invalid state, not found, network)
    #[error("Provider error [{provider}]: {message}")]
    Upstream { provider: String, message: String },

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Shorthand for an upstream failure reported by `provider`
    pub fn upstream(provider: impl Into<String>, message: impl Into<String>) -> Self {
        PaymentError::Upstream {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Re-tag an adapter failure as upstream, keeping its message
    pub fn into_upstream(self, provider: &str) -> Self {
        match self {
            PaymentError::Upstream { .. } => self,
            other => PaymentError::upstream(provider, other.detail()),
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::Validation(_) => 400,
            PaymentError::Verification(_) => 400,
            PaymentError::Upstream { .. } => 500,
            PaymentError::Internal(_) => 500,
        }
    }

    /// The message to surface as diagnostic detail, without the variant prefix
    pub fn detail(&self) -> &str {
        match self {
            PaymentError::Configuration(msg)
            | PaymentError::Validation(msg)
            | PaymentError::Verification(msg)
            | PaymentError::Internal(msg) => msg,
            PaymentError::Upstream { message, .. } => message,
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
