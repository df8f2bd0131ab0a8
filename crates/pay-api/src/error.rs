//! # API Errors
//!
//! Maps domain errors onto HTTP responses. Every error body is
//! `{"error": ..., "details"?: ...}`; the messages are part of the wire
//! contract the storefront already parses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pay_core::PaymentError;
use serde::Serialize;
use tracing::warn;

pub const INTERNAL_SERVER_ERROR: &str = "Erro interno do servidor";
pub const NOT_FOUND: &str = "Endpoint não encontrado";
pub const INVALID_BODY: &str = "Corpo da requisição inválido";

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Anything a handler can fail with
#[derive(Debug)]
pub enum ApiError {
    Payment(PaymentError),
    /// Request body could not be decoded as the expected JSON
    InvalidBody(String),
    /// A handler panicked; carries the panic message
    Panic(String),
    NotFound,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Payment(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Panic(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn body(&self) -> ErrorResponse {
        match self {
            ApiError::Payment(PaymentError::Validation(msg)) => ErrorResponse::new(msg.as_str()),
            ApiError::Payment(PaymentError::Verification(msg)) => {
                ErrorResponse::new(format!("Webhook Error: {}", msg))
            }
            ApiError::Payment(err) => {
                ErrorResponse::new(INTERNAL_SERVER_ERROR).with_details(err.detail())
            }
            ApiError::InvalidBody(reason) => {
                ErrorResponse::new(INVALID_BODY).with_details(reason.as_str())
            }
            ApiError::Panic(msg) => ErrorResponse::new(INTERNAL_SERVER_ERROR).with_details(msg.as_str()),
            ApiError::NotFound => ErrorResponse::new(NOT_FOUND),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        ApiError::Payment(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
