//! # Request Handlers
//!
//! Axum request handlers for the payment API. Handlers only extract the
//! request, call a service, and shape the response; validation lives in
//! `pay-core`.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use pay_core::{
    ConfirmPaymentRequest, IntentStatus, PaymentIntentRequest, PaymentIntentResult, RefundRequest,
    RefundResult, WebhookAck,
};
use serde::Serialize;
use tracing::instrument;

pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

const HEALTH_MESSAGE: &str = "DropShip Pro Backend API funcionando!";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
    /// Whether a processor secret key is configured
    pub stripe: bool,
    pub timestamp: String,
    pub service: &'static str,
    pub version: &'static str,
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: HEALTH_MESSAGE,
        stripe: state.processor_configured(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        service: "dropship-pay",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Create a payment intent
#[instrument(skip_all)]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    payload: Result<Json<PaymentIntentRequest>, JsonRejection>,
) -> Result<Json<PaymentIntentResult>, ApiError> {
    let Json(request) = payload?;
    let result = state.intents.create_intent(request).await?;
    Ok(Json(result))
}

/// Report the status of a payment intent
#[instrument(skip_all)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    payload: Result<Json<ConfirmPaymentRequest>, JsonRejection>,
) -> Result<Json<IntentStatus>, ApiError> {
    let Json(request) = payload?;
    let status = state.intents.intent_status(request).await?;
    Ok(Json(status))
}

/// Handle Stripe webhook
///
/// Takes the body as raw `Bytes`: the signature covers the exact bytes sent.
#[instrument(skip_all, fields(bytes = body.len()))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let ack = state.webhooks.receive(&body, signature).await?;
    Ok(Json(ack))
}

/// Refund all or part of a payment
#[instrument(skip_all)]
pub async fn create_refund(
    State(state): State<AppState>,
    payload: Result<Json<RefundRequest>, JsonRejection>,
) -> Result<Json<RefundResult>, ApiError> {
    let Json(request) = payload?;
    let refund = state.refunds.create_refund(request).await?;
    Ok(Json(refund))
}

/// Fallback for unmatched paths and methods
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
