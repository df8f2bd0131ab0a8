//! # Routes
//!
//! Axum router configuration for the payment API.

use crate::error::ApiError;
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::HeaderValue,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use pay_core::panic_message;
use std::any::Any;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, warn};

/// Create the main application router
///
/// Routes:
/// - GET  /                        - Health check
/// - GET  /health                  - Health check
/// - POST /create-payment-intent   - Create a payment intent
/// - POST /confirm-payment         - Look up a payment intent's status
/// - POST /webhook                 - Stripe webhook (raw body)
/// - POST /create-refund           - Refund a payment
///
/// Anything else, including a known path with the wrong method, is a 404.
pub fn create_router(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(state.frontend_url.as_deref()))
        .layer(CatchPanicLayer::custom(handle_panic));

    Router::new()
        // Health check at root
        .route("/", get(handlers::health))
        .route("/health", get(handlers::health))
        // Payments
        .route("/create-payment-intent", post(handlers::create_payment_intent))
        .route("/confirm-payment", post(handlers::confirm_payment))
        .route("/create-refund", post(handlers::create_refund))
        // Webhooks
        .route("/webhook", post(handlers::stripe_webhook))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::not_found)
        .layer(middleware)
        .with_state(state)
}

/// Allow one origin if configured, otherwise mirror the caller's origin.
///
/// Credentials are allowed, so wildcards are not an option here.
fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let origin = match frontend_url.map(HeaderValue::from_str) {
        Some(Ok(origin)) => AllowOrigin::exact(origin),
        Some(Err(_)) => {
            warn!("FRONTEND_URL is not a valid origin; allowing all origins");
            AllowOrigin::mirror_request()
        }
        None => AllowOrigin::mirror_request(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic_message(panic.as_ref());
    error!("Unhandled panic in request handler: {}", message);
    ApiError::Panic(message).into_response()
}
