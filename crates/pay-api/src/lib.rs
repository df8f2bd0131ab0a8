//! # pay-api
//!
//! HTTP API layer for the dropship payment backend.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for payment intents and refunds
//! - The Stripe webhook endpoint
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/`, `/health` | Health check |
//! | POST | `/create-payment-intent` | Create payment intent |
//! | POST | `/confirm-payment` | Payment intent status |
//! | POST | `/webhook` | Stripe webhook |
//! | POST | `/create-refund` | Refund a payment |
//!
//! [`create_router`] is the whole request-handling unit; the binary only
//! decides whether to bind a listener for it.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{AppConfig, LogFormat};
pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;
