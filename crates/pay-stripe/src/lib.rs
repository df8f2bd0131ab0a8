//! # pay-stripe
//!
//! Stripe processor adapter for the dropship payment backend.
//!
//! - **StripeClient** - `PaymentProcessor` over the REST API
//!   - Payment Intents (create, retrieve)
//!   - Refunds (full or partial)
//!   - Webhook verification with the endpoint signing secret
//! - **StripeWebhookVerifier** - standalone `Stripe-Signature` verification
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_core::IntentService;
//! use pay_stripe::{StripeClient, StripeConfig};
//! use std::sync::Arc;
//!
//! let config = StripeConfig::from_vars(|key| std::env::var(key).ok())?;
//! let client = StripeClient::new(config)?;
//! let intents = IntentService::new(Arc::new(client));
//! ```

pub mod client;
pub mod config;
pub mod webhook;

// Re-exports
pub use client::StripeClient;
pub use config::StripeConfig;
pub use webhook::{compute_signature, StripeWebhookVerifier, DEFAULT_TOLERANCE_SECS};
