//! # Payment Processor Trait
//!
//! The boundary between this backend and the payment processor.
//! Services only ever talk to the processor through this trait, so the
//! Stripe adapter can be swapped for an in-memory one in tests.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   PaymentProcessor (trait)                  │
//! │  ├── create_intent()                                        │
//! │  ├── retrieve_intent()                                      │
//! │  ├── create_refund()                                        │
//! │  ├── verify_webhook()                                       │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                    ┌───────┴───────┐
//!                    │ StripeClient  │
//!                    │ (pay-stripe)  │
//!                    └───────────────┘
//! ```
//!
//! All amounts crossing this trait are integer minor units.

use crate::error::PaymentResult;
use crate::event::WebhookEvent;
use crate::intent::IntentMetadata;
use crate::refund::RefundReason;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Parameters for a new payment intent, already in minor units
#[derive(Debug, Clone, PartialEq)]
pub struct NewIntent {
    pub amount: i64,
    pub currency: String,
    pub metadata: IntentMetadata,
    /// Let the processor pick the payment methods enabled on the account
    pub automatic_payment_methods: bool,
}

/// A payment intent as reported by the processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorIntent {
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub status: String,
    /// Amount in minor units
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Parameters for a refund, already in minor units
#[derive(Debug, Clone, PartialEq)]
pub struct NewRefund {
    pub payment_intent_id: String,
    /// `None` refunds the full captured amount
    pub amount: Option<i64>,
    pub reason: RefundReason,
}

/// A refund as reported by the processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorRefund {
    pub id: String,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Core trait for payment processor adapters.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create a payment intent.
    async fn create_intent(&self, intent: NewIntent) -> PaymentResult<ProcessorIntent>;

    /// Fetch an existing payment intent by id.
    async fn retrieve_intent(&self, payment_intent_id: &str) -> PaymentResult<ProcessorIntent>;

    /// Refund all or part of a payment intent.
    async fn create_refund(&self, refund: NewRefund) -> PaymentResult<ProcessorRefund>;

    /// Verify a webhook signature and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes, exactly as received
    /// * `signature` - Signature header from the request
    ///
    /// # Returns
    /// A parsed `WebhookEvent` if the signature is valid; a
    /// `PaymentError::Verification` otherwise.
    async fn verify_webhook(&self, payload: &[u8], signature: &str)
        -> PaymentResult<WebhookEvent>;

    /// Get the provider name (for logging and error attribution).
    fn provider_name(&self) -> &'static str;

    /// Whether API credentials are present.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Type alias for a shared payment processor (dynamic dispatch)
pub type BoxedPaymentProcessor = Arc<dyn PaymentProcessor>;
