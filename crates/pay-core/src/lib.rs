//! # pay-core
//!
//! Core types, services and traits for the dropship payment backend.
//!
//! This crate provides:
//! - `PaymentProcessor` trait, the boundary to the payment processor
//! - `IntentService` for creating and looking up payment intents
//! - `RefundService` for issuing refunds
//! - `WebhookIntake` and the `WebhookHandler` extension point for processor events
//! - `PaymentError` for typed error handling
//!
//! Nothing here performs I/O on its own; the processor adapter does.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{IntentService, PaymentIntentRequest};
//!
//! let intents = IntentService::new(processor.clone());
//!
//! let result = intents
//!     .create_intent(PaymentIntentRequest {
//!         amount: Some(49.90),
//!         currency: Some("brl".into()),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! // Hand result.client_secret to the payment UI
//! ```

pub mod error;
pub mod event;
pub mod intent;
pub mod money;
pub mod processor;
pub mod refund;
pub mod webhook;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use error::{PaymentError, PaymentResult};
pub use event::{WebhookEvent, WebhookEventType};
pub use intent::{
    ConfirmPaymentRequest, CustomerInfo, IntentMetadata, IntentService, IntentStatus, OrderInfo,
    PaymentIntentRequest, PaymentIntentResult,
};
pub use processor::{
    BoxedPaymentProcessor, NewIntent, NewRefund, PaymentProcessor, ProcessorIntent,
    ProcessorRefund,
};
pub use refund::{RefundReason, RefundRequest, RefundResult, RefundService};
pub use webhook::{
    dispatch_guarded, dispatch_webhook_event, panic_message, DispatchOutcome,
    LoggingWebhookHandler, WebhookAck, WebhookHandler, WebhookIntake,
};
