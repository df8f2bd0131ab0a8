//! # Webhook Intake
//!
//! Verifies inbound processor events, dispatches them by type to a
//! [`WebhookHandler`], and acknowledges them.
//!
//! ```text
//! Received ──verify──▶ Verified ──dispatch──▶ Dispatched ──▶ Acknowledged
//!     │
//!     └──bad signature──▶ Rejected
//! ```
//!
//! Once verification passes the acknowledgment is unconditional: handler
//! errors and panics are logged and swallowed, so processor redelivery is
//! driven only by authenticity, never by local handling bugs.

use crate::error::{PaymentError, PaymentResult};
use crate::event::{WebhookEvent, WebhookEventType};
use crate::processor::BoxedPaymentProcessor;
use serde::Serialize;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub const MISSING_SIGNATURE: &str = "No stripe-signature header value was provided.";

/// Webhook event handler trait
///
/// Implement this trait to act on payment events (persist order state,
/// send confirmation mail, notify fulfilment). The defaults only log.
#[allow(unused_variables)]
pub trait WebhookHandler: Send + Sync {
    /// Called when a payment intent succeeds
    fn on_payment_succeeded(&self, event: &WebhookEvent) -> PaymentResult<()> {
        info!(
            "Payment succeeded: payment_intent={}",
            event.payment_intent_id.as_deref().unwrap_or("unknown")
        );
        Ok(())
    }

    /// Called when a payment intent fails
    fn on_payment_failed(&self, event: &WebhookEvent) -> PaymentResult<()> {
        warn!(
            "Payment failed: payment_intent={}",
            event.payment_intent_id.as_deref().unwrap_or("unknown")
        );
        Ok(())
    }

    /// Called for every other event type
    fn on_unhandled_event(&self, event: &WebhookEvent) -> PaymentResult<()> {
        info!("Unhandled webhook event: {}", event.event_type);
        Ok(())
    }
}

/// Default webhook handler (just logs events)
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

/// Dispatch a webhook event to the appropriate handler method
pub fn dispatch_webhook_event(
    handler: &dyn WebhookHandler,
    event: &WebhookEvent,
) -> PaymentResult<()> {
    match &event.event_type {
        WebhookEventType::PaymentSucceeded => handler.on_payment_succeeded(event),
        WebhookEventType::PaymentFailed => handler.on_payment_failed(event),
        WebhookEventType::Unknown(_) => handler.on_unhandled_event(event),
    }
}

/// How dispatching a verified event went
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled,
    HandlerFailed(String),
    HandlerPanicked(String),
}

/// Run the handler, converting errors and panics into an outcome
pub fn dispatch_guarded(handler: &dyn WebhookHandler, event: &WebhookEvent) -> DispatchOutcome {
    match catch_unwind(AssertUnwindSafe(|| dispatch_webhook_event(handler, event))) {
        Ok(Ok(())) => DispatchOutcome::Handled,
        Ok(Err(e)) => DispatchOutcome::HandlerFailed(e.to_string()),
        Err(panic) => DispatchOutcome::HandlerPanicked(panic_message(panic.as_ref())),
    }
}

/// Best-effort text of a panic payload
pub fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Fixed acknowledgment body: `{"received": true}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

impl WebhookAck {
    pub fn received() -> Self {
        Self { received: true }
    }
}

/// Verifies, dispatches and acknowledges processor webhooks
#[derive(Clone)]
pub struct WebhookIntake {
    processor: BoxedPaymentProcessor,
    handler: Arc<dyn WebhookHandler>,
}

impl WebhookIntake {
    pub fn new(processor: BoxedPaymentProcessor, handler: Arc<dyn WebhookHandler>) -> Self {
        Self { processor, handler }
    }

    /// Intake with the logging-only handler
    pub fn logging(processor: BoxedPaymentProcessor) -> Self {
        Self::new(processor, Arc::new(LoggingWebhookHandler))
    }

    /// Handle one webhook delivery.
    ///
    /// `payload` must be the request body exactly as received. Returns
    /// `PaymentError::Verification` if the signature is missing or does not
    /// match; in that case the payload is never parsed by this crate or
    /// handed to the handler.
    #[instrument(skip(self, payload, signature), fields(bytes = payload.len()))]
    pub async fn receive(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> PaymentResult<WebhookAck> {
        let signature = signature.filter(|s| !s.is_empty()).ok_or_else(|| {
            warn!("Webhook rejected: missing signature header");
            PaymentError::Verification(MISSING_SIGNATURE.to_string())
        })?;

        let event = self
            .processor
            .verify_webhook(payload, signature)
            .await
            .map_err(|e| {
                warn!("Webhook signature verification failed: {}", e.detail());
                match e {
                    PaymentError::Verification(_) => e,
                    other => PaymentError::Verification(other.detail().to_string()),
                }
            })?;

        info!(
            "Received webhook: type={}, id={}",
            event.event_type, event.event_id
        );

        match dispatch_guarded(self.handler.as_ref(), &event) {
            DispatchOutcome::Handled => debug!("Webhook {} handled", event.event_id),
            DispatchOutcome::HandlerFailed(reason) => {
                error!("Webhook handler error for {}: {}", event.event_id, reason)
            }
            DispatchOutcome::HandlerPanicked(reason) => {
                error!("Webhook handler panicked for {}: {}", event.event_id, reason)
            }
        }

        Ok(WebhookAck::received())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockProcessor, GOOD_SIGNATURE};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingHandler {
        seen: Mutex<Vec<String>>,
    }

    impl WebhookHandler for RecordingHandler {
        fn on_payment_succeeded(&self, event: &WebhookEvent) -> PaymentResult<()> {
            self.seen.lock().unwrap().push(format!("succeeded:{}", event.event_id));
            Ok(())
        }

        fn on_payment_failed(&self, event: &WebhookEvent) -> PaymentResult<()> {
            self.seen.lock().unwrap().push(format!("failed:{}", event.event_id));
            Ok(())
        }

        fn on_unhandled_event(&self, event: &WebhookEvent) -> PaymentResult<()> {
            self.seen.lock().unwrap().push(format!("other:{}", event.event_type));
            Ok(())
        }
    }

    struct FailingHandler {
        calls: AtomicUsize,
    }

    impl WebhookHandler for FailingHandler {
        fn on_payment_succeeded(&self, _event: &WebhookEvent) -> PaymentResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(PaymentError::Internal("order store unavailable".into()))
        }
    }

    struct PanickingHandler;

    impl WebhookHandler for PanickingHandler {
        fn on_payment_succeeded(&self, _event: &WebhookEvent) -> PaymentResult<()> {
            panic!("fulfilment bug");
        }
    }

    fn payload(id: &str, ty: &str) -> Vec<u8> {
        serde_json::json!({
            "id": id,
            "type": ty,
            "data": { "object": { "id": "pi_123", "amount": 4990 } }
        })
        .to_string()
        .into_bytes()
    }

    fn intake(handler: Arc<dyn WebhookHandler>) -> (Arc<MockProcessor>, WebhookIntake) {
        let processor = Arc::new(MockProcessor::default());
        let intake = WebhookIntake::new(processor.clone(), handler);
        (processor, intake)
    }

    #[tokio::test]
    async fn test_dispatches_by_type() {
        let handler = Arc::new(RecordingHandler::default());
        let (_, intake) = intake(handler.clone());

        for (id, ty) in [
            ("evt_1", "payment_intent.succeeded"),
            ("evt_2", "payment_intent.payment_failed"),
            ("evt_3", "customer.created"),
        ] {
            let ack = intake
                .receive(&payload(id, ty), Some(GOOD_SIGNATURE))
                .await
                .unwrap();
            assert_eq!(ack, WebhookAck::received());
        }

        assert_eq!(
            handler.seen.lock().unwrap().as_slice(),
            ["succeeded:evt_1", "failed:evt_2", "other:customer.created"]
        );
    }

    #[tokio::test]
    async fn test_bad_signature_is_rejected_without_dispatch() {
        let handler = Arc::new(RecordingHandler::default());
        let (processor, intake) = intake(handler.clone());

        let err = intake
            .receive(&payload("evt_1", "payment_intent.succeeded"), Some("t=1,v1=forged"))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Verification(_)));
        assert_eq!(processor.verifications.load(Ordering::SeqCst), 1);
        assert!(handler.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_signature_is_rejected_before_verification() {
        let handler = Arc::new(RecordingHandler::default());
        let (processor, intake) = intake(handler.clone());
        let body = payload("evt_1", "payment_intent.succeeded");

        for signature in [None, Some("")] {
            let err = intake.receive(&body, signature).await.unwrap_err();
            assert!(matches!(err, PaymentError::Verification(msg) if msg == MISSING_SIGNATURE));
        }

        assert_eq!(processor.verifications.load(Ordering::SeqCst), 0);
        assert!(handler.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_handler_error_is_still_acknowledged() {
        let handler = Arc::new(FailingHandler {
            calls: AtomicUsize::new(0),
        });
        let (_, intake) = intake(handler.clone());

        let ack = intake
            .receive(&payload("evt_1", "payment_intent.succeeded"), Some(GOOD_SIGNATURE))
            .await
            .unwrap();

        assert!(ack.received);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_panic_is_still_acknowledged() {
        let (_, intake) = intake(Arc::new(PanickingHandler));

        let ack = intake
            .receive(&payload("evt_1", "payment_intent.succeeded"), Some(GOOD_SIGNATURE))
            .await
            .unwrap();

        assert!(ack.received);
    }

    #[test]
    fn test_dispatch_guarded_outcomes() {
        let event = WebhookEvent {
            event_id: "evt_1".to_string(),
            event_type: WebhookEventType::PaymentSucceeded,
            provider: "mock".to_string(),
            payment_intent_id: Some("pi_1".to_string()),
            data: serde_json::json!({ "id": "pi_1" }),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(
            dispatch_guarded(&LoggingWebhookHandler, &event),
            DispatchOutcome::Handled
        );
        assert_eq!(
            dispatch_guarded(&PanickingHandler, &event),
            DispatchOutcome::HandlerPanicked("fulfilment bug".to_string())
        );
        assert!(matches!(
            dispatch_guarded(&FailingHandler { calls: AtomicUsize::new(0) }, &event),
            DispatchOutcome::HandlerFailed(_)
        ));
    }

    #[test]
    fn test_ack_body() {
        assert_eq!(
            serde_json::to_value(WebhookAck::received()).unwrap(),
            serde_json::json!({ "received": true })
        );
    }
}
