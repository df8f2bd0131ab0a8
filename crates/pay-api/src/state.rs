//! # Application State
//!
//! Shared state for the Axum application: the three services built over one
//! payment processor, plus the CORS origin.

use crate::config::AppConfig;
use pay_core::{
    BoxedPaymentProcessor, IntentService, PaymentResult, RefundService, WebhookHandler,
    WebhookIntake,
};
use pay_stripe::StripeClient;
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub intents: IntentService,
    pub refunds: RefundService,
    pub webhooks: WebhookIntake,
    /// Kept for health reporting
    pub processor: BoxedPaymentProcessor,
    /// Allowed CORS origin; `None` mirrors any origin
    pub frontend_url: Option<String>,
}

impl AppState {
    /// Build the services over `processor`, dispatching webhooks to `handler`
    pub fn new(processor: BoxedPaymentProcessor, handler: Arc<dyn WebhookHandler>) -> Self {
        let webhooks = WebhookIntake::new(processor.clone(), handler);
        Self::with_webhooks(processor, webhooks)
    }

    fn with_webhooks(processor: BoxedPaymentProcessor, webhooks: WebhookIntake) -> Self {
        Self {
            intents: IntentService::new(processor.clone()),
            refunds: RefundService::new(processor.clone()),
            webhooks,
            processor,
            frontend_url: None,
        }
    }

    /// Builder: restrict CORS to one origin
    pub fn with_frontend_url(mut self, url: impl Into<String>) -> Self {
        self.frontend_url = Some(url.into());
        self
    }

    /// Production wiring: Stripe processor and the logging webhook handler
    pub fn from_config(config: &AppConfig) -> PaymentResult<Self> {
        let stripe = StripeClient::new(config.stripe.clone())?;
        info!(
            "Stripe configured: {} (test mode: {})",
            stripe.config().is_configured(),
            stripe.config().is_test_mode()
        );

        let processor: BoxedPaymentProcessor = Arc::new(stripe);
        let state = Self::with_webhooks(processor.clone(), WebhookIntake::logging(processor));
        Ok(match &config.frontend_url {
            Some(url) => state.with_frontend_url(url.clone()),
            None => state,
        })
    }

    /// Whether processor credentials are present
    pub fn processor_configured(&self) -> bool {
        self.processor.is_configured()
    }
}
