//! # Payment Intents
//!
//! Request/response shapes for creating and looking up payment intents,
//! and the service that validates them and delegates to the processor.

use crate::error::{PaymentError, PaymentResult};
use crate::money::{self, DEFAULT_CURRENCY};
use crate::processor::{BoxedPaymentProcessor, NewIntent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error, info, instrument};

pub const AMOUNT_REQUIRED: &str = "Amount é obrigatório";
pub const AMOUNT_NOT_POSITIVE: &str = "Amount deve ser maior que zero";
pub const AMOUNT_TOO_LARGE: &str = "Amount excede o valor máximo permitido";
pub const PAYMENT_INTENT_ID_REQUIRED: &str = "Payment Intent ID é obrigatório";

/// Customer details attached to an intent as metadata
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Order details attached to an intent as metadata
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderInfo {
    #[serde(default)]
    pub order_id: Option<String>,
}

/// Body of `POST /create-payment-intent`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentIntentRequest {
    /// Major-unit amount (e.g. 49.90)
    #[serde(default)]
    pub amount: Option<f64>,
    /// ISO currency code, defaults to `brl`
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer_info: Option<CustomerInfo>,
    #[serde(default)]
    pub order_info: Option<OrderInfo>,
}

/// Response of `POST /create-payment-intent`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentIntentResult {
    /// Token handed to the client-side payment UI
    pub client_secret: Option<String>,
    pub payment_intent_id: String,
}

/// Body of `POST /confirm-payment`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmPaymentRequest {
    #[serde(default)]
    pub payment_intent_id: Option<String>,
}

/// Response of `POST /confirm-payment`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentStatus {
    pub status: String,
    /// Major-unit amount
    pub amount: f64,
    pub currency: String,
    pub metadata: BTreeMap<String, String>,
}

/// Metadata stored on every intent.
///
/// All three keys are always present; reporting tools downstream read them
/// unconditionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentMetadata {
    pub order_id: String,
    pub customer_name: String,
    pub customer_email: String,
}

impl IntentMetadata {
    pub const NO_ORDER_ID: &'static str = "no-order-id";
    pub const NO_NAME: &'static str = "no-name";
    pub const NO_EMAIL: &'static str = "no-email";

    /// Build metadata, substituting placeholders for missing or empty fields
    pub fn from_request(customer: Option<&CustomerInfo>, order: Option<&OrderInfo>) -> Self {
        Self {
            order_id: non_empty(order.and_then(|o| o.order_id.as_deref()), Self::NO_ORDER_ID),
            customer_name: non_empty(customer.and_then(|c| c.name.as_deref()), Self::NO_NAME),
            customer_email: non_empty(customer.and_then(|c| c.email.as_deref()), Self::NO_EMAIL),
        }
    }

    /// Key/value pairs in the order they are sent to the processor
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("order_id", self.order_id.as_str()),
            ("customer_name", self.customer_name.as_str()),
            ("customer_email", self.customer_email.as_str()),
        ]
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.pairs()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

fn non_empty(value: Option<&str>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => placeholder.to_string(),
    }
}

/// Validate a major-unit amount and convert it to minor units
pub fn required_minor_amount(amount: Option<f64>) -> PaymentResult<i64> {
    let amount = amount.ok_or_else(|| PaymentError::Validation(AMOUNT_REQUIRED.to_string()))?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(PaymentError::Validation(AMOUNT_NOT_POSITIVE.to_string()));
    }

    match money::to_minor_units(amount) {
        Some(0) => Err(PaymentError::Validation(AMOUNT_NOT_POSITIVE.to_string())),
        Some(minor) => Ok(minor),
        None => Err(PaymentError::Validation(AMOUNT_TOO_LARGE.to_string())),
    }
}

/// Creates and looks up payment intents through the processor
#[derive(Clone)]
pub struct IntentService {
    processor: BoxedPaymentProcessor,
}

impl IntentService {
    pub fn new(processor: BoxedPaymentProcessor) -> Self {
        Self { processor }
    }

    /// Create a payment intent for a major-unit amount.
    ///
    /// The processor is not called unless the amount is present and positive.
    #[instrument(skip(self, request), fields(provider = self.processor.provider_name()))]
    pub async fn create_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> PaymentResult<PaymentIntentResult> {
        let amount = required_minor_amount(request.amount)?;
        let currency = request
            .currency
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
        let metadata = IntentMetadata::from_request(
            request.customer_info.as_ref(),
            request.order_info.as_ref(),
        );

        debug!(
            "Creating payment intent: amount={}, order_id={}",
            money::display(amount, &currency),
            metadata.order_id
        );

        let intent = self
            .processor
            .create_intent(NewIntent {
                amount,
                currency,
                metadata,
                automatic_payment_methods: true,
            })
            .await
            .map_err(|e| {
                error!("Failed to create payment intent: {}", e);
                e.into_upstream(self.processor.provider_name())
            })?;

        info!(
            "Created payment intent: id={}, amount={}",
            intent.id,
            money::display(intent.amount, &intent.currency)
        );

        Ok(PaymentIntentResult {
            client_secret: intent.client_secret,
            payment_intent_id: intent.id,
        })
    }

    /// Look up the current status of a payment intent
    #[instrument(skip(self, request))]
    pub async fn intent_status(&self, request: ConfirmPaymentRequest) -> PaymentResult<IntentStatus> {
        let id = request
            .payment_intent_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PaymentError::Validation(PAYMENT_INTENT_ID_REQUIRED.to_string()))?;

        let intent = self.processor.retrieve_intent(&id).await.map_err(|e| {
            error!("Failed to retrieve payment intent {}: {}", id, e);
            e.into_upstream(self.processor.provider_name())
        })?;

        debug!("Payment intent {} is {}", intent.id, intent.status);

        Ok(IntentStatus {
            status: intent.status,
            amount: money::from_minor_units(intent.amount),
            currency: intent.currency,
            metadata: intent.metadata,
        })
    }
}
