//! # Refunds

use crate::error::{PaymentError, PaymentResult};
use crate::intent::{required_minor_amount, PAYMENT_INTENT_ID_REQUIRED};
use crate::money;
use crate::processor::{BoxedPaymentProcessor, NewRefund};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

pub const AMOUNT_NEGATIVE: &str = "Amount não pode ser negativo";

/// Why a refund was issued
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundReason {
    Duplicate,
    Fraudulent,
    #[default]
    RequestedByCustomer,
}

impl RefundReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundReason::Duplicate => "duplicate",
            RefundReason::Fraudulent => "fraudulent",
            RefundReason::RequestedByCustomer => "requested_by_customer",
        }
    }
}

/// Body of `POST /create-refund`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefundRequest {
    #[serde(default)]
    pub payment_intent_id: Option<String>,
    /// Major-unit amount; absent or zero refunds everything
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub reason: Option<RefundReason>,
}

/// Response of `POST /create-refund`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefundResult {
    pub refund_id: String,
    /// Major-unit amount refunded
    pub amount: Option<f64>,
    pub status: Option<String>,
}

/// Issues refunds through the processor
#[derive(Clone)]
pub struct RefundService {
    processor: BoxedPaymentProcessor,
}

impl RefundService {
    pub fn new(processor: BoxedPaymentProcessor) -> Self {
        Self { processor }
    }

    #[instrument(skip(self, request), fields(provider = self.processor.provider_name()))]
    pub async fn create_refund(&self, request: RefundRequest) -> PaymentResult<RefundResult> {
        let payment_intent_id = request
            .payment_intent_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PaymentError::Validation(PAYMENT_INTENT_ID_REQUIRED.to_string()))?;

        let amount = match request.amount {
            Some(a) if !a.is_finite() || a < 0.0 => {
                return Err(PaymentError::Validation(AMOUNT_NEGATIVE.to_string()));
            }
            Some(a) if a == 0.0 => None,
            // Partial refunds must still be at least one minor unit
            Some(a) => Some(required_minor_amount(Some(a))?),
            None => None,
        };
        let reason = request.reason.unwrap_or_default();

        let refund = self
            .processor
            .create_refund(NewRefund {
                payment_intent_id: payment_intent_id.clone(),
                amount,
                reason,
            })
            .await
            .map_err(|e| {
                error!("Failed to refund {}: {}", payment_intent_id, e);
                e.into_upstream(self.processor.provider_name())
            })?;

        info!(
            "Created refund: id={}, payment_intent={}, reason={}",
            refund.id,
            payment_intent_id,
            reason.as_str()
        );

        Ok(RefundResult {
            refund_id: refund.id,
            amount: refund.amount.map(money::from_minor_units),
            status: refund.status,
        })
    }
}
