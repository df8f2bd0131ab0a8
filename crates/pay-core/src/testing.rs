//! In-memory processor used by the service tests.

use crate::error::{PaymentError, PaymentResult};
use crate::event::{WebhookEvent, WebhookEventType};
use crate::processor::{NewIntent, NewRefund, PaymentProcessor, ProcessorIntent, ProcessorRefund};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub(crate) const GOOD_SIGNATURE: &str = "t=1,v1=good";

#[derive(Default)]
pub(crate) struct MockProcessor {
    pub created: Mutex<Vec<NewIntent>>,
    pub retrieved: Mutex<Vec<String>>,
    pub refunded: Mutex<Vec<NewRefund>>,
    pub verifications: AtomicUsize,
    /// When set, every API call fails with this upstream message
    pub fail_with: Option<String>,
}

impl MockProcessor {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn api_calls(&self) -> usize {
        self.created.lock().unwrap().len()
            + self.retrieved.lock().unwrap().len()
            + self.refunded.lock().unwrap().len()
    }

    fn check(&self) -> PaymentResult<()> {
        match &self.fail_with {
            Some(message) => Err(PaymentError::upstream("mock", message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentProcessor for MockProcessor {
    async fn create_intent(&self, intent: NewIntent) -> PaymentResult<ProcessorIntent> {
        self.created.lock().unwrap().push(intent.clone());
        self.check()?;
        Ok(ProcessorIntent {
            id: "pi_mock".to_string(),
            client_secret: Some("pi_mock_secret_abc".to_string()),
            status: "requires_payment_method".to_string(),
            amount: intent.amount,
            currency: intent.currency,
            metadata: intent.metadata.to_map(),
        })
    }

    async fn retrieve_intent(&self, payment_intent_id: &str) -> PaymentResult<ProcessorIntent> {
        self.retrieved.lock().unwrap().push(payment_intent_id.to_string());
        self.check()?;
        Ok(ProcessorIntent {
            id: payment_intent_id.to_string(),
            client_secret: None,
            status: "succeeded".to_string(),
            amount: 4990,
            currency: "brl".to_string(),
            metadata: BTreeMap::from([("order_id".to_string(), "ord_42".to_string())]),
        })
    }

    async fn create_refund(&self, refund: NewRefund) -> PaymentResult<ProcessorRefund> {
        self.refunded.lock().unwrap().push(refund.clone());
        self.check()?;
        Ok(ProcessorRefund {
            id: "re_mock".to_string(),
            amount: Some(refund.amount.unwrap_or(4990)),
            status: Some("succeeded".to_string()),
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> PaymentResult<WebhookEvent> {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        if signature != GOOD_SIGNATURE {
            return Err(PaymentError::Verification(
                "No signatures found matching the expected signature for payload".to_string(),
            ));
        }

        let value: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| PaymentError::Verification(e.to_string()))?;
        let tag = value["type"].as_str().unwrap_or_default();
        let data = value["data"]["object"].clone();

        Ok(WebhookEvent {
            event_id: value["id"].as_str().unwrap_or("evt_mock").to_string(),
            event_type: WebhookEventType::from_tag(tag),
            provider: "mock".to_string(),
            payment_intent_id: data["id"].as_str().map(String::from),
            data,
            timestamp: Utc::now(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}
