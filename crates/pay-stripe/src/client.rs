//! # Stripe Client
//!
//! `PaymentProcessor` implementation over the Stripe REST API:
//! Payment Intents for collecting payments, Refunds for returning them.

use crate::config::StripeConfig;
use crate::webhook::StripeWebhookVerifier;
use async_trait::async_trait;
use pay_core::{
    NewIntent, NewRefund, PaymentError, PaymentProcessor, PaymentResult, ProcessorIntent,
    ProcessorRefund, WebhookEvent,
};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "stripe";

/// Transport timeout; matches the official SDKs' default
const REQUEST_TIMEOUT: Duration = Duration::from_secs(80);

/// Stripe processor adapter
///
/// Owns a pooled HTTP client and the webhook verifier for the configured
/// endpoint secret.
pub struct StripeClient {
    config: StripeConfig,
    client: Client,
    verifier: StripeWebhookVerifier,
}

impl StripeClient {
    /// Create a new Stripe client
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;
        let verifier = StripeWebhookVerifier::new(config.webhook_secret.clone());

        Ok(Self {
            config,
            client,
            verifier,
        })
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// `{base}/v1/{segments...}`, each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> PaymentResult<Url> {
        let mut url = Url::parse(&self.config.api_base_url).map_err(|e| {
            PaymentError::Configuration(format!("Invalid Stripe API base URL: {}", e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                PaymentError::Configuration("Stripe API base URL cannot be a base".to_string())
            })?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        Ok(url)
    }

    /// Send an authenticated request and decode the JSON response
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> PaymentResult<T> {
        let response = request
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| PaymentError::upstream(PROVIDER, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::upstream(PROVIDER, e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            // Parse Stripe error
            if let Ok(error_response) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(PaymentError::upstream(PROVIDER, error_response.error.message));
            }

            return Err(PaymentError::upstream(
                PROVIDER,
                format!("HTTP {}: {}", status, body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            PaymentError::upstream(PROVIDER, format!("Failed to parse Stripe response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    #[instrument(skip(self, intent), fields(amount = intent.amount, currency = %intent.currency))]
    async fn create_intent(&self, intent: NewIntent) -> PaymentResult<ProcessorIntent> {
        let mut form_params: Vec<(String, String)> = vec![
            ("amount".to_string(), intent.amount.to_string()),
            ("currency".to_string(), intent.currency.clone()),
        ];

        if intent.automatic_payment_methods {
            form_params.push((
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ));
        }

        for (key, value) in intent.metadata.pairs() {
            form_params.push((format!("metadata[{}]", key), value.to_string()));
        }

        let url = self.endpoint(&["payment_intents"])?;
        let created: StripePaymentIntent =
            self.send(self.client.post(url).form(&form_params)).await?;

        info!("Created Stripe payment intent: id={}", created.id);
        Ok(created.into())
    }

    #[instrument(skip(self))]
    async fn retrieve_intent(&self, payment_intent_id: &str) -> PaymentResult<ProcessorIntent> {
        let url = self.endpoint(&["payment_intents", payment_intent_id])?;
        let intent: StripePaymentIntent = self.send(self.client.get(url)).await?;

        debug!("Retrieved Stripe payment intent: id={}, status={}", intent.id, intent.status);
        Ok(intent.into())
    }

    #[instrument(skip(self, refund), fields(payment_intent = %refund.payment_intent_id))]
    async fn create_refund(&self, refund: NewRefund) -> PaymentResult<ProcessorRefund> {
        let mut form_params: Vec<(String, String)> = vec![(
            "payment_intent".to_string(),
            refund.payment_intent_id.clone(),
        )];

        if let Some(amount) = refund.amount {
            form_params.push(("amount".to_string(), amount.to_string()));
        }
        form_params.push(("reason".to_string(), refund.reason.as_str().to_string()));

        let url = self.endpoint(&["refunds"])?;
        let created: StripeRefund = self.send(self.client.post(url).form(&form_params)).await?;

        info!("Created Stripe refund: id={}", created.id);
        Ok(created.into())
    }

    #[instrument(skip(self, payload, signature))]
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> PaymentResult<WebhookEvent> {
        self.verifier.verify(payload, signature)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    id: String,
    #[serde(default)]
    client_secret: Option<String>,
    status: String,
    amount: i64,
    currency: String,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

impl From<StripePaymentIntent> for ProcessorIntent {
    fn from(intent: StripePaymentIntent) -> Self {
        ProcessorIntent {
            id: intent.id,
            client_secret: intent.client_secret,
            status: intent.status,
            amount: intent.amount,
            currency: intent.currency,
            metadata: intent.metadata,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeRefund {
    id: String,
    #[serde(default)]
    amount: Option<i64>,
    #[serde(default)]
    status: Option<String>,
}

impl From<StripeRefund> for ProcessorRefund {
    fn from(refund: StripeRefund) -> Self {
        ProcessorRefund {
            id: refund.id,
            amount: refund.amount,
            status: refund.status,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pay_core::{IntentMetadata, OrderInfo, RefundReason};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> StripeClient {
        let config = StripeConfig::new("sk_test_123", "whsec_test").with_api_base_url(server.uri());
        StripeClient::new(config).unwrap()
    }

    fn intent_json(amount: i64) -> serde_json::Value {
        json!({
            "id": "pi_123",
            "object": "payment_intent",
            "client_secret": "pi_123_secret_456",
            "status": "requires_payment_method",
            "amount": amount,
            "currency": "brl",
            "livemode": false,
            "metadata": {
                "order_id": "ord_1",
                "customer_name": "no-name",
                "customer_email": "no-email"
            }
        })
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let client = StripeClient::new(StripeConfig::new("sk_test_123", "")).unwrap();

        let url = client.endpoint(&["payment_intents", "pi_1"]).unwrap();
        assert_eq!(url.as_str(), "https://api.stripe.com/v1/payment_intents/pi_1");

        let url = client.endpoint(&["payment_intents", "pi_1/refunds"]).unwrap();
        assert_eq!(url.path(), "/v1/payment_intents/pi_1%2Frefunds");
    }

    #[tokio::test]
    async fn test_create_intent_sends_minor_units_and_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .and(header("authorization", "Bearer sk_test_123"))
            .and(body_string_contains("amount=4990"))
            .and(body_string_contains("currency=brl"))
            .and(body_string_contains("automatic_payment_methods%5Benabled%5D=true"))
            .and(body_string_contains("metadata%5Border_id%5D=ord_1"))
            .and(body_string_contains("metadata%5Bcustomer_name%5D=no-name"))
            .respond_with(ResponseTemplate::new(200).set_body_json(intent_json(4990)))
            .expect(1)
            .mount(&server)
            .await;

        let order = OrderInfo {
            order_id: Some("ord_1".to_string()),
        };
        let intent = client_for(&server)
            .create_intent(NewIntent {
                amount: 4990,
                currency: "brl".to_string(),
                metadata: IntentMetadata::from_request(None, Some(&order)),
                automatic_payment_methods: true,
            })
            .await
            .unwrap();

        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.client_secret.as_deref(), Some("pi_123_secret_456"));
        assert_eq!(intent.amount, 4990);
    }

    #[tokio::test]
    async fn test_retrieve_intent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/payment_intents/pi_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(intent_json(4990)))
            .mount(&server)
            .await;

        let intent = client_for(&server).retrieve_intent("pi_123").await.unwrap();

        assert_eq!(intent.status, "requires_payment_method");
        assert_eq!(intent.metadata.get("order_id").map(String::as_str), Some("ord_1"));
    }

    #[tokio::test]
    async fn test_not_found_carries_stripe_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/payment_intents/pi_missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {
                    "code": "resource_missing",
                    "message": "No such payment_intent: 'pi_missing'",
                    "type": "invalid_request_error"
                }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .retrieve_intent("pi_missing")
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Upstream { .. }));
        assert_eq!(err.detail(), "No such payment_intent: 'pi_missing'");
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/refunds"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_refund(NewRefund {
                payment_intent_id: "pi_123".to_string(),
                amount: None,
                reason: RefundReason::default(),
            })
            .await
            .unwrap_err();

        assert!(err.detail().contains("bad gateway"));
    }

    #[tokio::test]
    async fn test_full_refund_omits_amount() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/refunds"))
            .and(body_string_contains("payment_intent=pi_123"))
            .and(body_string_contains("reason=requested_by_customer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "re_1",
                "object": "refund",
                "amount": 4990,
                "status": "succeeded"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let refund = client_for(&server)
            .create_refund(NewRefund {
                payment_intent_id: "pi_123".to_string(),
                amount: None,
                reason: RefundReason::RequestedByCustomer,
            })
            .await
            .unwrap();

        assert_eq!(refund.id, "re_1");
        assert_eq!(refund.amount, Some(4990));

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8(requests[0].body.clone()).unwrap();
        assert!(!body.contains("amount="));
    }

    #[tokio::test]
    async fn test_partial_refund_sends_amount() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/refunds"))
            .and(body_string_contains("amount=1000"))
            .and(body_string_contains("reason=duplicate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "re_2",
                "amount": 1000,
                "status": "pending"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let refund = client_for(&server)
            .create_refund(NewRefund {
                payment_intent_id: "pi_123".to_string(),
                amount: Some(1000),
                reason: RefundReason::Duplicate,
            })
            .await
            .unwrap();

        assert_eq!(refund.status.as_deref(), Some("pending"));
    }

    #[tokio::test]
    async fn test_network_failure_is_upstream() {
        // Nothing listens on port 9
        let config = StripeConfig::new("sk_test_123", "").with_api_base_url("http://127.0.0.1:9");
        let client = StripeClient::new(config).unwrap();

        let err = client.retrieve_intent("pi_123").await.unwrap_err();
        assert!(matches!(err, PaymentError::Upstream { .. }));
    }

    #[tokio::test]
    async fn test_verify_webhook_uses_configured_secret() {
        let config = StripeConfig::new("sk_test_123", "whsec_test");
        let client = StripeClient::new(config).unwrap();
        let payload = br#"{"id":"evt_1","type":"payment_intent.succeeded","data":{"object":{"id":"pi_1"}}}"#;
        let now = chrono::Utc::now().timestamp();
        let signature = format!(
            "t={},v1={}",
            now,
            crate::webhook::compute_signature("whsec_test", now, payload)
        );

        let event = client.verify_webhook(payload, &signature).await.unwrap();
        assert_eq!(event.payment_intent_id.as_deref(), Some("pi_1"));

        let err = client.verify_webhook(payload, "t=1,v1=00").await.unwrap_err();
        assert!(matches!(err, PaymentError::Verification(_)));
    }
}
