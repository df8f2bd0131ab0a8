//! # Stripe Webhook Verification
//!
//! Verifies the `Stripe-Signature` header (`t=<unix>,v1=<hex hmac>[,v1=...]`)
//! against the raw request body and turns the payload into a
//! [`WebhookEvent`].
//!
//! The signed message is `"{t}.{raw body}"`, HMAC-SHA256 keyed with the
//! endpoint's `whsec_...` secret.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use pay_core::{PaymentError, PaymentResult, WebhookEvent, WebhookEventType};
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted distance between the signature timestamp and now
pub const DEFAULT_TOLERANCE_SECS: u64 = 300;

pub const NO_MATCHING_SIGNATURE: &str = "No signatures found matching the expected signature for payload. Are you passing the raw request body you received from Stripe?";

/// Verifies Stripe webhook deliveries for one endpoint secret
#[derive(Clone)]
pub struct StripeWebhookVerifier {
    secret: String,
    tolerance_secs: u64,
}

impl StripeWebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Builder: change the timestamp tolerance
    pub fn with_tolerance(mut self, secs: u64) -> Self {
        self.tolerance_secs = secs;
        self
    }

    /// Verify a delivery against the current time
    pub fn verify(&self, payload: &[u8], header: &str) -> PaymentResult<WebhookEvent> {
        self.verify_at(payload, header, Utc::now().timestamp())
    }

    /// Verify a delivery as if the current time were `now` (unix seconds)
    pub fn verify_at(&self, payload: &[u8], header: &str, now: i64) -> PaymentResult<WebhookEvent> {
        if self.secret.is_empty() {
            return Err(PaymentError::Verification(
                "Webhook signing secret is not configured".to_string(),
            ));
        }

        let sig_parts = parse_signature_header(header)?;
        let expected_sig = compute_signature(&self.secret, sig_parts.timestamp, payload);

        let valid = sig_parts
            .signatures
            .iter()
            .any(|sig| constant_time_compare(sig, &expected_sig));

        if !valid {
            return Err(PaymentError::Verification(NO_MATCHING_SIGNATURE.to_string()));
        }

        if now.abs_diff(sig_parts.timestamp) > self.tolerance_secs {
            return Err(PaymentError::Verification(
                "Timestamp outside the tolerance zone".to_string(),
            ));
        }

        parse_event(payload)
    }
}

// =============================================================================
// Stripe Event Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    created: Option<i64>,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Value,
}

fn parse_event(payload: &[u8]) -> PaymentResult<WebhookEvent> {
    let event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
        PaymentError::Verification(format!("Invalid webhook payload: {}", e))
    })?;

    debug!("Verified Stripe webhook: type={}", event.event_type);

    let event_type = WebhookEventType::from_tag(&event.event_type);
    let object = event.data.object;

    // payment_intent.* events carry the intent itself; others may reference it
    let payment_intent_id = if event.event_type.starts_with("payment_intent.") {
        object.get("id")
    } else {
        object.get("payment_intent")
    }
    .and_then(|v| v.as_str())
    .map(String::from);

    Ok(WebhookEvent {
        event_id: event.id,
        event_type,
        provider: "stripe".to_string(),
        payment_intent_id,
        data: object,
        timestamp: event
            .created
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(Utc::now),
    })
}

// =============================================================================
// Webhook Signature Verification
// =============================================================================

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> PaymentResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        PaymentError::Verification(
            "Unable to extract timestamp and signatures from header".to_string(),
        )
    })?;

    if signatures.is_empty() {
        return Err(PaymentError::Verification(
            "No signatures found with expected scheme".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// Hex HMAC-SHA256 of `"{timestamp}.{payload}"`, over the raw payload bytes
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    // HMAC accepts keys of any length, so this never fails
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}
