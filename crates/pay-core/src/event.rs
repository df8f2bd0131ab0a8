//! # Webhook Event Types
//!
//! Processor-initiated events, constructed only after signature verification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Webhook event types we care about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// `payment_intent.succeeded`
    PaymentSucceeded,
    /// `payment_intent.payment_failed`
    PaymentFailed,
    /// Any other tag (passthrough)
    Unknown(String),
}

impl WebhookEventType {
    /// Map a processor event tag to a known type
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "payment_intent.succeeded" => WebhookEventType::PaymentSucceeded,
            "payment_intent.payment_failed" => WebhookEventType::PaymentFailed,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }

    /// The processor's tag for this type
    pub fn as_str(&self) -> &str {
        match self {
            WebhookEventType::PaymentSucceeded => "payment_intent.succeeded",
            WebhookEventType::PaymentFailed => "payment_intent.payment_failed",
            WebhookEventType::Unknown(tag) => tag,
        }
    }
}

impl std::fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verified webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from provider
    pub event_id: String,

    /// Event type
    pub event_type: WebhookEventType,

    /// Provider name
    pub provider: String,

    /// Payment intent the event refers to (`payment_intent.*` events)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,

    /// The event's `data.object`, untouched
    pub data: serde_json::Value,

    /// When the provider created the event
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags() {
        assert_eq!(
            WebhookEventType::from_tag("payment_intent.succeeded"),
            WebhookEventType::PaymentSucceeded
        );
        assert_eq!(
            WebhookEventType::from_tag("payment_intent.payment_failed"),
            WebhookEventType::PaymentFailed
        );
    }

    #[test]
    fn test_unknown_tag_is_preserved() {
        let ty = WebhookEventType::from_tag("charge.refunded");
        assert_eq!(ty, WebhookEventType::Unknown("charge.refunded".to_string()));
        assert_eq!(ty.as_str(), "charge.refunded");
        assert_eq!(ty.to_string(), "charge.refunded");
    }
}
