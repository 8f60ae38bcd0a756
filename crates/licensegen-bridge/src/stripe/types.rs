//! Stripe API types.

use std::collections::HashMap;

use serde::Deserialize;

/// Stripe customer object.
#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    /// Stripe customer ID.
    pub id: String,
    /// Customer email.
    #[serde(default)]
    pub email: Option<String>,
    /// Customer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Metadata attached to the customer. Stripe metadata values are
    /// always strings.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Stripe subscription object.
#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    /// Subscription ID.
    pub id: String,
    /// Customer the subscription belongs to.
    #[serde(default)]
    pub customer: Option<String>,
    /// Status (active, incomplete, etc.).
    #[serde(default)]
    pub status: Option<String>,
}

/// Stripe event envelope, as delivered to the webhook endpoint and as
/// returned by `GET /v1/events/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    /// Event ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Event type (e.g., "customer.created").
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event data.
    pub data: StripeEventData,
}

/// Stripe event data container.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    /// The event object. Its structure varies by event type.
    pub object: serde_json::Value,
}

/// Stripe API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    /// Error details.
    pub error: StripeErrorDetail,
}

/// Stripe error detail.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorDetail {
    /// Error type.
    #[serde(rename = "type")]
    pub error_type: String,
    /// Error message.
    pub message: String,
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
}
