//! Webhook handlers for LicenseGen and Stripe.
//!
//! Both handlers follow the same outline: resolve the authoritative event
//! according to the source's trust policy, dispatch on the event type, and
//! acknowledge everything else with a 200 so the sender stops redelivering.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::licensegen::{self, Document, LicensegenError};
use crate::provision::{EventTrust, ProvisioningState};
use crate::state::AppState;
use crate::stripe::{Customer, StripeEvent};

/// Inbound LicenseGen webhook notification.
///
/// Carries only the event id; under the refetch trust policy the event body
/// is never taken from the wire.
#[derive(Debug, Deserialize)]
pub struct LicensegenNotice {
    /// The notified event.
    pub data: LicensegenNoticeData,
}

/// Notification payload.
#[derive(Debug, Deserialize)]
pub struct LicensegenNoticeData {
    /// Event id.
    pub id: String,
    /// Embedded event attributes, used only under the direct trust policy.
    #[serde(default)]
    pub attributes: Option<licensegen::WebhookEventAttributes>,
}

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Whether the webhook was processed.
    pub received: bool,
}

fn acknowledge() -> Json<WebhookResponse> {
    Json(WebhookResponse { received: true })
}

/// Handle LicenseGen webhooks.
///
/// The body arrives as `application/vnd.api+json`, so it is taken as a raw
/// string and parsed here rather than through the JSON extractor.
pub async fn licensegen_webhook(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<WebhookResponse>, ApiError> {
    let notice: LicensegenNotice =
        serde_json::from_str(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let Some(event) = resolve_licensegen_event(&state, &notice).await else {
        tracing::info!(event_id = %notice.data.id, "Ignoring unverifiable LicenseGen event");
        return Ok(acknowledge());
    };

    tracing::info!(
        event_id = %event.id,
        event_type = %event.attributes.event,
        "Received LicenseGen webhook"
    );

    match event.attributes.event.as_str() {
        "user.created" => handle_user_created(&state, &event).await?,
        _ => {
            tracing::debug!(event_type = %event.attributes.event, "Unhandled LicenseGen event");
        }
    }

    Ok(acknowledge())
}

/// Resolve the authoritative LicenseGen event for a notification.
///
/// `None` means "not an event we care about": the sender still gets a 200,
/// both to stop redelivery storms and to give forged notifications nothing
/// to observe.
async fn resolve_licensegen_event(
    state: &AppState,
    notice: &LicensegenNotice,
) -> Option<licensegen::WebhookEvent> {
    match state.config.licensegen_event_trust {
        EventTrust::VerifyByRefetch => {
            match state.licensegen.get_webhook_event(&notice.data.id).await {
                Ok(found) => found,
                Err(err) => {
                    tracing::warn!(
                        event_id = %notice.data.id,
                        error = %err,
                        "Failed to re-fetch LicenseGen event"
                    );
                    None
                }
            }
        }
        EventTrust::TrustDirectly => {
            notice
                .data
                .attributes
                .clone()
                .map(|attributes| licensegen::WebhookEvent {
                    id: notice.data.id.clone(),
                    attributes,
                })
        }
    }
}

/// Provision a Stripe customer for a newly created LicenseGen user.
async fn handle_user_created(
    state: &AppState,
    event: &licensegen::WebhookEvent,
) -> Result<(), ApiError> {
    // The event payload is a JSON:API document serialized as a string.
    let payload = event
        .attributes
        .payload
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("user.created event carries no payload".into()))?;

    let document: Document<licensegen::User> = serde_json::from_str(payload)
        .map_err(|e| ApiError::BadRequest(format!("malformed user payload: {e}")))?;
    let user = document
        .data
        .ok_or_else(|| ApiError::BadRequest("user payload carries no data".into()))?;

    // Without a card token we cannot charge the user later on; stop before
    // any external call is made.
    let stripe_token = user
        .attributes
        .metadata
        .get("stripeToken")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| ApiError::MissingStripeToken {
            user_id: user.id.clone(),
        })?;

    let stage = ProvisioningState::TokenCollected {
        user_id: user.id.clone(),
        stripe_token: stripe_token.to_string(),
    };
    tracing::debug!(stage = %stage, user_id = %user.id, "Starting provisioning");

    let customer = state
        .stripe
        .create_customer(user.attributes.email.as_deref(), stripe_token, &user.id)
        .await?;

    let stage = ProvisioningState::CustomerCreated {
        user_id: user.id.clone(),
        customer_id: customer.id.clone(),
    };
    tracing::info!(
        stage = %stage,
        user_id = %user.id,
        customer_id = %customer.id,
        "Stripe customer created"
    );

    // Store the customer id back on the user. The customer already exists
    // at this point; a failure here is surfaced without compensation.
    state
        .licensegen
        .update_user_metadata(&user.id, &customer.id)
        .await?;

    tracing::info!(
        user_id = %user.id,
        customer_id = %customer.id,
        "Stripe customer id stored in user metadata"
    );

    Ok(())
}

/// Handle Stripe webhooks.
pub async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<WebhookResponse>, ApiError> {
    let delivered: StripeEvent =
        serde_json::from_str(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let Some(event) = resolve_stripe_event(&state, delivered).await else {
        tracing::info!("Ignoring unverifiable Stripe event");
        return Ok(acknowledge());
    };

    tracing::info!(
        event_id = ?event.id,
        event_type = %event.event_type,
        "Received Stripe webhook"
    );

    match event.event_type.as_str() {
        "customer.created" => handle_customer_created(&state, &event.data.object).await?,
        _ => {
            tracing::debug!(event_type = %event.event_type, "Unhandled Stripe event");
        }
    }

    Ok(acknowledge())
}

/// Resolve the authoritative Stripe event for a delivery.
async fn resolve_stripe_event(state: &AppState, delivered: StripeEvent) -> Option<StripeEvent> {
    match state.config.stripe_event_trust {
        EventTrust::TrustDirectly => Some(delivered),
        EventTrust::VerifyByRefetch => {
            let Some(event_id) = delivered.id.as_deref() else {
                tracing::warn!("Stripe event without an id cannot be re-fetched");
                return None;
            };
            match state.stripe.get_event(event_id).await {
                Ok(found) => found,
                Err(err) => {
                    tracing::warn!(
                        event_id = %event_id,
                        error = %err,
                        "Failed to re-fetch Stripe event"
                    );
                    None
                }
            }
        }
    }
}

/// Provision a subscription and a license for a newly created Stripe
/// customer.
async fn handle_customer_created(
    state: &AppState,
    object: &serde_json::Value,
) -> Result<(), ApiError> {
    let customer: Customer = serde_json::from_value(object.clone())
        .map_err(|e| ApiError::BadRequest(format!("malformed customer object: {e}")))?;

    // A customer without the back-reference was created outside this
    // integration's flow; provisioning cannot proceed.
    let user_id = customer
        .metadata
        .get("licensegenUserId")
        .cloned()
        .ok_or_else(|| ApiError::MissingLicensegenUserId {
            customer_id: customer.id.clone(),
        })?;

    // The LicenseGen user id doubles as the idempotency key: however many
    // times this webhook is redelivered, the customer is charged once.
    let subscription = state
        .stripe
        .create_subscription(&customer.id, &state.config.stripe_price_id, &user_id)
        .await?;

    let stage = ProvisioningState::SubscriptionCreated {
        user_id: user_id.clone(),
        customer_id: customer.id.clone(),
        subscription_id: subscription.id.clone(),
    };
    tracing::info!(
        stage = %stage,
        customer_id = %customer.id,
        subscription_id = %subscription.id,
        "Stripe subscription created"
    );

    let license = state
        .licensegen
        .create_license(
            &state.config.licensegen_policy_id,
            &user_id,
            &subscription.id,
        )
        .await
        .map_err(license_creation_error)?;

    let stage = ProvisioningState::LicenseIssued {
        user_id: user_id.clone(),
        subscription_id: subscription.id.clone(),
        license_id: license.id.clone(),
    };
    tracing::info!(
        stage = %stage,
        user_id = %user_id,
        license_id = %license.id,
        "License issued"
    );

    Ok(())
}

/// Map a license-creation failure to the 500-carrying error variant: the
/// customer has been billed by the time this call runs, so the failure must
/// be visible to the payment service rather than folded into a generic
/// upstream error.
fn license_creation_error(err: LicensegenError) -> ApiError {
    let details = match err {
        LicensegenError::Api { details } => details,
        other => other.to_string(),
    };
    ApiError::LicenseCreation { details }
}
