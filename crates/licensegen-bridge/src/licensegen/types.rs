//! LicenseGen JSON:API types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Top-level JSON:API document: either a `data` resource or an `errors`
/// array, never meaningfully both.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Document<T> {
    /// Primary resource.
    #[serde(default)]
    pub data: Option<T>,
    /// Error objects, present when the request failed.
    #[serde(default)]
    pub errors: Option<Vec<ErrorObject>>,
}

/// JSON:API error object.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorObject {
    /// Short error title.
    #[serde(default)]
    pub title: Option<String>,
    /// Human-readable detail.
    #[serde(default)]
    pub detail: Option<String>,
    /// Application-specific error code.
    #[serde(default)]
    pub code: Option<String>,
}

/// Concatenate error details the way the API reports them, falling back to
/// titles for detail-less errors.
#[must_use]
pub fn concat_details(errors: &[ErrorObject]) -> String {
    errors
        .iter()
        .map(|e| {
            e.detail
                .as_deref()
                .or(e.title.as_deref())
                .unwrap_or("unknown error")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// A webhook event resource.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    /// Event id.
    pub id: String,
    /// Event attributes.
    pub attributes: WebhookEventAttributes,
}

/// Webhook event attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventAttributes {
    /// Event type, e.g. "user.created".
    pub event: String,
    /// The event's payload: a JSON:API document serialized as a string.
    #[serde(default)]
    pub payload: Option<String>,
}

/// A user resource.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// User id.
    pub id: String,
    /// User attributes.
    pub attributes: UserAttributes,
}

/// User attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct UserAttributes {
    /// User email.
    #[serde(default)]
    pub email: Option<String>,
    /// Arbitrary metadata; carries `stripeToken` before provisioning and
    /// `stripeCustomerId` after.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// A license resource.
#[derive(Debug, Clone, Deserialize)]
pub struct License {
    /// License id.
    pub id: String,
    /// License attributes.
    #[serde(default)]
    pub attributes: Option<LicenseAttributes>,
}

/// License attributes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LicenseAttributes {
    /// The license key issued by LicenseGen.
    #[serde(default)]
    pub key: Option<String>,
}

// --- Request bodies ---

/// PATCH body storing the Stripe customer back-reference on a user.
#[derive(Debug, Clone, Serialize)]
pub struct UserPatchRequest {
    /// Resource to patch.
    pub data: UserPatch,
}

/// User patch resource.
#[derive(Debug, Clone, Serialize)]
pub struct UserPatch {
    /// Resource type, always "users".
    #[serde(rename = "type")]
    pub kind: String,
    /// Patched attributes.
    pub attributes: UserPatchAttributes,
}

/// Patched user attributes.
#[derive(Debug, Clone, Serialize)]
pub struct UserPatchAttributes {
    /// Metadata to merge.
    pub metadata: CustomerRefMetadata,
}

/// Metadata mapping carrying the Stripe customer id.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerRefMetadata {
    /// Stripe customer id.
    #[serde(rename = "stripeCustomerId")]
    pub stripe_customer_id: String,
}

/// POST body creating a license.
#[derive(Debug, Clone, Serialize)]
pub struct CreateLicenseRequest {
    /// License resource to create.
    pub data: LicenseInput,
}

/// License creation resource.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseInput {
    /// Resource type, always "licenses".
    #[serde(rename = "type")]
    pub kind: String,
    /// License attributes.
    pub attributes: LicenseInputAttributes,
    /// Policy and user relationships.
    pub relationships: LicenseRelationships,
}

/// License creation attributes.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseInputAttributes {
    /// Metadata carrying the Stripe subscription id.
    pub metadata: SubscriptionRefMetadata,
}

/// Metadata mapping carrying the Stripe subscription id.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionRefMetadata {
    /// Stripe subscription id.
    #[serde(rename = "stripeSubscriptionId")]
    pub stripe_subscription_id: String,
}

/// License relationships.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseRelationships {
    /// Policy the license is issued under.
    pub policy: Relationship,
    /// User the license belongs to.
    pub user: Relationship,
}

/// A to-one JSON:API relationship.
#[derive(Debug, Clone, Serialize)]
pub struct Relationship {
    /// Linked resource identifier.
    pub data: ResourceIdentifier,
}

/// A JSON:API resource identifier.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceIdentifier {
    /// Resource type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Resource id.
    pub id: String,
}
