//! LicenseGen API client implementation.

use std::time::Duration;

use reqwest::Client;

use super::types::{
    concat_details, CreateLicenseRequest, CustomerRefMetadata, Document, License, LicenseInput,
    LicenseInputAttributes, LicenseRelationships, Relationship, ResourceIdentifier,
    SubscriptionRefMetadata, User, UserPatch, UserPatchAttributes, UserPatchRequest, WebhookEvent,
};

/// JSON:API media type used by the LicenseGen API.
const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Error type for LicenseGen operations.
#[derive(Debug, thiserror::Error)]
pub enum LicensegenError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// LicenseGen API returned an error document.
    #[error("LicenseGen API error: {details}")]
    Api {
        /// Concatenated error details.
        details: String,
    },

    /// LicenseGen returned a document with neither data nor errors.
    #[error("LicenseGen returned an empty document")]
    EmptyDocument,
}

/// LicenseGen API client.
#[derive(Debug, Clone)]
pub struct LicensegenClient {
    client: Client,
    base_url: String,
    account_id: String,
    product_token: String,
}

impl LicensegenClient {
    /// Create a new LicenseGen client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - LicenseGen API URL (e.g., `"https://licensegen-api.focusapps.app"`)
    /// * `account_id` - Account id, part of every API path
    /// * `product_token` - Product token used as the bearer credential
    pub fn new(
        base_url: impl Into<String>,
        account_id: impl Into<String>,
        product_token: impl Into<String>,
    ) -> Result<Self, LicensegenError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            account_id: account_id.into(),
            product_token: product_token.into(),
        })
    }

    /// Fetch a webhook event by id to validate it and get its most
    /// up-to-date state.
    ///
    /// Returns `Ok(None)` when the API responds with an error document:
    /// the event does not exist, so the notification was not sent by
    /// LicenseGen and is not an event we care about.
    pub async fn get_webhook_event(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEvent>, LicensegenError> {
        let url = format!(
            "{}/v1/accounts/{}/webhook-events/{}",
            self.base_url, self.account_id, event_id
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.product_token))
            .header("Accept", JSON_API_MEDIA_TYPE)
            .send()
            .await?;

        let document: Document<WebhookEvent> = response.json().await?;
        if document.errors.is_some() {
            return Ok(None);
        }

        Ok(document.data)
    }

    /// Store a user's Stripe customer id in their metadata so the customer
    /// account can be looked up later.
    pub async fn update_user_metadata(
        &self,
        user_id: &str,
        stripe_customer_id: &str,
    ) -> Result<User, LicensegenError> {
        let url = format!(
            "{}/v1/accounts/{}/users/{}",
            self.base_url, self.account_id, user_id
        );

        let request = UserPatchRequest {
            data: UserPatch {
                kind: "users".to_string(),
                attributes: UserPatchAttributes {
                    metadata: CustomerRefMetadata {
                        stripe_customer_id: stripe_customer_id.to_string(),
                    },
                },
            },
        };

        let response = self
            .client
            .patch(&url)
            .header("Authorization", format!("Bearer {}", self.product_token))
            .header("Content-Type", JSON_API_MEDIA_TYPE)
            .header("Accept", JSON_API_MEDIA_TYPE)
            .json(&request)
            .send()
            .await?;

        self.handle_document(response).await
    }

    /// Create a license under the given policy for the given user, storing
    /// the Stripe subscription id in the license metadata.
    pub async fn create_license(
        &self,
        policy_id: &str,
        user_id: &str,
        stripe_subscription_id: &str,
    ) -> Result<License, LicensegenError> {
        let url = format!("{}/v1/accounts/{}/licenses", self.base_url, self.account_id);

        let request = CreateLicenseRequest {
            data: LicenseInput {
                kind: "licenses".to_string(),
                attributes: LicenseInputAttributes {
                    metadata: SubscriptionRefMetadata {
                        stripe_subscription_id: stripe_subscription_id.to_string(),
                    },
                },
                relationships: LicenseRelationships {
                    policy: Relationship {
                        data: ResourceIdentifier {
                            kind: "policies".to_string(),
                            id: policy_id.to_string(),
                        },
                    },
                    user: Relationship {
                        data: ResourceIdentifier {
                            kind: "users".to_string(),
                            id: user_id.to_string(),
                        },
                    },
                },
            },
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.product_token))
            .header("Content-Type", JSON_API_MEDIA_TYPE)
            .header("Accept", JSON_API_MEDIA_TYPE)
            .json(&request)
            .send()
            .await?;

        self.handle_document(response).await
    }

    /// Decode a JSON:API document, surfacing error objects as a
    /// concatenated detail string.
    async fn handle_document<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, LicensegenError> {
        let document: Document<T> = response.json().await?;

        if let Some(errors) = document.errors {
            return Err(LicensegenError::Api {
                details: concat_details(&errors),
            });
        }

        document.data.ok_or(LicensegenError::EmptyDocument)
    }
}
