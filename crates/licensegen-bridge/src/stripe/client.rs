//! Stripe API client implementation.

use std::time::Duration;

use reqwest::Client;

use super::types::{Customer, StripeErrorResponse, StripeEvent, Subscription};

/// Error type for Stripe operations.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe API returned an error.
    #[error("Stripe API error: {error_type} - {message}")]
    Api {
        /// Error type.
        error_type: String,
        /// Error message.
        message: String,
        /// Error code.
        code: Option<String>,
    },
}

/// Stripe API client.
#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl StripeClient {
    /// Create a new Stripe client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Stripe API URL (e.g., `"https://api.stripe.com/v1"`)
    /// * `api_key` - Stripe secret API key (`sk_test_...` or `sk_live_...`)
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, StripeError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Create a Stripe customer for a LicenseGen user.
    ///
    /// The card token collected at signup becomes the customer's payment
    /// source, and the LicenseGen user id is stored in the customer's
    /// metadata so the `customer.created` webhook can find its way back.
    pub async fn create_customer(
        &self,
        email: Option<&str>,
        source: &str,
        licensegen_user_id: &str,
    ) -> Result<Customer, StripeError> {
        let mut params = vec![
            ("source", source.to_string()),
            (
                "metadata[licensegenUserId]",
                licensegen_user_id.to_string(),
            ),
        ];

        if let Some(email) = email {
            params.push(("email", email.to_string()));
            params.push((
                "description",
                format!("Customer for LicenseGen user {email}"),
            ));
        }

        let response = self
            .client
            .post(format!("{}/customers", self.base_url))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .form(&params)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Create a subscription for a customer against the given price.
    ///
    /// `idempotency_key` is passed through to Stripe so repeated webhook
    /// deliveries for the same underlying event return the original
    /// subscription instead of creating (and charging) a second one.
    pub async fn create_subscription(
        &self,
        customer_id: &str,
        price_id: &str,
        idempotency_key: &str,
    ) -> Result<Subscription, StripeError> {
        let params = [
            ("customer", customer_id.to_string()),
            ("items[0][price]", price_id.to_string()),
        ];

        let response = self
            .client
            .post(format!("{}/subscriptions", self.base_url))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .header("Idempotency-Key", idempotency_key)
            .form(&params)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Retrieve an event by ID, for the refetch trust policy.
    ///
    /// Returns `Ok(None)` when Stripe does not know the event.
    pub async fn get_event(&self, event_id: &str) -> Result<Option<StripeEvent>, StripeError> {
        let response = self
            .client
            .get(format!("{}/events/{}", self.base_url, event_id))
            .basic_auth(&self.api_key, Option::<&str>::None)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        self.handle_response(response).await.map(Some)
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse the Stripe error envelope
        let error_body: Result<StripeErrorResponse, _> = response.json().await;

        match error_body {
            Ok(stripe_error) => Err(StripeError::Api {
                error_type: stripe_error.error.error_type,
                message: stripe_error.error.message,
                code: stripe_error.error.code,
            }),
            Err(_) => Err(StripeError::Api {
                error_type: "unknown".to_string(),
                message: format!("HTTP {status}"),
                code: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_trims_trailing_slash() {
        let client = StripeClient::new("https://api.stripe.com/v1/", "sk_test_xxx").unwrap();
        assert_eq!(client.base_url, "https://api.stripe.com/v1");
    }
}
