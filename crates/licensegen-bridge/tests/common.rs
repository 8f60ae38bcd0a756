//! Common test utilities for bridge integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use axum::Router;
use axum_test::TestServer;
use wiremock::MockServer;

use licensegen_bridge::{create_router, AppState, EventTrust, ServiceConfig};

/// Account id used by every test configuration.
pub const ACCOUNT_ID: &str = "acct_test";

/// Policy id every test license is issued under.
pub const POLICY_ID: &str = "policy_test";

/// Price id every test subscription is created against.
pub const PRICE_ID: &str = "price_test";

/// Product token used as the bearer credential in tests.
pub const PRODUCT_TOKEN: &str = "prod-token-test";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Mock LicenseGen API.
    pub licensegen: MockServer,
    /// Mock Stripe API.
    pub stripe: MockServer,
}

impl TestHarness {
    /// Create a harness with the default trust policies (refetch for
    /// LicenseGen, direct for Stripe).
    pub async fn new() -> Self {
        Self::with_trust(EventTrust::VerifyByRefetch, EventTrust::TrustDirectly).await
    }

    /// Create a harness with explicit trust policies per source.
    pub async fn with_trust(licensegen_trust: EventTrust, stripe_trust: EventTrust) -> Self {
        let licensegen = MockServer::start().await;
        let stripe = MockServer::start().await;

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            stripe_publishable_key: "pk_test_123".into(),
            stripe_secret_key: "sk_test_123".into(),
            stripe_price_id: PRICE_ID.into(),
            stripe_api_url: stripe.uri(),
            stripe_event_trust: stripe_trust,
            licensegen_api_url: licensegen.uri(),
            licensegen_product_token: PRODUCT_TOKEN.into(),
            licensegen_account_id: ACCOUNT_ID.into(),
            licensegen_policy_id: POLICY_ID.into(),
            licensegen_event_trust: licensegen_trust,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(config).expect("Failed to build app state");
        let router: Router = create_router(state);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            licensegen,
            stripe,
        }
    }

    /// Assert that no request reached the mock Stripe API.
    pub async fn assert_no_stripe_calls(&self) {
        let requests = self.stripe.received_requests().await.unwrap_or_default();
        assert!(
            requests.is_empty(),
            "expected no Stripe calls, got {}",
            requests.len()
        );
    }

    /// Assert that no request reached the mock LicenseGen API.
    pub async fn assert_no_licensegen_calls(&self) {
        let requests = self.licensegen.received_requests().await.unwrap_or_default();
        assert!(
            requests.is_empty(),
            "expected no LicenseGen calls, got {}",
            requests.len()
        );
    }
}

/// Build a JSON:API webhook-event document as returned by the re-fetch
/// endpoint.
#[must_use]
pub fn webhook_event_doc(
    event_id: &str,
    event_type: &str,
    payload: Option<&serde_json::Value>,
) -> serde_json::Value {
    let mut attributes = serde_json::json!({ "event": event_type });
    if let Some(payload) = payload {
        attributes["payload"] = serde_json::Value::String(payload.to_string());
    }

    serde_json::json!({
        "data": {
            "type": "webhook-events",
            "id": event_id,
            "attributes": attributes
        }
    })
}

/// Build the user document embedded in a `user.created` event payload.
#[must_use]
pub fn user_payload(user_id: &str, email: &str, metadata: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "data": {
            "type": "users",
            "id": user_id,
            "attributes": {
                "email": email,
                "metadata": metadata
            }
        }
    })
}
