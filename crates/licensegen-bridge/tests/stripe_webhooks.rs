//! Stripe webhook integration tests.

mod common;

use axum::http::StatusCode;
use common::{TestHarness, ACCOUNT_ID, POLICY_ID};
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

/// Build a `customer.created` event envelope for the given customer object.
fn customer_created_event(event_id: &str, customer: serde_json::Value) -> serde_json::Value {
    json!({
        "id": event_id,
        "type": "customer.created",
        "data": { "object": customer }
    })
}

// ============================================================================
// customer.created provisioning
// ============================================================================

#[tokio::test]
async fn provisions_subscription_and_license_for_new_customer() {
    let harness = TestHarness::new().await;

    // The LicenseGen user id is the idempotency key for the subscription
    Mock::given(method("POST"))
        .and(path("/subscriptions"))
        .and(header("Idempotency-Key", "u1"))
        .and(body_string_contains("customer=cus_1"))
        .and(body_string_contains("items%5B0%5D%5Bprice%5D=price_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": "active"
        })))
        .expect(1)
        .mount(&harness.stripe)
        .await;

    // The license links the fixed policy, the resolved user and the new
    // subscription
    Mock::given(method("POST"))
        .and(path(format!("/v1/accounts/{ACCOUNT_ID}/licenses")))
        .and(body_partial_json(json!({
            "data": {
                "type": "licenses",
                "attributes": { "metadata": { "stripeSubscriptionId": "sub_1" } },
                "relationships": {
                    "policy": { "data": { "type": "policies", "id": POLICY_ID } },
                    "user": { "data": { "type": "users", "id": "u1" } }
                }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {
                "type": "licenses",
                "id": "lic_1",
                "attributes": { "key": "AAAA-BBBB-CCCC-DDDD" }
            }
        })))
        .expect(1)
        .mount(&harness.licensegen)
        .await;

    let response = harness
        .server
        .post("/stripe-webhooks")
        .json(&customer_created_event(
            "evt_s1",
            json!({
                "id": "cus_1",
                "object": "customer",
                "email": "user@example.com",
                "metadata": { "licensegenUserId": "u1" }
            }),
        ))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn customer_without_user_id_is_rejected_before_any_call() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/stripe-webhooks")
        .json(&customer_created_event(
            "evt_s2",
            json!({
                "id": "cus_stranger",
                "object": "customer",
                "metadata": {}
            }),
        ))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    harness.assert_no_stripe_calls().await;
    harness.assert_no_licensegen_calls().await;
}

#[tokio::test]
async fn license_creation_failure_returns_500_after_subscription() {
    let harness = TestHarness::new().await;

    Mock::given(method("POST"))
        .and(path("/subscriptions"))
        .and(header("Idempotency-Key", "u3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "sub_3",
            "customer": "cus_3",
            "status": "active"
        })))
        .expect(1)
        .mount(&harness.stripe)
        .await;

    // The customer has been billed by now; the failure must be loud
    Mock::given(method("POST"))
        .and(path(format!("/v1/accounts/{ACCOUNT_ID}/licenses")))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": [
                { "title": "Unprocessable", "detail": "policy not found" }
            ]
        })))
        .expect(1)
        .mount(&harness.licensegen)
        .await;

    let response = harness
        .server
        .post("/stripe-webhooks")
        .json(&customer_created_event(
            "evt_s3",
            json!({
                "id": "cus_3",
                "object": "customer",
                "metadata": { "licensegenUserId": "u3" }
            }),
        ))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "license_creation_failed");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("policy not found"));
}

#[tokio::test]
async fn unknown_event_types_are_acknowledged_without_side_effects() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/stripe-webhooks")
        .json(&json!({
            "id": "evt_s4",
            "type": "invoice.payment_succeeded",
            "data": { "object": { "id": "in_1" } }
        }))
        .await;

    response.assert_status_ok();
    harness.assert_no_stripe_calls().await;
    harness.assert_no_licensegen_calls().await;
}

#[tokio::test]
async fn duplicate_deliveries_reuse_the_same_idempotency_key() {
    let harness = TestHarness::new().await;

    // Stripe deduplicates on the key; the bridge must send the identical
    // key for every redelivery of the same underlying event.
    Mock::given(method("POST"))
        .and(path("/subscriptions"))
        .and(header("Idempotency-Key", "u7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "sub_7",
            "customer": "cus_7",
            "status": "active"
        })))
        .expect(2)
        .mount(&harness.stripe)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/accounts/{ACCOUNT_ID}/licenses")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "type": "licenses", "id": "lic_7" }
        })))
        .expect(2)
        .mount(&harness.licensegen)
        .await;

    let event_id = format!("evt_{}", uuid::Uuid::new_v4());
    let event = customer_created_event(
        &event_id,
        json!({
            "id": "cus_7",
            "object": "customer",
            "metadata": { "licensegenUserId": "u7" }
        }),
    );

    for _ in 0..2 {
        let response = harness.server.post("/stripe-webhooks").json(&event).await;
        response.assert_status_ok();
    }
}

// ============================================================================
// Refetch trust policy
// ============================================================================

#[tokio::test]
async fn refetch_trust_acts_on_the_fetched_event_not_the_delivery() {
    use licensegen_bridge::EventTrust;

    let harness =
        TestHarness::with_trust(EventTrust::VerifyByRefetch, EventTrust::VerifyByRefetch).await;

    // The authoritative event carries the real customer object
    Mock::given(method("GET"))
        .and(path("/events/evt_s9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(customer_created_event(
            "evt_s9",
            json!({
                "id": "cus_9",
                "object": "customer",
                "metadata": { "licensegenUserId": "u9" }
            }),
        )))
        .expect(1)
        .mount(&harness.stripe)
        .await;

    Mock::given(method("POST"))
        .and(path("/subscriptions"))
        .and(header("Idempotency-Key", "u9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "sub_9",
            "customer": "cus_9",
            "status": "active"
        })))
        .expect(1)
        .mount(&harness.stripe)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/accounts/{ACCOUNT_ID}/licenses")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "type": "licenses", "id": "lic_9" }
        })))
        .expect(1)
        .mount(&harness.licensegen)
        .await;

    // The delivered payload is spoofed: the customer object is empty. Only
    // the re-fetched event may be acted on.
    let response = harness
        .server
        .post("/stripe-webhooks")
        .json(&customer_created_event("evt_s9", json!({ "id": "cus_fake" })))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn refetch_trust_ignores_events_stripe_does_not_know() {
    use licensegen_bridge::EventTrust;

    let harness =
        TestHarness::with_trust(EventTrust::VerifyByRefetch, EventTrust::VerifyByRefetch).await;

    Mock::given(method("GET"))
        .and(path("/events/evt_unknown"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "type": "invalid_request_error", "message": "No such event" }
        })))
        .expect(1)
        .mount(&harness.stripe)
        .await;

    let response = harness
        .server
        .post("/stripe-webhooks")
        .json(&customer_created_event("evt_unknown", json!({ "id": "cus_x" })))
        .await;

    response.assert_status_ok();
    harness.assert_no_licensegen_calls().await;

    // Only the re-fetch reached Stripe; no subscription was attempted
    let requests = harness.stripe.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
}
