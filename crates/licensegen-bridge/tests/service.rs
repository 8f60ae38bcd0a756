//! Landing page and health endpoint tests.

mod common;

use common::{TestHarness, ACCOUNT_ID};

#[tokio::test]
async fn landing_page_exposes_publishable_config() {
    let harness = TestHarness::new().await;

    let response = harness.server.get("/").await;
    response.assert_status_ok();

    let body = response.text();
    assert!(body.contains("pk_test_123"));
    assert!(body.contains(ACCOUNT_ID));
    // The secret key must never leak into the page
    assert!(!body.contains("sk_test_123"));
}

#[tokio::test]
async fn health_reports_ok() {
    let harness = TestHarness::new().await;

    let response = harness.server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "licensegen-bridge");
}
