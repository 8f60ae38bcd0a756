//! LicenseGen Bridge - webhook-driven provisioning between LicenseGen and
//! Stripe.
//!
//! This is the main entry point for the bridge service.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use licensegen_bridge::{create_router, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,licensegen_bridge=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LicenseGen Bridge");

    // Load configuration from environment
    let config = ServiceConfig::from_env()?;

    tracing::info!(
        listen_addr = %config.listen_addr,
        licensegen_api_url = %config.licensegen_api_url,
        licensegen_event_trust = %config.licensegen_event_trust,
        stripe_api_url = %config.stripe_api_url,
        stripe_event_trust = %config.stripe_event_trust,
        "Service configuration loaded"
    );

    // Build app state (one client per external service)
    let state = AppState::new(config.clone())?;

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
