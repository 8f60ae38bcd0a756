//! Application state.

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::licensegen::{LicensegenClient, LicensegenError};
use crate::stripe::{StripeClient, StripeError};

/// Error raised while building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The LicenseGen client could not be built.
    #[error(transparent)]
    Licensegen(#[from] LicensegenError),

    /// The Stripe client could not be built.
    #[error(transparent)]
    Stripe(#[from] StripeError),
}

/// Application state shared across handlers.
///
/// Everything here is immutable after startup; concurrent requests share it
/// by reference and hold no other state.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: ServiceConfig,

    /// LicenseGen client.
    pub licensegen: Arc<LicensegenClient>,

    /// Stripe client.
    pub stripe: Arc<StripeClient>,
}

impl AppState {
    /// Create a new application state, constructing one client per external
    /// service. Both services are required: the bridge is inoperable
    /// without either side.
    pub fn new(config: ServiceConfig) -> Result<Self, StateError> {
        let licensegen = LicensegenClient::new(
            &config.licensegen_api_url,
            &config.licensegen_account_id,
            &config.licensegen_product_token,
        )?;

        let stripe = StripeClient::new(&config.stripe_api_url, &config.stripe_secret_key)?;

        Ok(Self {
            config,
            licensegen: Arc::new(licensegen),
            stripe: Arc::new(stripe),
        })
    }
}
