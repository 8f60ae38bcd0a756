//! LicenseGen ↔ Stripe provisioning bridge.
//!
//! This crate bridges two external SaaS platforms by reacting to webhook
//! notifications from each and issuing corresponding API calls to the
//! other:
//!
//! - A LicenseGen `user.created` event provisions a Stripe customer from
//!   the card token stored in the user's metadata, then writes the customer
//!   id back onto the user.
//! - A Stripe `customer.created` event creates a subscription (idempotent
//!   on the LicenseGen user id) and then issues a LicenseGen license linked
//!   to it.
//!
//! All state lives in the two external services; the bridge itself is
//! stateless request handling plus two API clients.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Handlers and clients all return Result
#![allow(clippy::unused_async)] // Handlers need async for the router signature

pub mod config;
pub mod error;
pub mod handlers;
pub mod licensegen;
pub mod provision;
pub mod routes;
pub mod state;
pub mod stripe;

pub use config::{ConfigError, ServiceConfig};
pub use error::ApiError;
pub use licensegen::{LicensegenClient, LicensegenError};
pub use provision::{EventTrust, ProvisioningState};
pub use routes::create_router;
pub use state::AppState;
pub use stripe::{StripeClient, StripeError};
