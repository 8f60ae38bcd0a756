//! Stripe integration.
//!
//! Stripe handles:
//! - Customer records (one per provisioned LicenseGen user)
//! - Subscriptions against the fixed configured price
//! - The `customer.created` webhook driving the second provisioning step

pub mod client;
pub mod types;

pub use client::{StripeClient, StripeError};
pub use types::*;
