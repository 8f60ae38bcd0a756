//! LicenseGen integration.
//!
//! LicenseGen is the source of truth for users, policies and licenses. The
//! bridge talks to its JSON:API surface for three things:
//! - re-fetching webhook events to validate inbound notifications
//! - patching the Stripe customer id into a user's metadata
//! - issuing licenses against the configured policy

pub mod client;
pub mod types;

pub use client::{LicensegenClient, LicensegenError};
pub use types::*;
