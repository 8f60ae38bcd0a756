//! Service configuration.

use crate::provision::EventTrust;

/// Default LicenseGen API base URL.
const DEFAULT_LICENSEGEN_API_URL: &str = "https://licensegen-api.focusapps.app";

/// Default Stripe API base URL.
const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com/v1";

/// Configuration error raised during startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing or empty.
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// An environment variable holds a value that cannot be parsed.
    #[error("invalid value for {name}: {message}")]
    InvalidVar {
        /// Variable name.
        name: &'static str,
        /// Why the value was rejected.
        message: String,
    },
}

/// Service configuration, loaded once at startup and shared immutably.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Stripe publishable key, exposed to the landing page.
    pub stripe_publishable_key: String,

    /// Stripe secret API key.
    pub stripe_secret_key: String,

    /// Fixed Stripe price id every subscription is created against.
    pub stripe_price_id: String,

    /// Stripe API base URL (overridable for tests).
    pub stripe_api_url: String,

    /// Trust policy for inbound Stripe events (default: direct).
    pub stripe_event_trust: EventTrust,

    /// LicenseGen API base URL (overridable for tests).
    pub licensegen_api_url: String,

    /// LicenseGen product token used as the bearer credential.
    pub licensegen_product_token: String,

    /// LicenseGen account id, part of every API path.
    pub licensegen_account_id: String,

    /// Fixed LicenseGen policy id every license is issued under.
    pub licensegen_policy_id: String,

    /// Trust policy for inbound LicenseGen events (default: refetch).
    pub licensegen_event_trust: EventTrust,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Server-side request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables fail fast with a named [`ConfigError`] instead of
    /// surfacing as a missing value deep inside a request.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            listen_addr: optional("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:8080".into()),
            stripe_publishable_key: required("STRIPE_PUBLISHABLE_KEY")?,
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_price_id: required("STRIPE_PRICE_ID")?,
            stripe_api_url: optional("STRIPE_API_URL")
                .unwrap_or_else(|| DEFAULT_STRIPE_API_URL.into()),
            stripe_event_trust: trust_policy("STRIPE_EVENT_TRUST", EventTrust::TrustDirectly)?,
            licensegen_api_url: optional("LICENSEGEN_API_URL")
                .unwrap_or_else(|| DEFAULT_LICENSEGEN_API_URL.into()),
            licensegen_product_token: required("LICENSEGEN_PRODUCT_TOKEN")?,
            licensegen_account_id: required("LICENSEGEN_ACCOUNT_ID")?,
            licensegen_policy_id: required("LICENSEGEN_POLICY_ID")?,
            licensegen_event_trust: trust_policy(
                "LICENSEGEN_EVENT_TRUST",
                EventTrust::VerifyByRefetch,
            )?,
            max_body_bytes: parsed("MAX_BODY_BYTES")?.unwrap_or(1024 * 1024),
            request_timeout_seconds: parsed("REQUEST_TIMEOUT_SECONDS")?.unwrap_or(30),
        })
    }
}

/// Read an optional variable, treating empty values as unset.
fn optional(name: &'static str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read a required variable.
fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::MissingVar(name))
}

/// Read and parse an optional numeric variable.
fn parsed<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    optional(name)
        .map(|v| {
            v.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
                name,
                message: e.to_string(),
            })
        })
        .transpose()
}

/// Read an optional trust policy variable, falling back to `default`.
fn trust_policy(name: &'static str, default: EventTrust) -> Result<EventTrust, ConfigError> {
    optional(name)
        .map(|v| {
            v.parse().map_err(
                |e: crate::provision::ParseEventTrustError| ConfigError::InvalidVar {
                    name,
                    message: e.to_string(),
                },
            )
        })
        .transpose()
        .map(|parsed| parsed.unwrap_or(default))
}
