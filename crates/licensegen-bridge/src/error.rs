//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::licensegen::LicensegenError;
use crate::stripe::StripeError;

/// API error type.
///
/// Every handler returns `Result<_, ApiError>` so the request layer always
/// sends exactly one response; nothing escapes to a global catch-all.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request - malformed or unparsable payload.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A LicenseGen user reached provisioning without a stored card token.
    #[error("user {user_id} has no Stripe token attached to their account")]
    MissingStripeToken {
        /// LicenseGen user id.
        user_id: String,
    },

    /// A Stripe customer arrived without the LicenseGen back-reference,
    /// meaning it was created outside this integration's flow.
    #[error("customer {customer_id} has no LicenseGen user id attached to their account")]
    MissingLicensegenUserId {
        /// Stripe customer id.
        customer_id: String,
    },

    /// A Stripe API call failed.
    #[error(transparent)]
    Stripe(#[from] StripeError),

    /// A LicenseGen API call failed.
    #[error(transparent)]
    Licensegen(#[from] LicensegenError),

    /// License creation failed after the subscription was already created.
    ///
    /// The customer has been billed at this point; the 500 surfaces the
    /// failure to the payment service so the operator gets visibility.
    #[error("license creation failed: {details}")]
    LicenseCreation {
        /// Concatenated API error details.
        details: String,
    },
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::MissingStripeToken { .. } | Self::MissingLicensegenUserId { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "precondition_failed")
            }
            Self::Stripe(_) | Self::Licensegen(_) => {
                (StatusCode::BAD_GATEWAY, "external_service_error")
            }
            Self::LicenseCreation { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "license_creation_failed")
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}
