//! Error types for the observer API layer.
//!
//! [`ApiError`] unifies handler failure modes into a single enum that
//! converts into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use telemon_core::echo::EchoError;

/// Errors that can occur in the observer API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The echo rendezvous failed.
    #[error("echo error: {source}")]
    Echo {
        /// The underlying echo failure.
        #[from]
        source: EchoError,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // A timeout is a distinct, surfaced failure, never a hang.
            Self::Echo {
                source: EchoError::Timeout { .. },
            } => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
            Self::Echo {
                source: EchoError::Closed,
            } => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
