//! Gateway errors and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::AuthResponse;

/// Failure half of every auth gateway call. The display text is the message
/// sent to the client.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GatewayError {
    /// Missing fields or a short password, caught before reaching the
    /// provider. Answered like a provider credential rejection.
    #[error("{0}")]
    Validation(String),

    /// Request body that is not the expected JSON.
    #[error("{0}")]
    MalformedBody(String),

    /// Bad credentials, unconfirmed email, missing or invalid token.
    #[error("{0}")]
    Unauthorized(String),

    /// Provider unreachable or answered with something unexpected. The cause
    /// is logged where it happens; only the generic message goes out.
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            GatewayError::Validation(_) | GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(AuthResponse::failure(self.to_string()))).into_response()
    }
}
