//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::guard::RoleRequirement;

/// Message returned for failures outside of any role check
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No token provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    SubjectNotFound,

    #[error("Requires {} role", .0.as_str())]
    Forbidden(RoleRequirement),

    /// Backend failure. `message` is the fixed text sent to the client; the
    /// underlying error is only logged.
    #[error("Internal error: {message}")]
    Internal { message: &'static str },
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken => StatusCode::FORBIDDEN,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::SubjectNotFound => StatusCode::NOT_FOUND,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "No token provided!",
            AuthError::InvalidToken => "Unauthorized!",
            AuthError::SubjectNotFound => "User not found",
            AuthError::Forbidden(requirement) => requirement.forbidden_message(),
            AuthError::Internal { message } => *message,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = axum::Json(json!({
            "message": self.message()
        }));

        (self.status_code(), body).into_response()
    }
}
