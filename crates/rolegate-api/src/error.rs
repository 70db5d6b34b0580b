//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::validation::ValidationErrors;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error")]
    Validation(ValidationErrors),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] rolegate_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] rolegate_auth::AuthError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "message": "Validation error",
                    "errors": errors,
                }),
            ),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Internal Server Error" }),
                )
            }
            ApiError::Database(e) => match e {
                rolegate_db::DbError::NotFound(msg) => {
                    (StatusCode::NOT_FOUND, json!({ "message": msg }))
                }
                e => {
                    error!("Database error: {:?}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "message": "Internal Server Error" }),
                    )
                }
            },
            ApiError::Auth(e) => return e.into_response(),
        };

        (status, axum::Json(body)).into_response()
    }
}
