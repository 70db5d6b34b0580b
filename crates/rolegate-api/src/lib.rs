//! Rolegate REST API
//!
//! This crate provides the Axum-based HTTP surface for Rolegate: token
//! verification and role gates applied to the content and user routes.

pub mod error;
pub mod routes;
pub mod state;
pub mod validation;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
pub use validation::{Validate, ValidatedJson, ValidationErrors};
