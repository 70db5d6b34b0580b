//! Request body validation

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::error::ApiError;

/// Field-level validation failures, keyed by field name
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// Request bodies that can check their own fields
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

/// JSON body extractor that rejects invalid input with a 400 response
///
/// Malformed JSON and bodies that fail [`Validate`] are both reported as
/// validation errors.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            let mut errors = ValidationErrors::default();
            errors.add("body", rejection.body_text());
            ApiError::Validation(errors)
        })?;

        value.validate().map_err(|errors| {
            debug!("Request body rejected: {}", errors);
            ApiError::Validation(errors)
        })?;

        Ok(ValidatedJson(value))
    }
}
