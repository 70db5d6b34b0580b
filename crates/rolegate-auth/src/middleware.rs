//! Authentication middleware for Axum

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, error};

use crate::context::{self, AuthStage, SubjectContext};
use crate::error::{AuthError, INTERNAL_SERVER_ERROR};
use crate::guard::RoleGate;
use crate::jwt::{TokenVerifier, extract_bearer_token};

/// Token verification middleware
///
/// Extracts the bearer token from the Authorization header and verifies it.
/// On success the [`SubjectContext`] is added to request extensions for the
/// role gates and handlers further down the stack.
pub async fn verify_token(
    State(verifier): State<Arc<TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let subject_id = authenticate(&verifier, &request)
        .map_err(|e| context::reject(AuthStage::Unauthenticated, e))?;

    debug!("Authenticated subject: {}", subject_id);
    context::accept(AuthStage::TokenVerified);

    request
        .extensions_mut()
        .insert(SubjectContext::verified(subject_id));

    Ok(next.run(request).await)
}

fn authenticate(verifier: &TokenVerifier, request: &Request) -> Result<i64, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AuthError::InvalidToken))
        .transpose()?;

    let token = extract_bearer_token(header)?;
    verifier.verify(token)
}

/// Role gate middleware
///
/// Must run after [`verify_token`]. The [`Authorized`](crate::Authorized)
/// outcome is added to request extensions.
pub async fn require_role(
    State(gate): State<RoleGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let subject = request
        .extensions()
        .get::<SubjectContext>()
        .copied()
        .ok_or_else(missing_context)?;

    let authorized = gate.check(&subject).await?;
    request.extensions_mut().insert(authorized);

    Ok(next.run(request).await)
}

/// Extractor for the subject verified by [`verify_token`]
pub struct VerifiedSubject(pub SubjectContext);

impl<S> FromRequestParts<S> for VerifiedSubject
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SubjectContext>()
            .copied()
            .map(VerifiedSubject)
            .ok_or_else(missing_context)
    }
}

fn missing_context() -> AuthError {
    error!("Route is guarded but the token verification middleware did not run");
    AuthError::Internal {
        message: INTERNAL_SERVER_ERROR,
    }
}
