//! Per-request authorization context

use rolegate_db::RoleSet;
use serde::Serialize;
use std::fmt;
use tracing::{error, warn};

use crate::error::AuthError;

/// Progress of a single authorization decision
///
/// `Unauthenticated -> TokenVerified -> RolesResolved`, ending in either an
/// [`Authorized`] value or a rejection recorded against the stage it left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    Unauthenticated,
    TokenVerified,
    RolesResolved,
}

impl AuthStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthStage::Unauthenticated => "unauthenticated",
            AuthStage::TokenVerified => "token_verified",
            AuthStage::RolesResolved => "roles_resolved",
        }
    }
}

impl fmt::Display for AuthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity attached to a request once its token has been checked
///
/// Only [`verify_token`](crate::verify_token) builds one, so holding a
/// `SubjectContext` means the token signature and validity window passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubjectContext {
    subject_id: i64,
}

impl SubjectContext {
    pub(crate) fn verified(subject_id: i64) -> Self {
        Self { subject_id }
    }

    pub fn subject_id(&self) -> i64 {
        self.subject_id
    }
}

/// Successful outcome of a role check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Authorized {
    pub subject_id: i64,
    pub roles: RoleSet,
}

/// Log and count a rejected decision, then hand the error back
pub(crate) fn reject(stage: AuthStage, err: AuthError) -> AuthError {
    match &err {
        AuthError::Internal { .. } => error!(stage = %stage, "Authorization failed: {}", err),
        _ => warn!(stage = %stage, "Authorization rejected: {}", err),
    }
    metrics::counter!(
        "rolegate_auth_decisions_total",
        "outcome" => "rejected",
        "stage" => stage.as_str()
    )
    .increment(1);
    err
}

/// Count a request that passed the given stage
pub(crate) fn accept(stage: AuthStage) {
    metrics::counter!(
        "rolegate_auth_decisions_total",
        "outcome" => "authorized",
        "stage" => stage.as_str()
    )
    .increment(1);
}
