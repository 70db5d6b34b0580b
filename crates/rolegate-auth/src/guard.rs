//! Role-based authorization guard

use rolegate_db::{RoleName, RoleSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use crate::context::{self, AuthStage, Authorized, SubjectContext};
use crate::error::AuthError;
use crate::resolver::{ResolveError, RoleResolver, RoleStore};

/// Role requirement declared by a guarded operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleRequirement {
    Admin,
    Moderator,
    ModeratorOrAdmin,
}

impl RoleRequirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleRequirement::Admin => "admin",
            RoleRequirement::Moderator => "moderator",
            RoleRequirement::ModeratorOrAdmin => "moderator-or-admin",
        }
    }

    /// Roles of which the subject must hold at least one
    pub fn accepted_roles(&self) -> &'static [RoleName] {
        match self {
            RoleRequirement::Admin => &[RoleName::Admin],
            RoleRequirement::Moderator => &[RoleName::Moderator],
            RoleRequirement::ModeratorOrAdmin => &[RoleName::Moderator, RoleName::Admin],
        }
    }

    pub fn is_satisfied_by(&self, roles: &RoleSet) -> bool {
        self.accepted_roles().iter().any(|role| roles.contains(role))
    }

    pub fn forbidden_message(&self) -> &'static str {
        match self {
            RoleRequirement::Admin => "Require admin Role!",
            RoleRequirement::Moderator => "Require Moderator Role!",
            RoleRequirement::ModeratorOrAdmin => "Require Moderator or Admin Role!",
        }
    }

    pub fn internal_error_message(&self) -> &'static str {
        match self {
            RoleRequirement::Admin => "Error checking Admin role.",
            RoleRequirement::Moderator => "Error checking Moderator role.",
            RoleRequirement::ModeratorOrAdmin => "Error checking roles.",
        }
    }
}

/// Decides whether a verified subject meets a [`RoleRequirement`]
#[derive(Clone)]
pub struct AuthorizationGuard {
    resolver: RoleResolver,
}

impl AuthorizationGuard {
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self {
            resolver: RoleResolver::new(store),
        }
    }

    /// Resolve the subject's roles and evaluate the requirement
    pub async fn authorize(
        &self,
        subject: &SubjectContext,
        requirement: RoleRequirement,
    ) -> Result<Authorized, AuthError> {
        let subject_id = subject.subject_id();
        let roles = match self.resolver.resolve(subject_id).await {
            Ok(roles) => roles,
            Err(ResolveError::SubjectNotFound(_)) => {
                return Err(context::reject(AuthStage::TokenVerified, AuthError::SubjectNotFound));
            }
            Err(ResolveError::Store(e)) => {
                error!("Role lookup for subject {} failed: {:?}", subject_id, e);
                return Err(context::reject(
                    AuthStage::TokenVerified,
                    AuthError::Internal {
                        message: requirement.internal_error_message(),
                    },
                ));
            }
        };

        if !requirement.is_satisfied_by(&roles) {
            return Err(context::reject(
                AuthStage::RolesResolved,
                AuthError::Forbidden(requirement),
            ));
        }

        debug!(
            "Subject {} authorized for {} requirement",
            subject_id,
            requirement.as_str()
        );
        context::accept(AuthStage::RolesResolved);

        Ok(Authorized { subject_id, roles })
    }

    /// Bind this guard to a requirement, for use as route middleware state
    pub fn gate(&self, requirement: RoleRequirement) -> RoleGate {
        RoleGate {
            guard: self.clone(),
            requirement,
        }
    }
}

/// An [`AuthorizationGuard`] bound to the requirement of one route
#[derive(Clone)]
pub struct RoleGate {
    guard: AuthorizationGuard,
    requirement: RoleRequirement,
}

impl RoleGate {
    pub fn requirement(&self) -> RoleRequirement {
        self.requirement
    }

    pub async fn check(&self, subject: &SubjectContext) -> Result<Authorized, AuthError> {
        self.guard.authorize(subject, self.requirement).await
    }
}
