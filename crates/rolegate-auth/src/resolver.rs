//! Role resolution

use async_trait::async_trait;
use rolegate_db::{Database, DbError, RoleSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Read access to the roles assigned to a subject
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Load the subject's roles in a single read
    ///
    /// Returns `None` when the subject does not exist.
    async fn find_roles(&self, subject_id: i64) -> Result<Option<RoleSet>, DbError>;
}

#[async_trait]
impl RoleStore for Database {
    async fn find_roles(&self, subject_id: i64) -> Result<Option<RoleSet>, DbError> {
        Ok(self
            .get_user_with_roles(subject_id)
            .await?
            .map(|user| user.roles))
    }
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Subject {0} not found")]
    SubjectNotFound(i64),

    #[error("Role store error: {0}")]
    Store(#[from] DbError),
}

/// Resolves a subject's role set from a [`RoleStore`]
///
/// Every call reads the store; nothing is cached between requests.
#[derive(Clone)]
pub struct RoleResolver {
    store: Arc<dyn RoleStore>,
}

impl RoleResolver {
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, subject_id: i64) -> Result<RoleSet, ResolveError> {
        let roles = self
            .store
            .find_roles(subject_id)
            .await?
            .ok_or(ResolveError::SubjectNotFound(subject_id))?;

        debug!("Resolved {} role(s) for subject {}", roles.len(), subject_id);
        Ok(roles)
    }
}
