//! Application state

use rolegate_auth::{AuthorizationGuard, RoleGate, RoleRequirement, TokenVerifier};
use rolegate_db::Database;
use std::sync::Arc;

/// Prometheus handle used to render the `/metrics` endpoint
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub verifier: Arc<TokenVerifier>,
    pub guard: AuthorizationGuard,
}

impl AppState {
    pub fn new(db: Database, jwt_secret: &str) -> Self {
        let guard = AuthorizationGuard::new(Arc::new(db.clone()));
        Self {
            db,
            verifier: Arc::new(TokenVerifier::new(jwt_secret)),
            guard,
        }
    }

    /// Role gate bound to `requirement`, backed by this state's store
    pub fn gate(&self, requirement: RoleRequirement) -> RoleGate {
        self.guard.gate(requirement)
    }
}
