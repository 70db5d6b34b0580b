//! Rolegate Authentication and Authorization
//!
//! This crate verifies JWT bearer tokens, resolves a subject's roles from
//! the credential store and decides whether a role requirement is met.

pub mod context;
pub mod error;
pub mod guard;
pub mod jwt;
pub mod middleware;
pub mod resolver;

pub use context::{AuthStage, Authorized, SubjectContext};
pub use error::AuthError;
pub use guard::{AuthorizationGuard, RoleGate, RoleRequirement};
pub use jwt::{Claims, TokenVerifier, extract_bearer_token};
pub use middleware::{VerifiedSubject, require_role, verify_token};
pub use resolver::{ResolveError, RoleResolver, RoleStore};
