//! Content endpoints, one per access level

use axum::{Router, middleware, routing::get};
use rolegate_auth::{RoleRequirement, VerifiedSubject, require_role, verify_token};
use tracing::debug;

use crate::state::AppState;

/// GET /api/test/all
async fn all_access() -> &'static str {
    "Public Content."
}

/// GET /api/test/user
async fn user_board(VerifiedSubject(subject): VerifiedSubject) -> &'static str {
    debug!("User board requested by subject {}", subject.subject_id());
    "User Content."
}

/// GET /api/test/mod
async fn moderator_board() -> &'static str {
    "Moderator Content."
}

/// GET /api/test/admin
async fn admin_board() -> &'static str {
    "Admin Content."
}

/// GET /api/test/staff
async fn staff_board() -> &'static str {
    "Staff Content."
}

/// Create content routes
pub fn routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/test/user", get(user_board))
        .route(
            "/api/test/mod",
            get(moderator_board).layer(middleware::from_fn_with_state(
                state.gate(RoleRequirement::Moderator),
                require_role,
            )),
        )
        .route(
            "/api/test/admin",
            get(admin_board).layer(middleware::from_fn_with_state(
                state.gate(RoleRequirement::Admin),
                require_role,
            )),
        )
        .route(
            "/api/test/staff",
            get(staff_board).layer(middleware::from_fn_with_state(
                state.gate(RoleRequirement::ModeratorOrAdmin),
                require_role,
            )),
        )
        .route_layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            verify_token,
        ));

    Router::new()
        .route("/api/test/all", get(all_access))
        .merge(protected)
}
