//! User endpoints

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    middleware,
    routing::{get, post},
};
use rolegate_auth::{Authorized, RoleRequirement, VerifiedSubject, require_role, verify_token};
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{ValidatedJson, ValidationErrors};

use super::types::{GrantRoleRequest, GrantRoleResponse, ProfileResponse};

/// GET /api/users/me
async fn get_me(
    State(state): State<AppState>,
    VerifiedSubject(subject): VerifiedSubject,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state
        .db
        .get_user_with_roles(subject.subject_id())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// POST /api/admin/users/{id}/roles
async fn grant_role(
    State(state): State<AppState>,
    Extension(admin): Extension<Authorized>,
    Path(user_id): Path<i64>,
    ValidatedJson(request): ValidatedJson<GrantRoleRequest>,
) -> Result<Json<GrantRoleResponse>, ApiError> {
    let role_name = request.role_name().ok_or_else(|| {
        let mut errors = ValidationErrors::default();
        errors.add("role", "Unknown role");
        ApiError::Validation(errors)
    })?;

    let user = state
        .db
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let role = state
        .db
        .get_role_by_name(role_name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Role not found".to_string()))?;

    let granted = state.db.grant_role(user.id, role.id).await?;
    if granted {
        info!(
            "Subject {} granted role '{}' to '{}'",
            admin.subject_id, role.name, user.username
        );
    }

    Ok(Json(GrantRoleResponse {
        user_id: user.id,
        role: role.name,
        granted,
    }))
}

/// Create user routes
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/users/me", get(get_me))
        .route(
            "/api/admin/users/{id}/roles",
            post(grant_role).layer(middleware::from_fn_with_state(
                state.gate(RoleRequirement::Admin),
                require_role,
            )),
        )
        .route_layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            verify_token,
        ))
}
