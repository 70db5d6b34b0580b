//! Request/Response DTOs

use rolegate_db::{RoleName, RoleSet, UserWithRoles};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::validation::{Validate, ValidationErrors};

/// Profile of the verified subject
#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub roles: RoleSet,
}

impl From<UserWithRoles> for ProfileResponse {
    fn from(value: UserWithRoles) -> Self {
        let UserWithRoles { user, roles } = value;
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            email: user.email,
            phone: user.phone,
            website: user.website,
            roles,
        }
    }
}

/// Grant role request
#[derive(Deserialize)]
pub struct GrantRoleRequest {
    pub role: String,
}

impl GrantRoleRequest {
    /// Parsed role name; only meaningful after validation
    pub fn role_name(&self) -> Option<RoleName> {
        RoleName::from_str(self.role.trim()).ok()
    }
}

impl Validate for GrantRoleRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.role.trim().is_empty() {
            errors.add("role", "Role is required");
        } else if self.role_name().is_none() {
            let known: Vec<&str> = RoleName::ALL.iter().map(RoleName::as_str).collect();
            errors.add(
                "role",
                format!("Role must be one of: {}", known.join(", ")),
            );
        }
        errors.into_result()
    }
}

/// Grant role response
#[derive(Serialize)]
pub struct GrantRoleResponse {
    pub user_id: i64,
    pub role: RoleName,
    /// `false` when the user already held the role
    pub granted: bool,
}
