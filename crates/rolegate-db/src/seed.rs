//! Startup seed data
//!
//! Seeding runs once at startup, before the server accepts traffic. Every
//! step is idempotent so restarting against an existing database never
//! duplicates rows.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::DbError;
use crate::models::{NewUser, RoleName};
use crate::repository::Database;

/// Reference rows inserted at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default = "default_roles")]
    pub roles: Vec<RoleName>,
    /// Create `default_user` and grant its role; roles are seeded either way
    #[serde(default = "default_user_enabled")]
    pub default_user_enabled: bool,
    #[serde(default = "default_user")]
    pub default_user: SeedUser,
}

/// Default user created at startup if its username is absent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default = "default_user_role")]
    pub role: RoleName,
}

impl Default for SeedData {
    fn default() -> Self {
        Self {
            roles: default_roles(),
            default_user_enabled: default_user_enabled(),
            default_user: default_user(),
        }
    }
}

fn default_roles() -> Vec<RoleName> {
    RoleName::ALL.to_vec()
}

fn default_user_role() -> RoleName {
    RoleName::User
}

fn default_user_enabled() -> bool {
    true
}

fn default_user() -> SeedUser {
    SeedUser {
        username: "stephen1".to_string(),
        name: Some("stephen".to_string()),
        email: "stephen@email.com".to_string(),
        password_hash: "stephen123".to_string(),
        phone: Some("80".to_string()),
        website: Some("http://www.stephen.com".to_string()),
        role: default_user_role(),
    }
}

impl Database {
    /// Insert the seed data
    pub async fn seed(&self, seed: &SeedData) -> Result<(), DbError> {
        for role in &seed.roles {
            self.upsert_role(*role).await?;
        }
        info!("Roles table seeded ({} roles)", seed.roles.len());

        if !seed.default_user_enabled {
            info!("Default user seeding disabled");
            return Ok(());
        }
        let default_user = &seed.default_user;

        let user = match self.get_user_by_username(&default_user.username).await? {
            Some(user) => user,
            None => {
                let user = self
                    .insert_user(NewUser {
                        username: default_user.username.clone(),
                        name: default_user.name.clone(),
                        email: default_user.email.clone(),
                        password_hash: default_user.password_hash.clone(),
                        phone: default_user.phone.clone(),
                        website: default_user.website.clone(),
                    })
                    .await?;
                info!("Default user '{}' created", user.username);
                user
            }
        };

        let role = self.upsert_role(default_user.role).await?;
        if self.grant_role(user.id, role.id).await? {
            info!("Granted role '{}' to '{}'", role.name, user.username);
        }

        info!("Seed data applied");
        Ok(())
    }
}
