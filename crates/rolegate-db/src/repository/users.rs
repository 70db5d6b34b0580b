//! User operations

use chrono::Utc;
use sqlx::Row;
use std::str::FromStr;

use crate::error::DbError;
use crate::models::{NewUser, RoleName, RoleSet, User, UserWithRoles};
use crate::repository::Database;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        // Check if user already exists
        let existing = self.get_user_by_username(&user.username).await?;
        if existing.is_some() {
            return Err(DbError::Duplicate(format!("User '{}' already exists", user.username)));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, name, email, password_hash, phone, website, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(&user.website)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(User {
            id,
            username: user.username,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            phone: user.phone,
            website: user.website,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user by username
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, username, name, email, password_hash, phone, website, created_at, updated_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, username, name, email, password_hash, phone, website, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user together with its roles in a single query
    ///
    /// Returns `None` when no user has this ID. A user without any role
    /// yields an empty role set.
    pub async fn get_user_with_roles(&self, id: i64) -> Result<Option<UserWithRoles>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.username, u.name, u.email, u.password_hash, u.phone, u.website,
                   u.created_at, u.updated_at, r.name AS role_name
            FROM users u
            LEFT JOIN user_roles ur ON ur.user_id = u.id
            LEFT JOIN roles r ON r.id = ur.role_id
            WHERE u.id = ?
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let Some(first) = rows.first() else {
            return Ok(None);
        };
        let user = User::try_from(first)?;

        let mut roles = RoleSet::new();
        for row in &rows {
            let role_name: Option<String> = row.try_get("role_name")?;
            if let Some(name) = role_name {
                roles.insert(RoleName::from_str(&name)?);
            }
        }

        Ok(Some(UserWithRoles { user, roles }))
    }

}
