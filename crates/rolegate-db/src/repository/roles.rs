//! Role operations

use chrono::Utc;

use crate::error::DbError;
use crate::models::{Role, RoleName};
use crate::repository::Database;

impl Database {
    // ==================== Role Operations ====================

    /// Insert a role if no role with this name exists yet, then return it
    pub async fn upsert_role(&self, name: RoleName) -> Result<Role, DbError> {
        sqlx::query(
            r#"
            INSERT INTO roles (name)
            VALUES (?)
            ON CONFLICT(name) DO NOTHING
            "#,
        )
        .bind(name.as_str())
        .execute(&self.pool)
        .await?;

        self.get_role_by_name(name)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("Role '{}'", name)))
    }

    /// Get a role by name
    pub async fn get_role_by_name(&self, name: RoleName) -> Result<Option<Role>, DbError> {
        let result = sqlx::query("SELECT id, name FROM roles WHERE name = ?")
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await?;

        result.map(|row| Role::try_from(&row)).transpose()
    }

    /// List all roles
    pub async fn list_roles(&self) -> Result<Vec<Role>, DbError> {
        let rows = sqlx::query("SELECT id, name FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Role::try_from).collect()
    }

    /// Grant a role to a user
    ///
    /// Granting a role the user already holds is a no-op. Returns `true` when
    /// a new association was created.
    pub async fn grant_role(&self, user_id: i64, role_id: i64) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

}
