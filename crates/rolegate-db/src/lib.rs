//! Rolegate Credential Store
//!
//! This crate persists users, roles and the user/role relation for
//! Rolegate, using SQLite via sqlx.

pub mod error;
pub mod models;
pub mod repository;
pub mod seed;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;
pub use seed::{SeedData, SeedUser};

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
