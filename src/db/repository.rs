//! User repository for gator.
//!
//! This module provides CRUD operations for users in the database.

use chrono::Utc;
use uuid::Uuid;

use super::user::{NewUser, User};
use super::DbPool;
use crate::datetime::{parse_db_timestamp, to_db_timestamp};
use crate::{GatorError, Result};

/// Row type for a user from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    created_at: String,
    updated_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            created_at: parse_db_timestamp(&row.created_at).unwrap_or_else(Utc::now),
            updated_at: parse_db_timestamp(&row.updated_at).unwrap_or_else(Utc::now),
        }
    }
}

/// Repository for user CRUD operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    ///
    /// Fails with a validation error if the name is already taken.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        new_user.validate()?;

        let now = to_db_timestamp(&Utc::now());
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, name, created_at, updated_at)
             VALUES (?, ?, ?, ?)
             RETURNING id, name, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.name)
        .bind(&now)
        .bind(&now)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                GatorError::Validation(format!("user '{}' already exists", new_user.name))
            }
            other => GatorError::from(other),
        })?;

        Ok(row.into())
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get a user by name.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, created_at, updated_at FROM users WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List all users ordered by name.
    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, created_at, updated_at FROM users ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Delete every user.
    ///
    /// Feeds, follows and posts go with them through cascading deletes.
    /// Returns the number of users removed.
    pub async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM users").execute(self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Count all users.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
