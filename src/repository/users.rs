//! Users repository

use sqlx::{Pool, Postgres};

use super::{conflict_on_foreign_key, conflict_on_unique};
use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, PageQuery, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by login name
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// List users ordered by name
    pub async fn list(&self, page: &PageQuery) -> AppResult<(Vec<User>, i64)> {
        let (limit, offset) = page.limit_offset();

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY full_name, id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((users, total))
    }

    /// Create a user with an already hashed password
    pub async fn create(&self, data: &CreateUser, password_hash: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, full_name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&data.username)
        .bind(password_hash)
        .bind(&data.full_name)
        .bind(data.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, format!("Username '{}' is already taken", data.username)))
    }

    /// Delete a user without loan history
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let has_loans: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE user_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if has_loans {
            return Err(AppError::Conflict(format!(
                "User {} has loan history and cannot be deleted",
                id
            )));
        }

        // Staff who approved loans or confirmed returns are still referenced
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                conflict_on_foreign_key(
                    e,
                    format!("User {} is referenced by processed loans and cannot be deleted", id),
                )
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }
}
