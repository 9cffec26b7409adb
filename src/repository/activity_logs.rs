//! Activity log repository

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{activity_log::ActivityLog, user::PageQuery},
};

#[derive(Clone)]
pub struct ActivityLogsRepository {
    pool: Pool<Postgres>,
}

impl ActivityLogsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, user_id: Option<i32>, action: &str, description: &str) -> AppResult<()> {
        sqlx::query("INSERT INTO activity_logs (user_id, action, description) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(action)
            .bind(description)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Latest entries first
    pub async fn list(&self, page: &PageQuery) -> AppResult<(Vec<ActivityLog>, i64)> {
        let (limit, offset) = page.limit_offset();

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_logs")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT a.id, a.user_id, u.username, a.action, a.description, a.created_at
            FROM activity_logs a
            LEFT JOIN users u ON u.id = a.user_id
            ORDER BY a.created_at DESC, a.id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }
}
