//! Equipment repository

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
        user::PageQuery,
        EquipmentStatus,
    },
    reconciliation::StockChange,
};

use super::conflict_on_foreign_key;

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List equipment by name
    pub async fn list(&self, page: &PageQuery) -> AppResult<(Vec<Equipment>, i64)> {
        let (limit, offset) = page.limit_offset();

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM equipment")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment ORDER BY name, id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Create equipment
    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, Equipment>(
            r#"
            INSERT INTO equipment (name, description, stock, status, unit_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.stock)
        .bind(EquipmentStatus::for_stock(data.stock))
        .bind(data.unit_price)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update equipment; availability follows the new stock when it changes
    pub async fn update(&self, id: i32, data: &UpdateEquipment) -> AppResult<Equipment> {
        let now = Utc::now();
        let status = data.stock.map(EquipmentStatus::for_stock);
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.description, "description");
        add_field!(data.stock, "stock");
        add_field!(status, "status");
        add_field!(data.unit_price, "unit_price");

        let query = format!(
            "UPDATE equipment SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Equipment>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        bind_field!(data.description);
        bind_field!(data.stock);
        bind_field!(status);
        bind_field!(data.unit_price);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Delete equipment that no loan references
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE equipment_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if referenced {
            return Err(AppError::Conflict(format!(
                "Equipment {} is referenced by loans and cannot be deleted",
                id
            )));
        }

        // A loan created after the check still trips the foreign key
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                conflict_on_foreign_key(
                    e,
                    format!("Equipment {} is referenced by loans and cannot be deleted", id),
                )
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }
}

/// Read and lock an equipment row inside a transaction
pub(crate) async fn lock(conn: &mut PgConnection, id: i32) -> AppResult<Equipment> {
    sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
}

/// Write a planned stock level and its availability
pub(crate) async fn apply_stock(conn: &mut PgConnection, id: i32, change: StockChange) -> AppResult<()> {
    sqlx::query("UPDATE equipment SET stock = $1, status = $2, updated_at = NOW() WHERE id = $3")
        .bind(change.stock)
        .bind(change.status)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
