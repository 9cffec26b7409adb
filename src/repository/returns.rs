//! Returns repository: persists reconciliation plans transactionally

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Pool, Postgres};

use super::{conflict_on_unique, equipment, loans};
use crate::{
    error::{AppError, AppResult},
    models::{
        return_record::{ReturnDetails, ReturnQuery, ReturnRecord, SubmitReturn},
        user::PageQuery,
        Actor, Equipment, LoanStatus, ReturnStatus,
    },
    reconciliation::{plan_confirm, plan_submit, FineSchedule},
};

const DETAILS_SELECT: &str = r#"
    SELECT r.*,
           l.user_id AS borrower_id, u.full_name AS borrower_name,
           l.equipment_id, e.name AS equipment_name,
           l.quantity, l.deadline
    FROM returns r
    JOIN loans l ON l.id = r.loan_id
    JOIN users u ON u.id = l.user_id
    JOIN equipment e ON e.id = l.equipment_id
"#;

#[derive(Clone)]
pub struct ReturnsRepository {
    pool: Pool<Postgres>,
}

impl ReturnsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a return with its loan context
    pub async fn get_details(&self, id: i32) -> AppResult<ReturnDetails> {
        let query = format!("{} WHERE r.id = $1", DETAILS_SELECT);
        sqlx::query_as::<_, ReturnDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Return {} not found", id)))
    }

    /// List returns, newest submissions first
    pub async fn list(&self, query: &ReturnQuery) -> AppResult<(Vec<ReturnDetails>, i64)> {
        let (limit, offset) = PageQuery {
            page: query.page,
            per_page: query.per_page,
        }
        .limit_offset();

        let where_clause = if query.status.is_some() {
            "WHERE r.status = $1"
        } else {
            ""
        };
        let next = if query.status.is_some() { 2 } else { 1 };

        let count_q = format!("SELECT COUNT(*) FROM returns r {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        if let Some(status) = query.status {
            count_builder = count_builder.bind(status);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let list_q = format!(
            "{} {} ORDER BY r.submitted_at DESC, r.id DESC LIMIT ${} OFFSET ${}",
            DETAILS_SELECT,
            where_clause,
            next,
            next + 1
        );
        let mut builder = sqlx::query_as::<_, ReturnDetails>(&list_q);
        if let Some(status) = query.status {
            builder = builder.bind(status);
        }
        let rows = builder
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    /// Record a borrower's return and close the loan.
    ///
    /// Equipment stock is left untouched until staff confirm the return.
    pub async fn submit(
        &self,
        actor: &Actor,
        input: SubmitReturn,
        schedule: &FineSchedule,
        now: DateTime<Utc>,
    ) -> AppResult<ReturnRecord> {
        let mut tx = self.pool.begin().await?;

        let loan = loans::lock(&mut *tx, input.loan_id).await?;

        let item = sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(loan.equipment_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", loan.equipment_id)))?;

        let existing = sqlx::query_as::<_, ReturnRecord>("SELECT * FROM returns WHERE loan_id = $1")
            .bind(loan.id)
            .fetch_optional(&mut *tx)
            .await?;

        let new = plan_submit(actor, &loan, existing.as_ref(), &item, input, schedule, now)?;

        let record = sqlx::query_as::<_, ReturnRecord>(
            r#"
            INSERT INTO returns (
                loan_id, condition, notes, photo_evidence, late_days,
                late_fine, damage_fine, total_fine, status, submitted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(new.loan_id)
        .bind(new.condition)
        .bind(&new.notes)
        .bind(&new.photo_evidence)
        .bind(new.late_days)
        .bind(new.late_fine)
        .bind(new.damage_fine)
        .bind(new.total_fine)
        .bind(ReturnStatus::AwaitingPayment)
        .bind(new.submitted_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, format!("A return has already been submitted for loan {}", loan.id)))?;

        mark_loan_returned(&mut *tx, loan.id, now).await?;

        tx.commit().await?;
        Ok(record)
    }

    /// Confirm a return: credit stock, settle the fine and close the record.
    ///
    /// Equipment, return and loan rows are written in one transaction.
    pub async fn confirm(
        &self,
        id: i32,
        staff_id: i32,
        confirm_payment: bool,
        now: DateTime<Utc>,
    ) -> AppResult<ReturnRecord> {
        let mut tx = self.pool.begin().await?;

        let record = lock(&mut *tx, id).await?;
        let loan = loans::lock(&mut *tx, record.loan_id).await?;
        let item = equipment::lock(&mut *tx, loan.equipment_id).await?;

        let plan = plan_confirm(&record, &loan, &item, confirm_payment, now)?;

        equipment::apply_stock(&mut *tx, item.id, plan.equipment).await?;

        let record = sqlx::query_as::<_, ReturnRecord>(
            r#"
            UPDATE returns
            SET status = $1, confirmed_at = $2, confirmed_by = $3, paid_fine = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(ReturnStatus::ReturnedConfirmed)
        .bind(plan.confirmed_at)
        .bind(staff_id)
        .bind(plan.paid_fine)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        mark_loan_returned(&mut *tx, loan.id, plan.loan_return_date).await?;

        tx.commit().await?;
        Ok(record)
    }
}

async fn lock(conn: &mut PgConnection, id: i32) -> AppResult<ReturnRecord> {
    sqlx::query_as::<_, ReturnRecord>("SELECT * FROM returns WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Return {} not found", id)))
}

async fn mark_loan_returned(conn: &mut PgConnection, loan_id: i32, return_date: DateTime<Utc>) -> AppResult<()> {
    sqlx::query("UPDATE loans SET status = $1, return_date = $2, updated_at = NOW() WHERE id = $3")
        .bind(LoanStatus::Returned)
        .bind(return_date)
        .bind(loan_id)
        .execute(conn)
        .await?;
    Ok(())
}
