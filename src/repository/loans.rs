//! Loans repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Pool, Postgres};

use super::equipment;
use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{CreateLoan, Loan, LoanDetails, LoanDetailsRow, LoanQuery},
        user::PageQuery,
        LoanStatus,
    },
    reconciliation::{lifecycle, plan_approval},
};

const DETAILS_SELECT: &str = r#"
    SELECT l.*, e.name AS equipment_name, u.full_name AS borrower_name
    FROM loans l
    JOIN equipment e ON e.id = l.equipment_id
    JOIN users u ON u.id = l.user_id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan with equipment and borrower names
    pub async fn get_details(&self, id: i32) -> AppResult<LoanDetails> {
        let query = format!("{} WHERE l.id = $1", DETAILS_SELECT);
        let row = sqlx::query_as::<_, LoanDetailsRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;
        Ok(row.into_details(Utc::now()))
    }

    /// List loans, optionally restricted to one borrower.
    ///
    /// OVERDUE selects borrowed loans whose deadline date is before today (UTC);
    /// BORROWED then only matches the ones still on time.
    pub async fn list(
        &self,
        query: &LoanQuery,
        borrower_id: Option<i32>,
        now: DateTime<Utc>,
    ) -> AppResult<(Vec<LoanDetails>, i64)> {
        let (per_page, offset) = PageQuery {
            page: query.page,
            per_page: query.per_page,
        }
        .limit_offset();

        let today = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|d| d.and_utc())
            .unwrap_or(now);

        let mut conditions = Vec::new();
        let mut idx = 1;

        if borrower_id.is_some() {
            conditions.push(format!("l.user_id = ${}", idx));
            idx += 1;
        }

        let status_filter = match query.status {
            Some(LoanStatus::Overdue) => {
                conditions.push(format!("l.status = 'BORROWED' AND l.deadline < ${}", idx));
                idx += 1;
                None
            }
            Some(LoanStatus::Borrowed) => {
                conditions.push(format!("l.status = 'BORROWED' AND l.deadline >= ${}", idx));
                idx += 1;
                None
            }
            Some(status) => {
                conditions.push(format!("l.status = ${}", idx));
                idx += 1;
                Some(status)
            }
            None => None,
        };
        let date_filter = matches!(query.status, Some(LoanStatus::Overdue | LoanStatus::Borrowed));

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_q = format!("SELECT COUNT(*) FROM loans l {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        if let Some(id) = borrower_id {
            count_builder = count_builder.bind(id);
        }
        if date_filter {
            count_builder = count_builder.bind(today);
        }
        if let Some(status) = status_filter {
            count_builder = count_builder.bind(status);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let list_q = format!(
            "{} {} ORDER BY l.created_at DESC, l.id DESC LIMIT ${} OFFSET ${}",
            DETAILS_SELECT,
            where_clause,
            idx,
            idx + 1
        );
        let mut builder = sqlx::query_as::<_, LoanDetailsRow>(&list_q);
        if let Some(id) = borrower_id {
            builder = builder.bind(id);
        }
        if date_filter {
            builder = builder.bind(today);
        }
        if let Some(status) = status_filter {
            builder = builder.bind(status);
        }
        let rows = builder
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows.into_iter().map(|r| r.into_details(now)).collect(), total))
    }

    /// Create a PENDING loan request
    pub async fn create(&self, user_id: i32, loan: &CreateLoan) -> AppResult<Loan> {
        let row = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (user_id, equipment_id, quantity, borrow_date, deadline, status, purpose)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(loan.equipment_id)
        .bind(loan.quantity)
        .bind(loan.borrow_date)
        .bind(loan.deadline)
        .bind(LoanStatus::Pending)
        .bind(&loan.purpose)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Approve a pending loan and reserve its units, atomically
    pub async fn approve(&self, loan_id: i32, staff_id: i32) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = lock(&mut *tx, loan_id).await?;
        let item = equipment::lock(&mut *tx, loan.equipment_id).await?;
        let change = plan_approval(&loan, &item)?;

        equipment::apply_stock(&mut *tx, item.id, change).await?;
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET status = $1, approved_by = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(LoanStatus::Approved)
        .bind(staff_id)
        .bind(loan_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Reject a pending loan
    pub async fn reject(&self, loan_id: i32, staff_id: i32, reason: Option<&str>) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = lock(&mut *tx, loan_id).await?;
        lifecycle::ensure_transition(&loan, LoanStatus::Rejected)?;

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans SET status = $1, approved_by = $2, reject_reason = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(LoanStatus::Rejected)
        .bind(staff_id)
        .bind(reason)
        .bind(loan_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Hand approved equipment over to the borrower
    pub async fn hand_over(&self, loan_id: i32) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = lock(&mut *tx, loan_id).await?;
        lifecycle::ensure_transition(&loan, LoanStatus::Borrowed)?;

        let loan = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(LoanStatus::Borrowed)
        .bind(loan_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(loan)
    }
}

/// Read and lock a loan row inside a transaction
pub(crate) async fn lock(conn: &mut PgConnection, id: i32) -> AppResult<Loan> {
    sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
}
