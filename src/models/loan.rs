//! Loan (borrow) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::LoanStatus;

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub user_id: i32,
    pub equipment_id: i32,
    pub quantity: i32,
    pub borrow_date: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub purpose: Option<String>,
    pub approved_by: Option<i32>,
    pub reject_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    /// A borrowed loan whose deadline day (UTC) is behind us
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == LoanStatus::Borrowed && now.date_naive() > self.deadline.date_naive()
    }

    /// Status as shown to clients: OVERDUE is derived here, never stored
    pub fn display_status(&self, now: DateTime<Utc>) -> LoanStatus {
        if self.is_overdue(now) {
            LoanStatus::Overdue
        } else {
            self.status
        }
    }
}

/// Loan with read-time details for display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanDetails {
    #[serde(flatten)]
    pub loan: Loan,
    pub display_status: LoanStatus,
    pub equipment_name: String,
    pub borrower_name: String,
}

/// Row shape of the joined loan listing query
#[derive(Debug, Clone, FromRow)]
pub struct LoanDetailsRow {
    #[sqlx(flatten)]
    pub loan: Loan,
    pub equipment_name: String,
    pub borrower_name: String,
}

impl LoanDetailsRow {
    pub fn into_details(self, now: DateTime<Utc>) -> LoanDetails {
        LoanDetails {
            display_status: self.loan.display_status(now),
            loan: self.loan,
            equipment_name: self.equipment_name,
            borrower_name: self.borrower_name,
        }
    }
}

/// Create loan request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLoan {
    pub equipment_id: i32,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub borrow_date: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    #[validate(length(max = 500, message = "Purpose is limited to 500 characters"))]
    pub purpose: Option<String>,
}

/// Reject loan request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RejectLoan {
    pub reason: Option<String>,
}

/// Query parameters for loan listings
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LoanQuery {
    /// Filter by status; OVERDUE selects borrowed loans past their deadline
    pub status: Option<LoanStatus>,
    /// Page number (1-based)
    pub page: Option<i64>,
    /// Items per page
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn borrowed_until(deadline: DateTime<Utc>) -> Loan {
        let start = deadline - chrono::Duration::days(7);
        Loan {
            id: 1,
            user_id: 2,
            equipment_id: 3,
            quantity: 1,
            borrow_date: start,
            deadline,
            return_date: None,
            status: LoanStatus::Borrowed,
            purpose: None,
            approved_by: Some(9),
            reject_reason: None,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn test_overdue_is_derived_from_deadline_date() {
        let deadline = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let loan = borrowed_until(deadline);

        let same_day_later = Utc.with_ymd_and_hms(2024, 1, 10, 23, 59, 0).unwrap();
        assert_eq!(loan.display_status(same_day_later), LoanStatus::Borrowed);

        let next_day = Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 1).unwrap();
        assert_eq!(loan.display_status(next_day), LoanStatus::Overdue);
    }

    #[test]
    fn test_only_borrowed_loans_become_overdue() {
        let deadline = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let mut loan = borrowed_until(deadline);
        loan.status = LoanStatus::Returned;
        let much_later = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(loan.display_status(much_later), LoanStatus::Returned);
    }
}
