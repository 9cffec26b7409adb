//! Return (loan close-out) model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::{Condition, ReturnStatus};

/// Return record from database, exactly one per loan
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReturnRecord {
    pub id: i32,
    pub loan_id: i32,
    pub condition: Condition,
    pub notes: Option<String>,
    /// Reference to uploaded photo evidence
    pub photo_evidence: Option<String>,
    pub late_days: i32,
    pub late_fine: Decimal,
    pub damage_fine: Decimal,
    pub total_fine: Decimal,
    pub paid_fine: Option<Decimal>,
    pub status: ReturnStatus,
    pub submitted_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub confirmed_by: Option<i32>,
}

/// Values inserted when a borrower submits a return
#[derive(Debug, Clone, PartialEq)]
pub struct NewReturn {
    pub loan_id: i32,
    pub condition: Condition,
    pub notes: Option<String>,
    pub photo_evidence: Option<String>,
    pub late_days: i32,
    pub late_fine: Decimal,
    pub damage_fine: Decimal,
    pub total_fine: Decimal,
    pub submitted_at: DateTime<Utc>,
}

/// Query parameters for return listings
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ReturnQuery {
    pub status: Option<ReturnStatus>,
    /// Page number (1-based)
    pub page: Option<i64>,
    /// Items per page
    pub per_page: Option<i64>,
}

/// Borrower input for closing out a loan
#[derive(Debug, Clone)]
pub struct SubmitReturn {
    pub loan_id: i32,
    pub condition: Condition,
    pub notes: Option<String>,
    pub photo_evidence: Option<String>,
}

/// Return with the loan context staff need when reconciling
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ReturnDetails {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub record: ReturnRecord,
    pub borrower_id: i32,
    pub borrower_name: String,
    pub equipment_id: i32,
    pub equipment_name: String,
    pub quantity: i32,
    pub deadline: DateTime<Utc>,
}
