//! Loan, return and stock transitions.
//!
//! Each `plan_*` function validates a transition against rows already read
//! (and locked) by the repository and returns the values to write. Nothing
//! here touches the database, so the repository can apply a plan inside a
//! single transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::fines::FineSchedule;
use crate::{
    error::{AppError, AppResult},
    models::{
        return_record::{NewReturn, SubmitReturn},
        Actor, Equipment, EquipmentStatus, Loan, LoanStatus, ReturnRecord, ReturnStatus,
    },
    policy::{authorize, Action},
};

/// Persisted loan transitions. OVERDUE is never a target.
pub fn can_transition(from: LoanStatus, to: LoanStatus) -> bool {
    matches!(
        (from, to),
        (LoanStatus::Pending, LoanStatus::Approved)
            | (LoanStatus::Pending, LoanStatus::Rejected)
            | (LoanStatus::Approved, LoanStatus::Borrowed)
            | (LoanStatus::Borrowed, LoanStatus::Returned)
    )
}

/// Fails with `Conflict` when the loan cannot move to `to`
pub fn ensure_transition(loan: &Loan, to: LoanStatus) -> AppResult<()> {
    if can_transition(loan.status, to) {
        Ok(())
    } else {
        Err(AppError::Conflict(format!(
            "Loan {} is {} and cannot become {}",
            loan.id, loan.status, to
        )))
    }
}

/// New stock level and availability of an equipment row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub stock: i32,
    pub status: EquipmentStatus,
}

impl StockChange {
    fn to(stock: i32) -> Self {
        Self {
            stock,
            status: EquipmentStatus::for_stock(stock),
        }
    }
}

/// Checks a loan request against the equipment it targets
pub fn validate_loan_request(
    equipment: &Equipment,
    quantity: i32,
    borrow_date: DateTime<Utc>,
    deadline: DateTime<Utc>,
) -> AppResult<()> {
    if quantity < 1 {
        return Err(AppError::Validation("Quantity must be at least 1".to_string()));
    }
    if deadline <= borrow_date {
        return Err(AppError::Validation(
            "Deadline must be after the borrow date".to_string(),
        ));
    }
    if equipment.stock < quantity {
        return Err(AppError::Validation(format!(
            "Only {} unit(s) of {} in stock",
            equipment.stock, equipment.name
        )));
    }
    Ok(())
}

/// Approving a loan reserves its units
pub fn plan_approval(loan: &Loan, equipment: &Equipment) -> AppResult<StockChange> {
    ensure_transition(loan, LoanStatus::Approved)?;
    if equipment.stock < loan.quantity {
        return Err(AppError::Validation(format!(
            "Insufficient stock for {}: {} requested, {} available",
            equipment.name, loan.quantity, equipment.stock
        )));
    }
    Ok(StockChange::to(equipment.stock - loan.quantity))
}

/// Builds the return record for a borrower's submission.
///
/// Check order: ownership, existing return, loan state.
pub fn plan_submit(
    actor: &Actor,
    loan: &Loan,
    existing: Option<&ReturnRecord>,
    equipment: &Equipment,
    input: SubmitReturn,
    schedule: &FineSchedule,
    now: DateTime<Utc>,
) -> AppResult<NewReturn> {
    authorize(actor, &Action::SubmitReturn { loan_owner_id: loan.user_id })?;

    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "A return has already been submitted for loan {}",
            loan.id
        )));
    }

    if loan.status != LoanStatus::Borrowed {
        return Err(AppError::Validation(format!(
            "Loan {} is {}, only BORROWED loans can be returned",
            loan.id, loan.status
        )));
    }

    let fine = schedule.assess(loan.deadline, now, equipment.unit_price, input.condition);

    Ok(NewReturn {
        loan_id: loan.id,
        condition: input.condition,
        notes: input.notes,
        photo_evidence: input.photo_evidence,
        late_days: i32::try_from(fine.late_days).unwrap_or(i32::MAX),
        late_fine: fine.late_fine,
        damage_fine: fine.damage_fine,
        total_fine: fine.total_fine,
        submitted_at: now,
    })
}

/// Writes applied when staff confirm a return
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmPlan {
    pub equipment: StockChange,
    pub paid_fine: Decimal,
    pub confirmed_at: DateTime<Utc>,
    pub loan_return_date: DateTime<Utc>,
}

/// Validates a staff confirmation and computes the stock credit
pub fn plan_confirm(
    record: &ReturnRecord,
    loan: &Loan,
    equipment: &Equipment,
    confirm_payment: bool,
    now: DateTime<Utc>,
) -> AppResult<ConfirmPlan> {
    if record.status != ReturnStatus::AwaitingPayment {
        return Err(AppError::Conflict(format!(
            "Return {} has already been processed",
            record.id
        )));
    }

    if record.total_fine > Decimal::ZERO && !confirm_payment {
        return Err(AppError::PaymentRequired(format!(
            "Fine of {} must be paid before the return can be confirmed",
            record.total_fine
        )));
    }

    if record.loan_id != loan.id || loan.equipment_id != equipment.id {
        return Err(AppError::Internal(format!(
            "Return {} does not match loan {} / equipment {}",
            record.id, loan.id, equipment.id
        )));
    }

    let stock = equipment
        .stock
        .checked_add(loan.quantity)
        .ok_or_else(|| AppError::Internal(format!("Stock overflow on equipment {}", equipment.id)))?;

    Ok(ConfirmPlan {
        equipment: StockChange::to(stock),
        paid_fine: record.total_fine,
        confirmed_at: now,
        loan_return_date: loan.return_date.unwrap_or(now),
    })
}
