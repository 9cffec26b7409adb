//! Loan management service

use chrono::Utc;

use super::activity_log::ActivityLogService;
use crate::{
    error::AppResult,
    models::{
        loan::{CreateLoan, Loan, LoanDetails, LoanQuery},
        Actor,
    },
    policy::{authorize, is_allowed, Action},
    reconciliation::lifecycle::validate_loan_request,
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    activity: ActivityLogService,
}

impl LoansService {
    pub fn new(repository: Repository, activity: ActivityLogService) -> Self {
        Self { repository, activity }
    }

    /// Borrower asks for equipment; the loan starts PENDING
    pub async fn request_loan(&self, actor: &Actor, data: &CreateLoan) -> AppResult<Loan> {
        authorize(actor, &Action::RequestLoan)?;

        let equipment = self.repository.equipment.get_by_id(data.equipment_id).await?;
        validate_loan_request(&equipment, data.quantity, data.borrow_date, data.deadline)?;

        let loan = self.repository.loans.create(actor.id, data).await?;

        tracing::info!(loan_id = loan.id, user_id = actor.id, equipment_id = equipment.id, "Loan requested");
        self.activity.record(
            Some(actor.id),
            "REQUEST_LOAN",
            format!("Requested {} x '{}' (loan {})", loan.quantity, equipment.name, loan.id),
        );
        Ok(loan)
    }

    /// Borrowers only see their own loans; staff see everything
    pub async fn list(&self, actor: &Actor, query: &LoanQuery) -> AppResult<(Vec<LoanDetails>, i64)> {
        let borrower = if is_allowed(actor, &Action::ListAllLoans) {
            None
        } else {
            Some(actor.id)
        };
        self.repository.loans.list(query, borrower, Utc::now()).await
    }

    pub async fn get(&self, actor: &Actor, id: i32) -> AppResult<LoanDetails> {
        let details = self.repository.loans.get_details(id).await?;
        authorize(actor, &Action::ViewLoan { owner_id: details.loan.user_id })?;
        Ok(details)
    }

    pub async fn approve(&self, actor: &Actor, id: i32) -> AppResult<Loan> {
        authorize(actor, &Action::ReviewLoan)?;
        let loan = self.repository.loans.approve(id, actor.id).await?;

        tracing::info!(loan_id = id, staff_id = actor.id, quantity = loan.quantity, "Loan approved");
        self.activity.record(Some(actor.id), "APPROVE_LOAN", format!("Approved loan {}", id));
        Ok(loan)
    }

    pub async fn reject(&self, actor: &Actor, id: i32, reason: Option<&str>) -> AppResult<Loan> {
        authorize(actor, &Action::ReviewLoan)?;
        let loan = self.repository.loans.reject(id, actor.id, reason).await?;

        tracing::info!(loan_id = id, staff_id = actor.id, "Loan rejected");
        self.activity.record(
            Some(actor.id),
            "REJECT_LOAN",
            format!("Rejected loan {}: {}", id, reason.unwrap_or("no reason given")),
        );
        Ok(loan)
    }

    pub async fn hand_over(&self, actor: &Actor, id: i32) -> AppResult<Loan> {
        authorize(actor, &Action::ReviewLoan)?;
        let loan = self.repository.loans.hand_over(id).await?;

        tracing::info!(loan_id = id, staff_id = actor.id, "Equipment handed over");
        self.activity.record(Some(actor.id), "HAND_OVER_LOAN", format!("Handed over loan {}", id));
        Ok(loan)
    }
}
