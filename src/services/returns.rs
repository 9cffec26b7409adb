//! Return reconciliation service

use chrono::Utc;

use super::activity_log::ActivityLogService;
use crate::{
    error::AppResult,
    models::{
        return_record::{ReturnDetails, ReturnQuery, ReturnRecord, SubmitReturn},
        Actor,
    },
    policy::{authorize, Action},
    reconciliation::{FineBreakdown, FineSchedule},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReturnsService {
    repository: Repository,
    schedule: FineSchedule,
    activity: ActivityLogService,
}

impl ReturnsService {
    pub fn new(repository: Repository, schedule: FineSchedule, activity: ActivityLogService) -> Self {
        Self {
            repository,
            schedule,
            activity,
        }
    }

    /// Borrower hands a loan back; fines are assessed now, stock is credited on confirmation
    pub async fn submit(&self, actor: &Actor, input: SubmitReturn) -> AppResult<(ReturnRecord, FineBreakdown)> {
        // Role gate before touching the loan; ownership is checked against the locked row
        authorize(actor, &Action::SubmitReturn { loan_owner_id: actor.id })?;

        let loan_id = input.loan_id;
        let record = self
            .repository
            .returns
            .submit(actor, input, &self.schedule, Utc::now())
            .await?;
        let fine = FineBreakdown::from(&record);

        tracing::info!(
            return_id = record.id,
            loan_id,
            condition = %record.condition,
            late_days = fine.late_days,
            total_fine = %fine.total_fine,
            "Return submitted"
        );
        self.activity.record(
            Some(actor.id),
            "SUBMIT_RETURN",
            format!("Returned loan {} as {}, fine {}", loan_id, record.condition, fine.total_fine),
        );
        Ok((record, fine))
    }

    /// Staff settle the fine and put the units back in stock
    pub async fn confirm(&self, actor: &Actor, id: i32, confirm_payment: bool) -> AppResult<ReturnRecord> {
        authorize(actor, &Action::ConfirmReturn)?;

        let record = self
            .repository
            .returns
            .confirm(id, actor.id, confirm_payment, Utc::now())
            .await?;

        tracing::info!(return_id = id, staff_id = actor.id, paid_fine = ?record.paid_fine, "Return confirmed");
        self.activity.record(
            Some(actor.id),
            "CONFIRM_RETURN",
            format!("Confirmed return {} for loan {}", id, record.loan_id),
        );
        Ok(record)
    }

    pub async fn list(&self, actor: &Actor, query: &ReturnQuery) -> AppResult<(Vec<ReturnDetails>, i64)> {
        authorize(actor, &Action::ListReturns)?;
        self.repository.returns.list(query).await
    }

    pub async fn get(&self, actor: &Actor, id: i32) -> AppResult<ReturnDetails> {
        let details = self.repository.returns.get_details(id).await?;
        authorize(actor, &Action::ViewReturn { loan_owner_id: details.borrower_id })?;
        Ok(details)
    }
}
