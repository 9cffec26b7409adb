//! Business logic services

pub mod activity_log;
pub mod equipment;
pub mod loans;
pub mod returns;
pub mod users;

use crate::{config::AppConfig, error::AppResult, reconciliation::FineSchedule, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub equipment: equipment::EquipmentService,
    pub loans: loans::LoansService,
    pub returns: returns::ReturnsService,
    pub activity: activity_log::ActivityLogService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let activity = activity_log::ActivityLogService::new(repository.clone());
        let schedule = FineSchedule::new(config.fines.late_fee_per_day());

        Self {
            users: users::UsersService::new(repository.clone(), config.auth.clone(), activity.clone()),
            equipment: equipment::EquipmentService::new(repository.clone(), activity.clone()),
            loans: loans::LoansService::new(repository.clone(), activity.clone()),
            returns: returns::ReturnsService::new(repository.clone(), schedule, activity.clone()),
            activity,
            repository,
        }
    }

    /// Round-trip to the database, used by the readiness probe
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.repository.pool).await?;
        Ok(())
    }
}
