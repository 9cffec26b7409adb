//! Fire-and-forget activity log sink

use crate::{
    error::AppResult,
    models::{activity_log::ActivityLog, user::PageQuery, Actor},
    policy::{authorize, Action},
    repository::Repository,
};

#[derive(Clone)]
pub struct ActivityLogService {
    repository: Repository,
}

impl ActivityLogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Queue a log entry. Failures are reported through tracing and never
    /// reach the caller.
    pub fn record(&self, user_id: Option<i32>, action: &'static str, description: String) {
        let repository = self.repository.clone();
        tokio::spawn(async move {
            if let Err(e) = repository
                .activity_logs
                .insert(user_id, action, &description)
                .await
            {
                tracing::warn!(?user_id, action, error = %e, "Failed to write activity log");
            }
        });
    }

    pub async fn list(&self, actor: &Actor, page: &PageQuery) -> AppResult<(Vec<ActivityLog>, i64)> {
        authorize(actor, &Action::ViewActivityLog)?;
        self.repository.activity_logs.list(page).await
    }
}
