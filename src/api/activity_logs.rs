//! Activity log endpoint

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{user::PageQuery, ActivityLog},
    AppState,
};

use super::{AppQuery, AuthenticatedUser, PaginatedResponse};

/// Latest activity, newest first
#[utoipa::path(
    get,
    path = "/activity-logs",
    tag = "activity",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Activity log entries", body = PaginatedResponse<ActivityLog>),
        (status = 403, description = "Administrators only", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_activity_logs(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppQuery(page): AppQuery<PageQuery>,
) -> AppResult<Json<PaginatedResponse<ActivityLog>>> {
    let (entries, total) = state.services.activity.list(&auth.actor(), &page).await?;
    Ok(Json(PaginatedResponse::new(entries, total, page.page, page.per_page)))
}
