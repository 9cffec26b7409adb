//! User management endpoints (administrators)

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    models::user::{CreateUser, PageQuery, User},
    AppState,
};

use super::{AppJson, AppPath, AppQuery, AuthenticatedUser, PaginatedResponse};

/// List user accounts
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "List of users", body = PaginatedResponse<User>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "Administrators only", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppQuery(page): AppQuery<PageQuery>,
) -> AppResult<Json<PaginatedResponse<User>>> {
    let (users, total) = state.services.users.list(&auth.actor(), &page).await?;
    Ok(Json(PaginatedResponse::new(users, total, page.page, page.per_page)))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input or username taken", body = crate::error::ErrorResponse),
        (status = 403, description = "Administrators only", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppJson(data): AppJson<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    data.validate()?;

    let created = state.services.users.create(&auth.actor(), &data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "User still has loans", body = crate::error::ErrorResponse),
        (status = 403, description = "Administrators only", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<StatusCode> {
    state.services.users.delete(&auth.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
