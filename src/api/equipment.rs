//! Equipment catalogue endpoints

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        equipment::{CreateEquipment, Equipment, UpdateEquipment},
        user::PageQuery,
    },
    AppState,
};

use super::{AppJson, AppPath, AppQuery, AuthenticatedUser, PaginatedResponse};

/// List equipment
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Equipment list", body = PaginatedResponse<Equipment>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_equipment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppQuery(page): AppQuery<PageQuery>,
) -> AppResult<Json<PaginatedResponse<Equipment>>> {
    let (items, total) = state.services.equipment.list(&auth.actor(), &page).await?;
    Ok(Json(PaginatedResponse::new(items, total, page.page, page.per_page)))
}

/// Get equipment by ID
#[utoipa::path(
    get,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Equipment details", body = Equipment),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_equipment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<Equipment>> {
    let equipment = state.services.equipment.get_by_id(&auth.actor(), id).await?;
    Ok(Json(equipment))
}

/// Add equipment to the catalogue
#[utoipa::path(
    post,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    request_body = CreateEquipment,
    responses(
        (status = 201, description = "Equipment created", body = Equipment),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Administrators only", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_equipment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppJson(data): AppJson<CreateEquipment>,
) -> AppResult<(StatusCode, Json<Equipment>)> {
    data.validate()?;

    let created = state.services.equipment.create(&auth.actor(), &data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update equipment
#[utoipa::path(
    put,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Equipment ID")
    ),
    request_body = UpdateEquipment,
    responses(
        (status = 200, description = "Equipment updated", body = Equipment),
        (status = 403, description = "Administrators only", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_equipment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i32>,
    AppJson(data): AppJson<UpdateEquipment>,
) -> AppResult<Json<Equipment>> {
    data.validate()?;

    let updated = state.services.equipment.update(&auth.actor(), id, &data).await?;
    Ok(Json(updated))
}

/// Delete equipment
#[utoipa::path(
    delete,
    path = "/equipment/{id}",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Equipment ID")
    ),
    responses(
        (status = 204, description = "Equipment deleted"),
        (status = 400, description = "Equipment is referenced by loans", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_equipment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<StatusCode> {
    state.services.equipment.delete(&auth.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
