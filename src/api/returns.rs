//! Return reconciliation endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        return_record::{ReturnDetails, ReturnQuery, ReturnRecord, SubmitReturn},
        Condition,
    },
    reconciliation::FineBreakdown,
    AppState,
};

use super::{ApiResponse, AppJson, AppPath, AppQuery, AuthenticatedUser, PaginatedResponse};

/// Borrower's return submission
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitReturnRequest {
    pub loan_id: i32,
    /// GOOD, MINOR_DAMAGE, MODERATE_DAMAGE, SEVERE_DAMAGE or LOST
    #[schema(example = "MINOR_DAMAGE")]
    pub kondisi_alat: String,
    /// Free-form notes from the borrower
    #[validate(length(max = 1000, message = "Notes are limited to 1000 characters"))]
    pub catatan: Option<String>,
    /// Reference (URL or path) to an uploaded photo
    #[validate(length(max = 500, message = "Photo reference is limited to 500 characters"))]
    pub foto_bukti: Option<String>,
}

impl SubmitReturnRequest {
    fn into_submission(self) -> AppResult<SubmitReturn> {
        let condition: Condition = self.kondisi_alat.parse().map_err(AppError::Validation)?;
        Ok(SubmitReturn {
            loan_id: self.loan_id,
            condition,
            notes: self.catatan,
            photo_evidence: self.foto_bukti,
        })
    }
}

/// Staff confirmation of a submitted return
#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmReturnRequest {
    /// Must be true when the return carries a fine
    #[serde(default)]
    pub confirm_payment: bool,
}

/// Created return with its fine breakdown
#[derive(Serialize, ToSchema)]
pub struct SubmittedReturn {
    #[serde(rename = "return")]
    pub record: ReturnRecord,
    pub fine: FineBreakdown,
}

/// Submit a return for a borrowed loan
#[utoipa::path(
    post,
    path = "/returns",
    tag = "returns",
    security(("bearer_auth" = [])),
    request_body = SubmitReturnRequest,
    responses(
        (status = 201, description = "Return submitted, awaiting payment", body = ApiResponse<SubmittedReturn>),
        (status = 400, description = "Invalid condition, loan not borrowed or already returned", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "Loan belongs to someone else", body = crate::error::ErrorResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn submit_return(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppJson(request): AppJson<SubmitReturnRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SubmittedReturn>>)> {
    request.validate()?;
    let submission = request.into_submission()?;

    let (record, fine) = state.services.returns.submit(&auth.actor(), submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Return submitted, waiting for staff confirmation",
            SubmittedReturn { record, fine },
        )),
    ))
}

/// Confirm a submitted return and restock the equipment
#[utoipa::path(
    patch,
    path = "/returns/{id}",
    tag = "returns",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Return ID")
    ),
    request_body = ConfirmReturnRequest,
    responses(
        (status = 200, description = "Return confirmed", body = ApiResponse<ReturnRecord>),
        (status = 400, description = "Already processed or payment not confirmed", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse),
        (status = 403, description = "Staff only", body = crate::error::ErrorResponse),
        (status = 404, description = "Return not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn confirm_return(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i32>,
    AppJson(request): AppJson<ConfirmReturnRequest>,
) -> AppResult<Json<ApiResponse<ReturnRecord>>> {
    let record = state
        .services
        .returns
        .confirm(&auth.actor(), id, request.confirm_payment)
        .await?;

    Ok(Json(ApiResponse::ok("Return confirmed", record)))
}

/// List returns (staff)
#[utoipa::path(
    get,
    path = "/returns",
    tag = "returns",
    security(("bearer_auth" = [])),
    params(ReturnQuery),
    responses(
        (status = 200, description = "Returns", body = ApiResponse<PaginatedResponse<ReturnDetails>>),
        (status = 403, description = "Staff only", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_returns(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppQuery(query): AppQuery<ReturnQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<ReturnDetails>>>> {
    let (returns, total) = state.services.returns.list(&auth.actor(), &query).await?;

    Ok(Json(ApiResponse::ok(
        "Returns retrieved",
        PaginatedResponse::new(returns, total, query.page, query.per_page),
    )))
}

/// Get a return
#[utoipa::path(
    get,
    path = "/returns/{id}",
    tag = "returns",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Return ID")
    ),
    responses(
        (status = 200, description = "Return details", body = ApiResponse<ReturnDetails>),
        (status = 403, description = "Return belongs to someone else", body = crate::error::ErrorResponse),
        (status = 404, description = "Return not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_return(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<ApiResponse<ReturnDetails>>> {
    let details = state.services.returns.get(&auth.actor(), id).await?;
    Ok(Json(ApiResponse::ok("Return retrieved", details)))
}
