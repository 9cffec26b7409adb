//! Loan management endpoints

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, Loan, LoanDetails, LoanQuery, RejectLoan},
    AppState,
};

use super::{ApiResponse, AppJson, AppPath, AppQuery, AuthenticatedUser, PaginatedResponse};

/// Request a loan
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan requested", body = ApiResponse<Loan>),
        (status = 400, description = "Invalid dates or insufficient stock", body = crate::error::ErrorResponse),
        (status = 403, description = "Borrowers only", body = crate::error::ErrorResponse),
        (status = 404, description = "Equipment not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn request_loan(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppJson(request): AppJson<CreateLoan>,
) -> AppResult<(StatusCode, Json<ApiResponse<Loan>>)> {
    request.validate()?;

    let loan = state.services.loans.request_loan(&auth.actor(), &request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Loan request submitted", loan)),
    ))
}

/// List loans. Borrowers only see their own.
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Loans", body = ApiResponse<PaginatedResponse<LoanDetails>>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_loans(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppQuery(query): AppQuery<LoanQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<LoanDetails>>>> {
    let (loans, total) = state.services.loans.list(&auth.actor(), &query).await?;

    Ok(Json(ApiResponse::ok(
        "Loans retrieved",
        PaginatedResponse::new(loans, total, query.page, query.per_page),
    )))
}

/// Get a loan
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan details", body = ApiResponse<LoanDetails>),
        (status = 403, description = "Loan belongs to someone else", body = crate::error::ErrorResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<ApiResponse<LoanDetails>>> {
    let loan = state.services.loans.get(&auth.actor(), id).await?;
    Ok(Json(ApiResponse::ok("Loan retrieved", loan)))
}

/// Approve a pending loan and reserve its stock
#[utoipa::path(
    post,
    path = "/loans/{id}/approve",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan approved", body = ApiResponse<Loan>),
        (status = 400, description = "Not pending or insufficient stock", body = crate::error::ErrorResponse),
        (status = 403, description = "Staff only", body = crate::error::ErrorResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn approve_loan(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<ApiResponse<Loan>>> {
    let loan = state.services.loans.approve(&auth.actor(), id).await?;
    Ok(Json(ApiResponse::ok("Loan approved", loan)))
}

/// Reject a pending loan
#[utoipa::path(
    post,
    path = "/loans/{id}/reject",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    request_body(content = RejectLoan, description = "Optional rejection reason"),
    responses(
        (status = 200, description = "Loan rejected", body = ApiResponse<Loan>),
        (status = 400, description = "Loan is not pending", body = crate::error::ErrorResponse),
        (status = 403, description = "Staff only", body = crate::error::ErrorResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn reject_loan(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i32>,
    body: Option<AppJson<RejectLoan>>,
) -> AppResult<Json<ApiResponse<Loan>>> {
    let request = body.map(|AppJson(r)| r).unwrap_or_default();

    let loan = state
        .services
        .loans
        .reject(&auth.actor(), id, request.reason.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok("Loan rejected", loan)))
}

/// Hand approved equipment over to the borrower
#[utoipa::path(
    post,
    path = "/loans/{id}/handover",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Equipment handed over", body = ApiResponse<Loan>),
        (status = 400, description = "Loan is not approved", body = crate::error::ErrorResponse),
        (status = 403, description = "Staff only", body = crate::error::ErrorResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn hand_over_loan(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<Json<ApiResponse<Loan>>> {
    let loan = state.services.loans.hand_over(&auth.actor(), id).await?;
    Ok(Json(ApiResponse::ok("Equipment handed over", loan)))
}
