//! Loan (circulation) endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{CreateLoan, LoanRecord, LoanView, ReturnOutcome},
    AppState,
};

use super::AuthenticatedCaller;

/// Borrow a book as the calling student
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("member_id" = []), ("member_role" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanRecord),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Caller is not an active, unbanned student"),
        (status = 404, description = "Student or book not found"),
        (status = 409, description = "Concurrent loan for the same student"),
        (status = 422, description = "Another loan outstanding or no copies left")
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Json(request): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanRecord>)> {
    let loan = state.services.circulation.create_loan(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Loans of the calling student
#[utoipa::path(
    get,
    path = "/loans/me",
    tag = "loans",
    security(("member_id" = []), ("member_role" = [])),
    responses(
        (status = 200, description = "Outstanding and returned loans", body = Vec<LoanView>),
        (status = 403, description = "Caller is not a student")
    )
)]
pub async fn own_loans(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> AppResult<Json<Vec<LoanView>>> {
    let loans = state.services.circulation.own_loans(&caller).await?;
    Ok(Json(loans))
}

/// Process a return. Late returns ban the borrower.
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("member_id" = []), ("member_role" = [])),
    params(
        ("id" = String, Path, description = "Borrowing ID")
    ),
    responses(
        (status = 200, description = "Loan returned", body = ReturnOutcome),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Loan or borrower not found"),
        (status = 409, description = "Loan already returned or changed concurrently")
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<String>,
) -> AppResult<Json<ReturnOutcome>> {
    let outcome = state.services.circulation.return_loan(&caller, &id).await?;
    Ok(Json(outcome))
}
