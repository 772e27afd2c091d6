//! Staff report endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{GuestVisit, LibrarySummary, LoanView},
    AppState,
};

use super::AuthenticatedCaller;

/// Loans not yet returned
#[utoipa::path(
    get,
    path = "/reports/outstanding",
    tag = "reports",
    security(("member_id" = []), ("member_role" = [])),
    responses(
        (status = 200, description = "Outstanding loans", body = Vec<LoanView>),
        (status = 403, description = "Caller is not staff")
    )
)]
pub async fn list_outstanding(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> AppResult<Json<Vec<LoanView>>> {
    Ok(Json(state.services.reports.list_outstanding(&caller).await?))
}

/// Returned loans
#[utoipa::path(
    get,
    path = "/reports/returned",
    tag = "reports",
    security(("member_id" = []), ("member_role" = [])),
    responses(
        (status = 200, description = "Returned loans", body = Vec<LoanView>),
        (status = 403, description = "Caller is not staff")
    )
)]
pub async fn list_returned(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> AppResult<Json<Vec<LoanView>>> {
    Ok(Json(state.services.reports.list_returned(&caller).await?))
}

/// Catalog and circulation totals
#[utoipa::path(
    get,
    path = "/reports/summary",
    tag = "reports",
    security(("member_id" = []), ("member_role" = [])),
    responses(
        (status = 200, description = "Library totals", body = LibrarySummary),
        (status = 403, description = "Caller is not staff")
    )
)]
pub async fn summary(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> AppResult<Json<LibrarySummary>> {
    Ok(Json(state.services.reports.summary(&caller).await?))
}

/// Loans of the calling admin's students
#[utoipa::path(
    get,
    path = "/reports/members-loans",
    tag = "reports",
    security(("member_id" = []), ("member_role" = [])),
    responses(
        (status = 200, description = "Loans of own students", body = Vec<LoanView>),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_admin_loans(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> AppResult<Json<Vec<LoanView>>> {
    Ok(Json(state.services.reports.list_admin_loans(&caller).await?))
}

/// Library visits of the calling admin's students
#[utoipa::path(
    get,
    path = "/guests",
    tag = "reports",
    security(("member_id" = []), ("member_role" = [])),
    responses(
        (status = 200, description = "Visits, newest first", body = Vec<GuestVisit>),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_guests(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> AppResult<Json<Vec<GuestVisit>>> {
    Ok(Json(state.services.reports.list_guests(&caller).await?))
}
