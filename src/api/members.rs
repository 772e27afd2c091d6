//! Member endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{student::UpdateMemberStatus, MemberCard, MemberSummary, RegisterMember, RegisteredMember},
    AppState,
};

use super::AuthenticatedCaller;

/// Register a student under the calling admin
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    security(("member_id" = []), ("member_role" = [])),
    request_body = RegisterMember,
    responses(
        (status = 201, description = "Member registered", body = RegisteredMember),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register_member(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Json(request): Json<RegisterMember>,
) -> AppResult<(StatusCode, Json<RegisteredMember>)> {
    let member = state.services.members.register_member(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Students registered by the calling admin
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    security(("member_id" = []), ("member_role" = [])),
    responses(
        (status = 200, description = "Members", body = Vec<MemberSummary>),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_members(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> AppResult<Json<Vec<MemberSummary>>> {
    let members = state.services.members.list_members(&caller).await?;
    Ok(Json(members))
}

/// Member card of the calling student
#[utoipa::path(
    get,
    path = "/members/me/card",
    tag = "members",
    security(("member_id" = []), ("member_role" = [])),
    responses(
        (status = 200, description = "Member card", body = MemberCard),
        (status = 403, description = "Caller is not a student")
    )
)]
pub async fn get_member_card(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> AppResult<Json<MemberCard>> {
    let card = state.services.members.get_member_card(&caller).await?;
    Ok(Json(card))
}

/// Activate or deactivate a member
#[utoipa::path(
    put,
    path = "/members/{user_id}/status",
    tag = "members",
    security(("member_id" = []), ("member_role" = [])),
    params(
        ("user_id" = String, Path, description = "Member user ID")
    ),
    request_body = UpdateMemberStatus,
    responses(
        (status = 200, description = "Status updated", body = MemberSummary),
        (status = 403, description = "Member belongs to another admin"),
        (status = 404, description = "Member not found")
    )
)]
pub async fn set_member_status(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateMemberStatus>,
) -> AppResult<Json<MemberSummary>> {
    let member = state
        .services
        .members
        .set_member_status(&caller, &user_id, request)
        .await?;
    Ok(Json(member))
}
