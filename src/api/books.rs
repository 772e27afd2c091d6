//! Catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{BookView, CreateBook},
    AppState,
};

use super::AuthenticatedCaller;

/// List the catalog with availability
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("member_id" = []), ("member_role" = [])),
    responses(
        (status = 200, description = "All books", body = Vec<BookView>)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> AppResult<Json<Vec<BookView>>> {
    let books = state.services.catalog.list_books(&caller).await?;
    Ok(Json(books))
}

/// Get a book by its code
#[utoipa::path(
    get,
    path = "/books/{kode_buku}",
    tag = "books",
    security(("member_id" = []), ("member_role" = [])),
    params(
        ("kode_buku" = String, Path, description = "Book code")
    ),
    responses(
        (status = 200, description = "Book details", body = BookView),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(kode_buku): Path<String>,
) -> AppResult<Json<BookView>> {
    let book = state.services.catalog.get_book(&caller, &kode_buku).await?;
    Ok(Json(book))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("member_id" = []), ("member_role" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookView),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Book code already in use")
    )
)]
pub async fn add_book(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<BookView>)> {
    let book = state.services.catalog.add_book(&caller, request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}
