//! API handlers for Perpus REST endpoints

pub mod books;
pub mod health;
pub mod loans;
pub mod members;
pub mod openapi;
pub mod reports;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    models::{CallerClaims, Role},
    AppState,
};

/// Member id asserted by the authenticating gateway
pub const MEMBER_ID_HEADER: &str = "x-member-id";
/// Member role asserted by the authenticating gateway
pub const MEMBER_ROLE_HEADER: &str = "x-member-role";

/// Extractor for the caller identity forwarded by the gateway
pub struct AuthenticatedCaller(pub CallerClaims);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedCaller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header(parts, MEMBER_ID_HEADER)
            .ok_or_else(|| AppError::Authentication("Missing member id header".to_string()))?;
        let role = header(parts, MEMBER_ROLE_HEADER)
            .ok_or_else(|| AppError::Authentication("Missing member role header".to_string()))?
            .parse::<Role>()
            .map_err(AppError::Authentication)?;

        Ok(AuthenticatedCaller(CallerClaims::new(id, role)))
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Members
        .route("/members", post(members::register_member).get(members::list_members))
        .route("/members/me/card", get(members::get_member_card))
        .route("/members/:user_id/status", put(members::set_member_status))
        // Catalog
        .route("/books", get(books::list_books).post(books::add_book))
        .route("/books/:kode_buku", get(books::get_book))
        // Circulation
        .route("/loans", post(loans::create_loan))
        .route("/loans/me", get(loans::own_loans))
        .route("/loans/:id/return", post(loans::return_loan))
        // Reports
        .route("/reports/outstanding", get(reports::list_outstanding))
        .route("/reports/returned", get(reports::list_returned))
        .route("/reports/summary", get(reports::summary))
        .route("/reports/members-loans", get(reports::list_admin_loans))
        .route("/guests", get(reports::list_guests))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
