//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, loans, members, reports};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Perpus API",
        version = "1.0.0",
        description = "School library circulation REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&GatewayIdentity),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Members
        members::register_member,
        members::list_members,
        members::get_member_card,
        members::set_member_status,
        // Books
        books::list_books,
        books::get_book,
        books::add_book,
        // Loans
        loans::create_loan,
        loans::own_loans,
        loans::return_loan,
        // Reports
        reports::list_outstanding,
        reports::list_returned,
        reports::summary,
        reports::list_admin_loans,
        reports::list_guests,
    ),
    components(
        schemas(
            // Members
            crate::models::Role,
            crate::models::StudentStatus,
            crate::models::RegisterMember,
            crate::models::RegisteredMember,
            crate::models::MemberCard,
            crate::models::MemberSummary,
            crate::models::student::UpdateMemberStatus,
            // Books
            crate::models::Book,
            crate::models::BookView,
            crate::models::CreateBook,
            // Loans
            crate::models::Borrowing,
            crate::models::BorrowingStatus,
            crate::models::CreateLoan,
            crate::models::LoanRecord,
            crate::models::LoanView,
            crate::models::ReturnOutcome,
            // Reports
            crate::models::LibrarySummary,
            crate::models::GuestVisit,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "members", description = "Member registration and cards"),
        (name = "books", description = "Catalog"),
        (name = "loans", description = "Borrowing and returns"),
        (name = "reports", description = "Staff reports")
    )
)]
pub struct ApiDoc;

/// Identity headers injected by the authenticating gateway
struct GatewayIdentity;

impl Modify for GatewayIdentity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "member_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Member-Id"))),
            );
            components.add_security_scheme(
                "member_role",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Member-Role"))),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
