//! Read projections for the circulation report

use serde::Serialize;
use utoipa::ToSchema;

/// Placeholder for a borrower whose user record cannot be joined
pub const MISSING_NAME: &str = "Name not found";
/// Placeholder for a borrowing whose book code is not in the catalog
pub const MISSING_TITLE: &str = "Book not found";

/// Collection totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySummary {
    /// Number of catalog entries
    pub total_titles: i64,
    /// Sum of copies across the catalog
    pub total_copies: i64,
    /// Outstanding loans
    pub borrowed: i64,
    /// Returned loans
    pub returned: i64,
}
