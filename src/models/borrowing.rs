//! Borrowing (loan) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::timestamp;

/// Loan state: `"0"` outstanding, `"1"` returned (terminal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BorrowingStatus {
    #[serde(rename = "0")]
    Outstanding,
    #[serde(rename = "1")]
    Returned,
}

impl BorrowingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowingStatus::Outstanding => "0",
            BorrowingStatus::Returned => "1",
        }
    }
}

/// `borrowing` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Borrowing {
    /// `User.id` of the borrower (not the student document id)
    pub student_id: String,
    pub kode_buku: String,
    #[serde(default)]
    pub nomor_hp: String,
    /// Loan date
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub tanggal_peminjaman: DateTime<Utc>,
    /// Due date, fixed when the loan is created
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub tanggal_pengembalian: DateTime<Utc>,
    pub status: BorrowingStatus,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub returned_at: Option<DateTime<Utc>>,
}

impl Borrowing {
    pub fn is_outstanding(&self) -> bool {
        self.status == BorrowingStatus::Outstanding
    }

    /// Lateness is always measured against the stored due date
    pub fn is_late_at(&self, now: DateTime<Utc>) -> bool {
        now > self.tanggal_pengembalian
    }
}

/// Create loan request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_loan_dates", skip_on_field_errors = false))]
pub struct CreateLoan {
    #[validate(length(min = 1, max = 32))]
    pub kode_buku: String,
    #[validate(length(min = 6, max = 20))]
    pub nomor_hp: String,
    /// Defaults to now
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub tanggal_peminjaman: Option<DateTime<Utc>>,
    /// Due date
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub tanggal_pengembalian: DateTime<Utc>,
}

fn validate_loan_dates(loan: &CreateLoan) -> Result<(), ValidationError> {
    match loan.tanggal_peminjaman {
        Some(start) if loan.tanggal_pengembalian < start => {
            Err(ValidationError::new("due_before_loan_date"))
        }
        _ => Ok(()),
    }
}

/// A borrowing with its document id
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    pub id: String,
    #[serde(flatten)]
    pub borrowing: Borrowing,
}

/// Result of processing a return
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnOutcome {
    pub borrowing_id: String,
    pub returned_at: DateTime<Utc>,
    pub late: bool,
    /// New end of the borrower's suspension when the return was late
    pub banned_until: Option<DateTime<Utc>>,
}

/// Borrowing joined with its borrower and book, for listings
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    pub borrowing_id: String,
    pub student_user_id: String,
    pub name: String,
    pub class: Option<String>,
    pub profile_image_url: Option<String>,
    pub kode_buku: String,
    pub book_title: String,
    pub nomor_hp: String,
    pub tanggal_peminjaman: DateTime<Utc>,
    pub tanggal_pengembalian: DateTime<Utc>,
    pub status: BorrowingStatus,
    pub returned_at: Option<DateTime<Utc>>,
    pub overdue: bool,
}
