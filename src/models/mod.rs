//! Data models for Perpus

pub mod book;
pub mod borrowing;
pub mod guest;
pub mod lenient;
pub mod report;
pub mod student;
pub mod timestamp;
pub mod user;

use serde::de::DeserializeOwned;
use std::ops::Deref;

use crate::{
    error::AppResult,
    store::{Collection, Document},
};

// Re-export commonly used types
pub use book::{Book, BookView, CreateBook};
pub use borrowing::{Borrowing, BorrowingStatus, CreateLoan, LoanRecord, LoanView, ReturnOutcome};
pub use guest::{Guest, GuestVisit};
pub use report::LibrarySummary;
pub use student::{MemberCard, MemberSummary, RegisterMember, RegisteredMember, Student, StudentStatus};
pub use user::{Admin, CallerClaims, Role, User};

/// A typed record together with its document id and revision
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<T> {
    pub id: String,
    pub revision: i64,
    pub record: T,
}

impl<T: DeserializeOwned> Stored<T> {
    pub fn decode(doc: &Document, collection: Collection) -> AppResult<Self> {
        Ok(Self {
            id: doc.id.clone(),
            revision: doc.revision,
            record: doc.decode(collection)?,
        })
    }
}

impl<T> Deref for Stored<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.record
    }
}
