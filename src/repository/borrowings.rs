//! Borrowings repository

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Borrowing, BorrowingStatus, Stored},
    store::{Collection, DocumentStore, Fields, Filter, WriteOp},
};

#[derive(Clone)]
pub struct BorrowingsRepository {
    store: Arc<dyn DocumentStore>,
}

impl BorrowingsRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Get borrowing by document id
    pub async fn get_by_id(&self, id: &str) -> AppResult<Option<Stored<Borrowing>>> {
        self.store
            .get(Collection::Borrowings, id)
            .await?
            .map(|doc| Stored::decode(&doc, Collection::Borrowings))
            .transpose()
    }

    pub async fn list_all(&self) -> AppResult<Vec<Stored<Borrowing>>> {
        let docs = self.store.find(Collection::Borrowings, &[]).await?;
        super::decode_all(&docs, Collection::Borrowings)
    }

    pub async fn list_by_status(&self, status: BorrowingStatus) -> AppResult<Vec<Stored<Borrowing>>> {
        let docs = self
            .store
            .find(Collection::Borrowings, &[Filter::eq("status", status.as_str())])
            .await?;
        super::decode_all(&docs, Collection::Borrowings)
    }

    /// All borrowings of a user, both states
    pub async fn list_by_student(&self, user_id: &str) -> AppResult<Vec<Stored<Borrowing>>> {
        let docs = self
            .store
            .find(Collection::Borrowings, &[Filter::eq("studentId", user_id)])
            .await?;
        super::decode_all(&docs, Collection::Borrowings)
    }

    pub async fn outstanding_for_student(&self, user_id: &str) -> AppResult<Vec<Stored<Borrowing>>> {
        let docs = self
            .store
            .find(
                Collection::Borrowings,
                &[
                    Filter::eq("studentId", user_id),
                    Filter::eq("status", BorrowingStatus::Outstanding.as_str()),
                ],
            )
            .await?;
        super::decode_all(&docs, Collection::Borrowings)
    }

    /// Copies of a book currently out on loan
    pub async fn count_outstanding_for_book(&self, kode_buku: &str) -> AppResult<i64> {
        let docs = self
            .store
            .find(
                Collection::Borrowings,
                &[
                    Filter::eq("kodeBuku", kode_buku),
                    Filter::eq("status", BorrowingStatus::Outstanding.as_str()),
                ],
            )
            .await?;
        Ok(docs.len() as i64)
    }

    pub fn insert_op(borrowing: &Borrowing) -> AppResult<WriteOp> {
        Ok(WriteOp::insert(Collection::Borrowings, super::to_fields(borrowing)?))
    }

    /// Update guarded by the revision the caller read
    pub fn update_op(borrowing: &Stored<Borrowing>, fields: Fields) -> WriteOp {
        WriteOp::update(Collection::Borrowings, borrowing.id.clone(), fields)
            .guarded(borrowing.revision)
    }
}
