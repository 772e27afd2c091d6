//! Books (catalog) repository

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Book, Stored},
    store::{Collection, DocumentStore, Fields, Filter, WriteOp},
};

#[derive(Clone)]
pub struct BooksRepository {
    store: Arc<dyn DocumentStore>,
}

impl BooksRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Get book by its business key
    pub async fn find_by_code(&self, kode_buku: &str) -> AppResult<Option<Stored<Book>>> {
        let docs = self
            .store
            .find(Collection::Books, &[Filter::eq("kodeBuku", kode_buku)])
            .await?;
        super::first_match(&docs, Collection::Books, &format!("kodeBuku={}", kode_buku))
    }

    pub async fn list_all(&self) -> AppResult<Vec<Stored<Book>>> {
        let docs = self.store.find(Collection::Books, &[]).await?;
        super::decode_all(&docs, Collection::Books)
    }

    /// Books that decode cleanly, for joins that must tolerate legacy data
    pub async fn list_readable(&self) -> AppResult<Vec<Stored<Book>>> {
        let docs = self.store.find(Collection::Books, &[]).await?;
        Ok(super::decode_readable(&docs, Collection::Books))
    }

    /// Insert a book and return its document id
    pub async fn create(&self, book: &Book) -> AppResult<String> {
        self.store
            .insert(Collection::Books, super::to_fields(book)?)
            .await
    }

    /// Update guarded by the revision the caller read
    pub fn update_op(book: &Stored<Book>, fields: Fields) -> WriteOp {
        WriteOp::update(Collection::Books, book.id.clone(), fields).guarded(book.revision)
    }
}
