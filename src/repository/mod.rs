//! Repository layer over the document store

pub mod admins;
pub mod books;
pub mod borrowings;
pub mod guests;
pub mod students;
pub mod users;

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::Stored,
    store::{Collection, Document, DocumentStore, Fields, WriteOp},
};

/// Main repository struct holding one typed repository per collection
#[derive(Clone)]
pub struct Repository {
    pub store: Arc<dyn DocumentStore>,
    pub users: users::UsersRepository,
    pub students: students::StudentsRepository,
    pub admins: admins::AdminsRepository,
    pub books: books::BooksRepository,
    pub borrowings: borrowings::BorrowingsRepository,
    pub guests: guests::GuestsRepository,
}

impl Repository {
    /// Create a new repository over the given document store
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: users::UsersRepository::new(store.clone()),
            students: students::StudentsRepository::new(store.clone()),
            admins: admins::AdminsRepository::new(store.clone()),
            books: books::BooksRepository::new(store.clone()),
            borrowings: borrowings::BorrowingsRepository::new(store.clone()),
            guests: guests::GuestsRepository::new(store.clone()),
            store,
        }
    }

    /// Commit a batch of writes atomically
    pub async fn apply(&self, ops: Vec<WriteOp>) -> AppResult<()> {
        self.store.apply(ops).await
    }
}

fn decode_all<T: DeserializeOwned>(
    docs: &[Document],
    collection: Collection,
) -> AppResult<Vec<Stored<T>>> {
    docs.iter().map(|doc| Stored::decode(doc, collection)).collect()
}

/// Decode every document that still fits the record type. Malformed ones are
/// logged and skipped.
fn decode_readable<T: DeserializeOwned>(
    docs: &[Document],
    collection: Collection,
) -> Vec<Stored<T>> {
    docs.iter()
        .filter_map(|doc| match Stored::decode(doc, collection) {
            Ok(stored) => Some(stored),
            Err(e) => {
                tracing::warn!("Skipping unreadable document: {}", e);
                None
            }
        })
        .collect()
}

/// First document of a lookup that should match at most one
fn first_match<T: DeserializeOwned>(
    docs: &[Document],
    collection: Collection,
    key: &str,
) -> AppResult<Option<Stored<T>>> {
    if docs.len() > 1 {
        tracing::warn!(
            "{} documents in {} match {}, using the first",
            docs.len(),
            collection,
            key
        );
    }
    docs.first()
        .map(|doc| Stored::decode(doc, collection))
        .transpose()
}

fn to_fields<T: Serialize>(record: &T) -> AppResult<Fields> {
    match serde_json::to_value(record) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(AppError::Internal(format!(
            "Record serialized to a non-object value: {}",
            other
        ))),
        Err(e) => Err(AppError::Internal(format!("Failed to serialize record: {}", e))),
    }
}
