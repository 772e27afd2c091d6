//! Users repository

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Stored, User},
    store::{Collection, DocumentStore, Filter, WriteOp},
};

#[derive(Clone)]
pub struct UsersRepository {
    store: Arc<dyn DocumentStore>,
}

impl UsersRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Get user by member id (the `id` field, not the document id)
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Stored<User>>> {
        let docs = self
            .store
            .find(Collection::Users, &[Filter::eq("id", id)])
            .await?;
        super::first_match(&docs, Collection::Users, &format!("id={}", id))
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<Stored<User>>> {
        let docs = self
            .store
            .find(Collection::Users, &[Filter::eq("username", username)])
            .await?;
        super::first_match(&docs, Collection::Users, &format!("username={}", username))
    }

    pub async fn list_all(&self) -> AppResult<Vec<Stored<User>>> {
        let docs = self.store.find(Collection::Users, &[]).await?;
        super::decode_all(&docs, Collection::Users)
    }

    pub async fn list_readable(&self) -> AppResult<Vec<Stored<User>>> {
        let docs = self.store.find(Collection::Users, &[]).await?;
        Ok(super::decode_readable(&docs, Collection::Users))
    }

    pub fn insert_op(user: &User) -> AppResult<WriteOp> {
        Ok(WriteOp::insert(Collection::Users, super::to_fields(user)?))
    }
}
