//! Admins repository

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Admin, Stored},
    store::{Collection, DocumentStore, Filter},
};

#[derive(Clone)]
pub struct AdminsRepository {
    store: Arc<dyn DocumentStore>,
}

impl AdminsRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<Stored<Admin>>> {
        let docs = self
            .store
            .find(Collection::Admins, &[Filter::eq("userId", user_id)])
            .await?;
        super::first_match(&docs, Collection::Admins, &format!("userId={}", user_id))
    }
}
