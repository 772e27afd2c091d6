//! Guest (visit log) repository, read-only

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Guest, Stored},
    store::{Collection, DocumentStore},
};

#[derive(Clone)]
pub struct GuestsRepository {
    store: Arc<dyn DocumentStore>,
}

impl GuestsRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list_all(&self) -> AppResult<Vec<Stored<Guest>>> {
        let docs = self.store.find(Collection::Guests, &[]).await?;
        super::decode_all(&docs, Collection::Guests)
    }
}
