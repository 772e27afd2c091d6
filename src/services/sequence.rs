//! Sequential member id generation
//!
//! Ids come from an atomic counter in the document store, never from
//! reading the highest existing id and adding one.

use async_trait::async_trait;

use crate::{
    error::{AppError, AppResult},
    repository::Repository,
};

/// Id sequences handed out by [`NextId`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Member,
}

impl Namespace {
    pub fn counter_name(&self) -> &'static str {
        match self {
            Namespace::Member => "member_id",
        }
    }
}

/// Produces strictly increasing, unique ids; gaps are allowed
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NextId: Send + Sync {
    async fn next_id(&self, namespace: Namespace) -> AppResult<String>;
}

/// [`NextId`] backed by the store's atomic counters
#[derive(Clone)]
pub struct StoreSequence {
    repository: Repository,
    seed: i64,
    width: usize,
}

impl StoreSequence {
    /// `seed` is the first id on an empty store and fixes the zero-padded width
    pub fn new(repository: Repository, seed: &str) -> AppResult<Self> {
        let value = seed
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::Validation(format!("Invalid member id seed: {:?}", seed)))?;
        Ok(Self {
            repository,
            seed: value,
            width: seed.trim().len(),
        })
    }

    /// Starting point for a counter that does not exist yet. Continues after
    /// ids already present in the data so older records are never reissued.
    async fn initial_value(&self, namespace: Namespace) -> AppResult<i64> {
        let highest = match namespace {
            Namespace::Member => self.repository.students.max_user_id().await?,
        };
        Ok(highest.map_or(self.seed, |max| (max + 1).max(self.seed)))
    }

    fn format(&self, value: i64) -> String {
        format!("{:0width$}", value, width = self.width)
    }
}

#[async_trait]
impl NextId for StoreSequence {
    async fn next_id(&self, namespace: Namespace) -> AppResult<String> {
        let name = namespace.counter_name();
        let value = match self.repository.store.increment_counter(name).await? {
            Some(value) => value,
            None => {
                let initial = self.initial_value(namespace).await?;
                tracing::info!("Creating counter {} at {}", name, initial);
                // Racing creators are serialized by the store: one inserts, the rest increment
                self.repository.store.upsert_counter(name, initial).await?
            }
        };
        Ok(self.format(value))
    }
}
