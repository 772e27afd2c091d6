//! In-memory document store for tests and local runs

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{Collection, Document, DocumentStore, Filter, WriteOp};
use crate::error::{AppError, AppResult};

#[derive(Debug, Default, Clone)]
struct State {
    collections: HashMap<Collection, IndexMap<String, Document>>,
    counters: HashMap<String, i64>,
}

/// Collections kept in insertion order behind a single lock
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    state: Mutex<State>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| AppError::StoreUnavailable("memory store lock poisoned".to_string()))
    }
}

impl State {
    fn write(&mut self, op: WriteOp) -> AppResult<()> {
        match op {
            WriteOp::Insert {
                collection,
                id,
                data,
            } => {
                let docs = self.collections.entry(collection).or_default();
                if docs.contains_key(&id) {
                    return Err(AppError::Conflict(format!(
                        "Document {} already exists in {}",
                        id, collection
                    )));
                }
                docs.insert(
                    id.clone(),
                    Document {
                        id,
                        revision: 1,
                        data: Value::Object(data),
                    },
                );
            }
            WriteOp::Update {
                collection,
                id,
                fields,
                expected_revision,
            } => {
                let doc = self
                    .collections
                    .get_mut(&collection)
                    .and_then(|docs| docs.get_mut(&id))
                    .ok_or_else(|| {
                        AppError::NotFound(format!("Document {} not found in {}", id, collection))
                    })?;

                if let Some(expected) = expected_revision {
                    if doc.revision != expected {
                        return Err(AppError::Conflict(format!(
                            "Document {} in {} changed concurrently (revision {} != {})",
                            id, collection, doc.revision, expected
                        )));
                    }
                }

                if let Value::Object(body) = &mut doc.data {
                    body.extend(fields);
                } else {
                    doc.data = Value::Object(fields);
                }
                doc.revision += 1;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find(&self, collection: Collection, filters: &[Filter]) -> AppResult<Vec<Document>> {
        let state = self.lock()?;
        Ok(state
            .collections
            .get(&collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| filters.iter().all(|f| f.matches(&doc.data)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(&self, collection: Collection, id: &str) -> AppResult<Option<Document>> {
        let state = self.lock()?;
        Ok(state
            .collections
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn apply(&self, ops: Vec<WriteOp>) -> AppResult<()> {
        let mut state = self.lock()?;
        // Stage on a copy so a failing op leaves nothing behind
        let mut staged = state.clone();
        for op in ops {
            staged.write(op)?;
        }
        *state = staged;
        Ok(())
    }

    async fn increment_counter(&self, name: &str) -> AppResult<Option<i64>> {
        let mut state = self.lock()?;
        Ok(state.counters.get_mut(name).map(|value| {
            *value += 1;
            *value
        }))
    }

    async fn upsert_counter(&self, name: &str, initial: i64) -> AppResult<i64> {
        let mut state = self.lock()?;
        let value = state
            .counters
            .entry(name.to_string())
            .and_modify(|v| *v += 1)
            .or_insert(initial);
        Ok(*value)
    }

    async fn ping(&self) -> AppResult<()> {
        self.lock().map(|_| ())
    }
}
