//! Students repository

use serde_json::Value;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Stored, Student},
    store::{Collection, DocumentStore, Fields, Filter, WriteOp},
};

#[derive(Clone)]
pub struct StudentsRepository {
    store: Arc<dyn DocumentStore>,
}

impl StudentsRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Get the student record of a user
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<Stored<Student>>> {
        let docs = self
            .store
            .find(Collection::Students, &[Filter::eq("userId", user_id)])
            .await?;
        super::first_match(&docs, Collection::Students, &format!("userId={}", user_id))
    }

    pub async fn list_readable(&self) -> AppResult<Vec<Stored<Student>>> {
        let docs = self.store.find(Collection::Students, &[]).await?;
        Ok(super::decode_readable(&docs, Collection::Students))
    }

    /// Students registered by the given admin
    pub async fn list_by_admin(&self, admin_id: &str) -> AppResult<Vec<Stored<Student>>> {
        let docs = self
            .store
            .find(Collection::Students, &[Filter::eq("adminId", admin_id)])
            .await?;
        super::decode_all(&docs, Collection::Students)
    }

    /// Highest numeric `userId` among existing students
    pub async fn max_user_id(&self) -> AppResult<Option<i64>> {
        let docs = self.store.find(Collection::Students, &[]).await?;
        Ok(docs
            .iter()
            .filter_map(|doc| match doc.data.get("userId") {
                Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
                Some(Value::Number(n)) => n.as_i64(),
                _ => None,
            })
            .max())
    }

    pub fn insert_op(student: &Student) -> AppResult<WriteOp> {
        Ok(WriteOp::insert(Collection::Students, super::to_fields(student)?))
    }

    /// Update guarded by the revision the caller read
    pub fn update_op(student: &Stored<Student>, fields: Fields) -> WriteOp {
        WriteOp::update(Collection::Students, student.id.clone(), fields).guarded(student.revision)
    }
}
