//! PostgreSQL document store: one JSONB row per document

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{Pool, Postgres, Transaction};

use super::{Collection, Document, DocumentStore, Fields, Filter, WriteOp};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: Pool<Postgres>,
}

impl PgDocumentStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn write(tx: &mut Transaction<'_, Postgres>, op: WriteOp) -> AppResult<()> {
        match op {
            WriteOp::Insert {
                collection,
                id,
                data,
            } => {
                let inserted = sqlx::query_scalar::<_, String>(
                    r#"
                    INSERT INTO documents (collection, id, revision, data)
                    VALUES ($1, $2, 1, $3)
                    ON CONFLICT (collection, id) DO NOTHING
                    RETURNING id
                    "#,
                )
                .bind(collection.as_str())
                .bind(&id)
                .bind(Value::Object(data))
                .fetch_optional(&mut **tx)
                .await?;

                if inserted.is_none() {
                    return Err(AppError::Conflict(format!(
                        "Document {} already exists in {}",
                        id, collection
                    )));
                }
            }
            WriteOp::Update {
                collection,
                id,
                fields,
                expected_revision,
            } => {
                let updated = sqlx::query_scalar::<_, i64>(
                    r#"
                    UPDATE documents
                    SET data = data || $3, revision = revision + 1, updated_at = NOW()
                    WHERE collection = $1 AND id = $2
                      AND ($4::BIGINT IS NULL OR revision = $4)
                    RETURNING revision
                    "#,
                )
                .bind(collection.as_str())
                .bind(&id)
                .bind(Value::Object(fields))
                .bind(expected_revision)
                .fetch_optional(&mut **tx)
                .await?;

                if updated.is_none() {
                    let exists: bool = sqlx::query_scalar(
                        "SELECT EXISTS(SELECT 1 FROM documents WHERE collection = $1 AND id = $2)",
                    )
                    .bind(collection.as_str())
                    .bind(&id)
                    .fetch_one(&mut **tx)
                    .await?;

                    return Err(if exists {
                        AppError::Conflict(format!(
                            "Document {} in {} changed concurrently",
                            id, collection
                        ))
                    } else {
                        AppError::NotFound(format!("Document {} not found in {}", id, collection))
                    });
                }
            }
        }
        Ok(())
    }
}

fn filter_object(filters: &[Filter]) -> Value {
    let map: Fields = filters
        .iter()
        .map(|f| (f.field.clone(), f.value.clone()))
        .collect();
    Value::Object(map)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find(&self, collection: Collection, filters: &[Filter]) -> AppResult<Vec<Document>> {
        let rows = sqlx::query_as::<_, (String, i64, Value)>(
            r#"
            SELECT id, revision, data
            FROM documents
            WHERE collection = $1 AND data @> $2
            ORDER BY seq
            "#,
        )
        .bind(collection.as_str())
        .bind(filter_object(filters))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, revision, data)| Document { id, revision, data })
            .collect())
    }

    async fn get(&self, collection: Collection, id: &str) -> AppResult<Option<Document>> {
        let row = sqlx::query_as::<_, (String, i64, Value)>(
            "SELECT id, revision, data FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, revision, data)| Document { id, revision, data }))
    }

    async fn apply(&self, ops: Vec<WriteOp>) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        for op in ops {
            // Returning early drops the transaction, which rolls it back
            Self::write(&mut tx, op).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn increment_counter(&self, name: &str) -> AppResult<Option<i64>> {
        let value = sqlx::query_scalar::<_, i64>(
            "UPDATE counters SET value = value + 1 WHERE name = $1 RETURNING value",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn upsert_counter(&self, name: &str, initial: i64) -> AppResult<i64> {
        let value = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO counters (name, value)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET value = counters.value + 1
            RETURNING value
            "#,
        )
        .bind(name)
        .bind(initial)
        .fetch_one(&self.pool)
        .await?;
        Ok(value)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
