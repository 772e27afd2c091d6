//! Document store abstraction
//!
//! Collections are schemaless: every document is a JSON object addressed by
//! an opaque id. Relationships between collections are plain field equality,
//! so the store offers equality filters, single-document reads and writes, an
//! atomic batch with per-document revision guards, and named counters.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, AppResult};

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Top-level fields of a document body
pub type Fields = serde_json::Map<String, Value>;

/// The six logical collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Students,
    Admins,
    Books,
    Borrowings,
    Guests,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Students => "student",
            Collection::Admins => "admin",
            Collection::Books => "books",
            Collection::Borrowings => "borrowing",
            Collection::Guests => "guest",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored document
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    /// Incremented on every write; used as a compare-and-set token
    pub revision: i64,
    pub data: Value,
}

impl Document {
    /// Deserialize the body into a typed record
    pub fn decode<T: DeserializeOwned>(&self, collection: Collection) -> AppResult<T> {
        serde_json::from_value(self.data.clone()).map_err(|e| {
            AppError::Internal(format!(
                "Malformed {} document {}: {}",
                collection, self.id, e
            ))
        })
    }
}

/// Equality filter on a top-level field
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, data: &Value) -> bool {
        data.get(&self.field) == Some(&self.value)
    }
}

/// One write inside an atomic batch
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Insert {
        collection: Collection,
        id: String,
        data: Fields,
    },
    /// Top-level merge into an existing document
    Update {
        collection: Collection,
        id: String,
        fields: Fields,
        expected_revision: Option<i64>,
    },
}

impl WriteOp {
    /// Insert under a freshly generated opaque id
    pub fn insert(collection: Collection, data: Fields) -> Self {
        WriteOp::Insert {
            collection,
            id: uuid::Uuid::new_v4().simple().to_string(),
            data,
        }
    }

    pub fn update(collection: Collection, id: impl Into<String>, fields: Fields) -> Self {
        WriteOp::Update {
            collection,
            id: id.into(),
            fields,
            expected_revision: None,
        }
    }

    /// Only apply the update if the document is still at `revision`
    pub fn guarded(self, revision: i64) -> Self {
        match self {
            WriteOp::Update {
                collection,
                id,
                fields,
                ..
            } => WriteOp::Update {
                collection,
                id,
                fields,
                expected_revision: Some(revision),
            },
            insert => insert,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            WriteOp::Insert { id, .. } | WriteOp::Update { id, .. } => id,
        }
    }
}

/// Data-access contract consumed by the repositories.
///
/// `apply` is all-or-nothing: a revision mismatch aborts the batch with
/// `Conflict`, an update of a missing document aborts it with `NotFound`.
/// Transport failures surface as `StoreUnavailable` and are never retried here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents matching every filter, in insertion order
    async fn find(&self, collection: Collection, filters: &[Filter]) -> AppResult<Vec<Document>>;

    async fn get(&self, collection: Collection, id: &str) -> AppResult<Option<Document>>;

    /// Insert a document and return its new id
    async fn insert(&self, collection: Collection, data: Fields) -> AppResult<String> {
        let op = WriteOp::insert(collection, data);
        let id = op.id().to_string();
        self.apply(vec![op]).await?;
        Ok(id)
    }

    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> AppResult<()> {
        self.apply(vec![WriteOp::update(collection, id, fields)]).await
    }

    async fn apply(&self, ops: Vec<WriteOp>) -> AppResult<()>;

    /// Increment an existing counter; `None` when it was never created
    async fn increment_counter(&self, name: &str) -> AppResult<Option<i64>>;

    /// Create the counter at `initial`, or increment it if another writer got there first
    async fn upsert_counter(&self, name: &str, initial: i64) -> AppResult<i64>;

    /// Connectivity check used by the readiness probe
    async fn ping(&self) -> AppResult<()>;
}

/// Build a `Fields` map from a `json!({...})` literal
pub fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}
