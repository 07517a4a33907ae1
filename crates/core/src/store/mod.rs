//! Record store abstraction.
//!
//! The staffing services keep their data in a document database they do not own. This module
//! defines the narrow interface they consume ([`DocumentStore`]) and two implementations:
//!
//! - [`MemoryStore`]: process-local, used by tests and the `memory` backend
//! - [`JsonFileStore`]: one JSON file per document under a data directory
//!
//! ## Document model
//!
//! A document is a flat JSON object addressed by `(collection, key)`. Writes are shallow
//! merges of top-level fields: a field present in the write replaces the stored field as a
//! whole, fields absent from the write are left alone.
//!
//! ## Batches
//!
//! A [`WriteBatch`] groups create/update/merge/delete operations. A batch is checked as a
//! whole before any of it is applied and may hold at most the configured number of
//! operations; larger workloads are split by the caller into sequential batches.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use staffing_uuid::DocumentId;
use std::cmp::Ordering;

/// Top-level fields of a stored document.
pub type Fields = Map<String, Value>;

/// A document read back from the store.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub key: String,
    pub fields: Fields,
}

impl Document {
    /// Decode the document's fields into `T`, reporting the failing field path on mismatch.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        decode_fields(self.fields.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("document '{key}' not found in '{collection}'")]
    NotFound { collection: String, key: String },
    #[error("batch of {len} operations exceeds the limit of {max}")]
    BatchTooLarge { len: usize, max: usize },
    #[error("invalid document key: '{0}'")]
    InvalidKey(String),
    #[error("document must serialise to a JSON object")]
    NotAnObject,
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialise document: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("document schema mismatch at {path}: {message}")]
    Decode { path: String, message: String },
}

impl StoreError {
    /// True when the store itself could not be reached, as opposed to a bad request.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Io(_))
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// One queued write inside a [`WriteBatch`].
#[derive(Clone, Debug, PartialEq)]
pub enum BatchOp {
    Create {
        collection: String,
        key: String,
        fields: Fields,
    },
    Update {
        collection: String,
        key: String,
        fields: Fields,
    },
    SetMerge {
        collection: String,
        key: String,
        fields: Fields,
    },
    Delete {
        collection: String,
        key: String,
    },
}

impl BatchOp {
    pub fn collection(&self) -> &str {
        match self {
            BatchOp::Create { collection, .. }
            | BatchOp::Update { collection, .. }
            | BatchOp::SetMerge { collection, .. }
            | BatchOp::Delete { collection, .. } => collection,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            BatchOp::Create { key, .. }
            | BatchOp::Update { key, .. }
            | BatchOp::SetMerge { key, .. }
            | BatchOp::Delete { key, .. } => key,
        }
    }
}

/// An ordered group of writes committed together.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a create and return the key the document will be stored under.
    pub fn create(&mut self, collection: &str, fields: Fields) -> String {
        let key = DocumentId::new().to_string();
        self.ops.push(BatchOp::Create {
            collection: collection.to_string(),
            key: key.clone(),
            fields,
        });
        key
    }

    pub fn update(&mut self, collection: &str, key: &str, fields: Fields) {
        self.ops.push(BatchOp::Update {
            collection: collection.to_string(),
            key: key.to_string(),
            fields,
        });
    }

    pub fn set_merge(&mut self, collection: &str, key: &str, fields: Fields) {
        self.ops.push(BatchOp::SetMerge {
            collection: collection.to_string(),
            key: key.to_string(),
            fields,
        });
    }

    pub fn delete(&mut self, collection: &str, key: &str) {
        self.ops.push(BatchOp::Delete {
            collection: collection.to_string(),
            key: key.to_string(),
        });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// The document database consumed by the staffing services.
///
/// All operations are asynchronous; none of them retry.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in `collection`, sorted ascending by the string value of `order_by`
    /// (ordinal byte order). Documents missing the field sort first.
    async fn list_ordered(&self, collection: &str, order_by: &str) -> StoreResult<Vec<Document>>;

    /// The document stored under `key`, if any.
    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>>;

    /// Store a new document under a store-assigned key and return that key.
    async fn create(&self, collection: &str, fields: Fields) -> StoreResult<String>;

    /// Merge `fields` into an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] if the document does not exist.
    async fn update(&self, collection: &str, key: &str, fields: Fields) -> StoreResult<()>;

    /// Merge `fields` into a document, creating it if absent.
    async fn set_merge(&self, collection: &str, key: &str, fields: Fields) -> StoreResult<()>;

    /// Remove a document. Removing a missing document is not an error.
    async fn delete(&self, collection: &str, key: &str) -> StoreResult<()>;

    /// Apply every operation in `batch`, checking the batch as a whole first.
    async fn commit(&self, batch: WriteBatch) -> StoreResult<()>;

    /// Largest batch this store accepts.
    fn max_batch_ops(&self) -> usize;
}

/// Serialise `value` into document fields.
pub fn encode_fields<T: Serialize>(value: &T) -> StoreResult<Fields> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject),
    }
}

/// Decode document fields into `T`.
///
/// Uses `serde_path_to_error` so a mismatch names the offending field (e.g. `roomBabies.room1[0]`).
pub fn decode_fields<T: DeserializeOwned>(fields: Fields) -> StoreResult<T> {
    match serde_path_to_error::deserialize::<_, T>(Value::Object(fields)) {
        Ok(value) => Ok(value),
        Err(err) => {
            let path = err.path().to_string();
            let path = if path.is_empty() || path == "." {
                "<root>".to_string()
            } else {
                path
            };
            Err(StoreError::Decode {
                path,
                message: err.into_inner().to_string(),
            })
        }
    }
}

/// Keys double as file names in the file backend, so both backends restrict them to
/// ASCII alphanumerics plus `-`, `_` and `.`, not starting with a dot.
pub(crate) fn validate_key(key: &str) -> StoreResult<()> {
    let ok = !key.is_empty()
        && key.len() <= 200
        && !key.starts_with('.')
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

pub(crate) fn check_batch_size(batch: &WriteBatch, max: usize) -> StoreResult<()> {
    if batch.len() > max {
        return Err(StoreError::BatchTooLarge {
            len: batch.len(),
            max,
        });
    }
    Ok(())
}

/// Shallow merge: every top-level field in `patch` replaces the one in `target`.
pub(crate) fn merge_into(target: &mut Fields, patch: Fields) {
    for (k, v) in patch {
        target.insert(k, v);
    }
}

fn order_value<'a>(fields: &'a Fields, field: &str) -> &'a str {
    fields.get(field).and_then(Value::as_str).unwrap_or("")
}

pub(crate) fn sort_by_field(docs: &mut [Document], field: &str) {
    docs.sort_by(|a, b| {
        match order_value(&a.fields, field).cmp(order_value(&b.fields, field)) {
            Ordering::Equal => a.key.cmp(&b.key),
            other => other,
        }
    });
}
