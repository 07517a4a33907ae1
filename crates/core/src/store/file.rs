//! File-backed record store.
//!
//! ## Storage layout
//!
//! ```text
//! <data_dir>/
//!   staff/
//!     <32-hex key>.json
//!   shifts/
//!     2024-01-05_7P-7A.json
//! ```
//!
//! Each document is a pretty-printed JSON object. Files are replaced by writing a sibling
//! temporary file and renaming it over the target.

use super::{
    check_batch_size, merge_into, sort_by_field, validate_key, BatchOp, Document, DocumentStore,
    Fields, StoreError, StoreResult, WriteBatch,
};
use crate::constants::MAX_BATCH_OPS;
use async_trait::async_trait;
use serde_json::Value;
use staffing_uuid::DocumentId;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

const DOCUMENT_EXTENSION: &str = "json";

/// Document store persisting one JSON file per document.
///
/// Writes from this process are serialised through an internal lock so read-merge-write
/// cycles do not interleave. A batch is checked completely before the first file is
/// written, then applied file by file.
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
    max_batch_ops: usize,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_max_batch_ops(root, MAX_BATCH_OPS)
    }

    pub fn with_max_batch_ops(root: impl Into<PathBuf>, max_batch_ops: usize) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
            max_batch_ops: max_batch_ops.clamp(1, MAX_BATCH_OPS),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> StoreResult<PathBuf> {
        validate_key(collection)?;
        Ok(self.root.join(collection))
    }

    fn document_path(&self, collection: &str, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self
            .collection_dir(collection)?
            .join(format!("{key}.{DOCUMENT_EXTENSION}")))
    }

    async fn read_document(&self, path: &Path) -> StoreResult<Option<Fields>> {
        match fs::read_to_string(path).await {
            Ok(contents) => match serde_json::from_str::<Value>(&contents)? {
                Value::Object(map) => Ok(Some(map)),
                _ => Err(StoreError::NotAnObject),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn write_document(&self, path: &Path, fields: &Fields) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(fields)?;
        let tmp = path.with_extension(format!("{DOCUMENT_EXTENSION}.tmp"));
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn remove_document(&self, path: &Path) -> StoreResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn merge_document(&self, path: &Path, fields: Fields, must_exist: bool) -> StoreResult<bool> {
        let existing = self.read_document(path).await?;
        if existing.is_none() && must_exist {
            return Ok(false);
        }
        let mut doc = existing.unwrap_or_default();
        merge_into(&mut doc, fields);
        self.write_document(path, &doc).await?;
        Ok(true)
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn list_ordered(&self, collection: &str, order_by: &str) -> StoreResult<Vec<Document>> {
        let dir = self.collection_dir(collection)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let mut docs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            match self.read_document(&path).await {
                Ok(Some(fields)) => docs.push(Document { key, fields }),
                Ok(None) => {}
                Err(e @ (StoreError::Serialization(_) | StoreError::NotAnObject)) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping malformed document file");
                }
                Err(e) => return Err(e),
            }
        }

        sort_by_field(&mut docs, order_by);
        Ok(docs)
    }

    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        let path = self.document_path(collection, key)?;
        Ok(self.read_document(&path).await?.map(|fields| Document {
            key: key.to_string(),
            fields,
        }))
    }

    async fn create(&self, collection: &str, fields: Fields) -> StoreResult<String> {
        let key = DocumentId::new().to_string();
        let path = self.document_path(collection, &key)?;
        let _guard = self.write_lock.lock().await;
        self.write_document(&path, &fields).await?;
        Ok(key)
    }

    async fn update(&self, collection: &str, key: &str, fields: Fields) -> StoreResult<()> {
        let path = self.document_path(collection, key)?;
        let _guard = self.write_lock.lock().await;
        if self.merge_document(&path, fields, true).await? {
            Ok(())
        } else {
            Err(StoreError::NotFound {
                collection: collection.to_string(),
                key: key.to_string(),
            })
        }
    }

    async fn set_merge(&self, collection: &str, key: &str, fields: Fields) -> StoreResult<()> {
        let path = self.document_path(collection, key)?;
        let _guard = self.write_lock.lock().await;
        self.merge_document(&path, fields, false).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> StoreResult<()> {
        let path = self.document_path(collection, key)?;
        let _guard = self.write_lock.lock().await;
        self.remove_document(&path).await
    }

    async fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        check_batch_size(&batch, self.max_batch_ops)?;
        let _guard = self.write_lock.lock().await;

        let mut created: HashSet<PathBuf> = HashSet::new();
        let mut planned = Vec::with_capacity(batch.len());
        for op in batch.into_ops() {
            let path = self.document_path(op.collection(), op.key())?;
            match &op {
                BatchOp::Create { .. } => {
                    created.insert(path.clone());
                }
                BatchOp::Update { .. } => {
                    if !created.contains(&path) && !fs::try_exists(&path).await? {
                        return Err(StoreError::NotFound {
                            collection: op.collection().to_string(),
                            key: op.key().to_string(),
                        });
                    }
                }
                BatchOp::SetMerge { .. } | BatchOp::Delete { .. } => {}
            }
            planned.push((path, op));
        }

        for (path, op) in planned {
            match op {
                BatchOp::Create { fields, .. } => self.write_document(&path, &fields).await?,
                BatchOp::Update { fields, .. } | BatchOp::SetMerge { fields, .. } => {
                    self.merge_document(&path, fields, false).await?;
                }
                BatchOp::Delete { .. } => self.remove_document(&path).await?,
            }
        }
        Ok(())
    }

    fn max_batch_ops(&self) -> usize {
        self.max_batch_ops
    }
}
