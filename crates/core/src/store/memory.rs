//! In-process record store.

use super::{
    check_batch_size, merge_into, sort_by_field, validate_key, BatchOp, Document, DocumentStore,
    Fields, StoreError, StoreResult, WriteBatch,
};
use crate::constants::MAX_BATCH_OPS;
use async_trait::async_trait;
use staffing_uuid::DocumentId;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

type Collections = BTreeMap<String, BTreeMap<String, Fields>>;

/// Document store held entirely in memory.
///
/// Batches are applied under a single write lock, so a committed batch is never observed
/// half-applied. [`MemoryStore::set_unavailable`] makes every call fail with
/// [`StoreError::Unavailable`], which lets callers exercise their fallback paths.
#[derive(Debug)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    unavailable: AtomicBool,
    max_batch_ops: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_max_batch_ops(MAX_BATCH_OPS)
    }

    pub fn with_max_batch_ops(max_batch_ops: usize) -> Self {
        Self {
            collections: RwLock::new(BTreeMap::new()),
            unavailable: AtomicBool::new(false),
            max_batch_ops: max_batch_ops.clamp(1, MAX_BATCH_OPS),
        }
    }

    /// Simulate the store going offline (or coming back).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of documents currently held in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".into()));
        }
        Ok(())
    }
}

fn apply(collections: &mut Collections, op: BatchOp) {
    match op {
        BatchOp::Create {
            collection,
            key,
            fields,
        } => {
            collections.entry(collection).or_default().insert(key, fields);
        }
        BatchOp::Update {
            collection,
            key,
            fields,
        }
        | BatchOp::SetMerge {
            collection,
            key,
            fields,
        } => {
            let doc = collections
                .entry(collection)
                .or_default()
                .entry(key)
                .or_default();
            merge_into(doc, fields);
        }
        BatchOp::Delete { collection, key } => {
            if let Some(docs) = collections.get_mut(&collection) {
                docs.remove(&key);
            }
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_ordered(&self, collection: &str, order_by: &str) -> StoreResult<Vec<Document>> {
        self.ensure_available()?;
        let guard = self.collections.read().await;
        let mut docs: Vec<Document> = guard
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(key, fields)| Document {
                        key: key.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        sort_by_field(&mut docs, order_by);
        Ok(docs)
    }

    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        self.ensure_available()?;
        validate_key(key)?;
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .and_then(|docs| docs.get(key))
            .map(|fields| Document {
                key: key.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn create(&self, collection: &str, fields: Fields) -> StoreResult<String> {
        self.ensure_available()?;
        let key = DocumentId::new().to_string();
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(key.clone(), fields);
        Ok(key)
    }

    async fn update(&self, collection: &str, key: &str, fields: Fields) -> StoreResult<()> {
        self.ensure_available()?;
        validate_key(key)?;
        let mut guard = self.collections.write().await;
        let doc = guard
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(key))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                key: key.to_string(),
            })?;
        merge_into(doc, fields);
        Ok(())
    }

    async fn set_merge(&self, collection: &str, key: &str, fields: Fields) -> StoreResult<()> {
        self.ensure_available()?;
        validate_key(key)?;
        let mut guard = self.collections.write().await;
        apply(
            &mut guard,
            BatchOp::SetMerge {
                collection: collection.to_string(),
                key: key.to_string(),
                fields,
            },
        );
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> StoreResult<()> {
        self.ensure_available()?;
        validate_key(key)?;
        if let Some(docs) = self.collections.write().await.get_mut(collection) {
            docs.remove(key);
        }
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        self.ensure_available()?;
        check_batch_size(&batch, self.max_batch_ops)?;

        let mut guard = self.collections.write().await;

        // Updates may target documents created earlier in the same batch.
        let mut created: HashSet<(&str, &str)> = HashSet::new();
        for op in batch.ops() {
            validate_key(op.key())?;
            match op {
                BatchOp::Create { .. } => {
                    created.insert((op.collection(), op.key()));
                }
                BatchOp::Update { .. } => {
                    let exists = guard
                        .get(op.collection())
                        .is_some_and(|docs| docs.contains_key(op.key()));
                    if !exists && !created.contains(&(op.collection(), op.key())) {
                        return Err(StoreError::NotFound {
                            collection: op.collection().to_string(),
                            key: op.key().to_string(),
                        });
                    }
                }
                BatchOp::SetMerge { .. } | BatchOp::Delete { .. } => {}
            }
        }
        drop(created);

        for op in batch.into_ops() {
            apply(&mut guard, op);
        }
        Ok(())
    }

    fn max_batch_ops(&self) -> usize {
        self.max_batch_ops
    }
}
