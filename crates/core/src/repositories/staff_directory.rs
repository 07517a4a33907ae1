//! Staff directory.
//!
//! Wraps the `staff` collection with the operations the wizard and the management screen
//! need: ordered listing, one-time seeding, single-record CRUD and the bulk paths (clear,
//! bulk update and text import).
//!
//! ## Bulk writes
//!
//! Bulk operations are split into sequential batches no larger than the store allows. Each
//! batch is applied as a unit, but the sequence as a whole is best-effort: if batch *n*
//! fails after earlier batches were committed, the call returns
//! [`StaffingError::PartialCommit`] with the number of operations already durable. A failure
//! in the first batch is reported as the plain store error.

use crate::constants::{STAFF_COLLECTION, STAFF_ORDER_FIELD};
use crate::error::{StaffingError, StaffingResult};
use crate::import::{parse_import, ImportReport};
use crate::roster::seed_records;
use crate::staff::{NewStaff, StaffId, StaffMember, StaffPatch};
use crate::store::{DocumentStore, StoreError, WriteBatch};
use staffing_types::StaffShift;
use std::sync::Arc;

/// One write queued for a bulk operation.
enum StaffWrite {
    Create(NewStaff),
    Update(StaffId, StaffPatch),
    Delete(StaffId),
}

/// Service over the staff collection.
#[derive(Clone)]
pub struct StaffDirectoryService {
    store: Arc<dyn DocumentStore>,
}

impl StaffDirectoryService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Every staff member ordered by last name (ordinal, as stored).
    ///
    /// Documents that cannot be decoded are skipped with a warning.
    pub async fn list_all(&self) -> StaffingResult<Vec<StaffMember>> {
        let docs = self
            .store
            .list_ordered(STAFF_COLLECTION, STAFF_ORDER_FIELD)
            .await?;

        let mut staff = Vec::with_capacity(docs.len());
        for doc in &docs {
            match StaffMember::from_document(doc) {
                Ok(member) => staff.push(member),
                Err(e) => tracing::warn!(key = %doc.key, error = %e, "skipping unreadable staff record"),
            }
        }
        Ok(staff)
    }

    /// Insert the default roster if the collection is empty.
    ///
    /// Returns the number of records inserted (zero if any records already existed). The
    /// emptiness check and the inserts are not atomic.
    pub async fn seed_if_empty(&self) -> StaffingResult<usize> {
        let existing = self
            .store
            .list_ordered(STAFF_COLLECTION, STAFF_ORDER_FIELD)
            .await?;
        if !existing.is_empty() {
            tracing::debug!(count = existing.len(), "staff already present, skipping seed");
            return Ok(0);
        }

        let writes = seed_records().into_iter().map(StaffWrite::Create).collect();
        let seeded = self.commit_writes(writes).await?;
        tracing::info!(count = seeded, "seeded staff directory");
        Ok(seeded)
    }

    /// Add one staff member and return the id the store assigned.
    ///
    /// # Errors
    ///
    /// Returns [`StaffingError::Validation`] if the last name is blank.
    pub async fn add(&self, new: NewStaff) -> StaffingResult<StaffId> {
        let fields = new.to_fields()?;
        let key = self.store.create(STAFF_COLLECTION, fields).await?;
        tracing::info!(id = %key, "added staff member");
        Ok(StaffId::new(key))
    }

    /// Merge `patch` into an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`StaffingError::NotFound`] if `id` does not exist.
    pub async fn update(&self, id: &StaffId, patch: StaffPatch) -> StaffingResult<()> {
        self.store
            .update(STAFF_COLLECTION, id.as_str(), patch.to_fields()?)
            .await
            .map_err(not_found_or_store)?;
        tracing::info!(id = %id, "updated staff member");
        Ok(())
    }

    /// Remove one record. Removing an unknown id succeeds.
    pub async fn delete(&self, id: &StaffId) -> StaffingResult<()> {
        self.store.delete(STAFF_COLLECTION, id.as_str()).await?;
        tracing::info!(id = %id, "deleted staff member");
        Ok(())
    }

    /// Delete every staff record. Returns the number of records deleted.
    pub async fn clear_all(&self) -> StaffingResult<usize> {
        let docs = self
            .store
            .list_ordered(STAFF_COLLECTION, STAFF_ORDER_FIELD)
            .await?;
        let writes = docs
            .into_iter()
            .map(|doc| StaffWrite::Delete(StaffId::new(doc.key)))
            .collect();
        let deleted = self.commit_writes(writes).await?;
        tracing::info!(count = deleted, "cleared staff directory");
        Ok(deleted)
    }

    /// Apply the same patch to every id in `ids`. Returns the number of records updated.
    ///
    /// Only fields present in the patch change. An id that does not exist fails the batch
    /// it falls in.
    pub async fn bulk_update(&self, ids: &[StaffId], patch: &StaffPatch) -> StaffingResult<usize> {
        if ids.is_empty() || patch.is_empty() {
            return Ok(0);
        }
        let writes = ids
            .iter()
            .map(|id| StaffWrite::Update(id.clone(), patch.clone()))
            .collect();
        let updated = self.commit_writes(writes).await?;
        tracing::info!(count = updated, "bulk updated staff");
        Ok(updated)
    }

    /// Set only the shift field on every id in `ids`.
    pub async fn bulk_update_shift(&self, ids: &[StaffId], shift: StaffShift) -> StaffingResult<usize> {
        self.bulk_update(ids, &StaffPatch::shift_only(shift)).await
    }

    /// Parse `text` and insert every valid line.
    ///
    /// Per-line problems are reported in the returned [`ImportReport`]; only a store
    /// failure fails the call.
    pub async fn import_text(&self, text: &str) -> StaffingResult<ImportReport> {
        let parsed = parse_import(text);
        let writes = parsed.records.into_iter().map(StaffWrite::Create).collect();
        let success_count = self.commit_writes(writes).await?;
        tracing::info!(
            imported = success_count,
            rejected = parsed.errors.len(),
            "imported staff from text"
        );
        Ok(ImportReport {
            success_count,
            errors: parsed.errors,
        })
    }

    /// Commit `writes` in sequential batches of at most the store's batch limit.
    async fn commit_writes(&self, writes: Vec<StaffWrite>) -> StaffingResult<usize> {
        let max = self.store.max_batch_ops().max(1);
        let mut committed = 0;
        let mut batch = WriteBatch::new();

        for write in writes {
            match write {
                StaffWrite::Create(new) => {
                    batch.create(STAFF_COLLECTION, new.to_fields()?);
                }
                StaffWrite::Update(id, patch) => {
                    batch.update(STAFF_COLLECTION, id.as_str(), patch.to_fields()?);
                }
                StaffWrite::Delete(id) => batch.delete(STAFF_COLLECTION, id.as_str()),
            }
            if batch.len() == max {
                committed = self.flush(std::mem::take(&mut batch), committed).await?;
            }
        }
        if !batch.is_empty() {
            committed = self.flush(batch, committed).await?;
        }
        Ok(committed)
    }

    async fn flush(&self, batch: WriteBatch, committed: usize) -> StaffingResult<usize> {
        let len = batch.len();
        match self.store.commit(batch).await {
            Ok(()) => Ok(committed + len),
            Err(source) if committed > 0 => Err(StaffingError::PartialCommit { committed, source }),
            Err(e) => Err(not_found_or_store(e)),
        }
    }
}

fn not_found_or_store(e: StoreError) -> StaffingError {
    match e {
        StoreError::NotFound { key, .. } => StaffingError::NotFound(format!("staff member {key}")),
        other => StaffingError::Store(other),
    }
}
