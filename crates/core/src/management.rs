//! Staff management screen.
//!
//! [`StaffManagement`] drives the roster table: it keeps the loaded staff, the multi-row
//! [`Selection`], the add/edit [`StaffForm`] and the last user-facing [`Notice`]. Bulk edits
//! go through [`BulkEditForm`], where every field is either left unchanged or set to an
//! explicit value (including empty or false).

use crate::constants::DEFAULT_ROLE;
use crate::error::{StaffingError, StaffingResult};
use crate::import::ImportReport;
use crate::repositories::staff_directory::StaffDirectoryService;
use crate::staff::{required_last_name, NewStaff, StaffId, StaffMember, StaffPatch};
use serde::{Deserialize, Serialize};
use staffing_types::StaffShift;
use std::collections::BTreeSet;

pub const LOAD_FAILED: &str = "Failed to load staff. Please refresh the page.";
pub const SAVE_FAILED: &str = "Failed to save staff member.";
pub const DELETE_FAILED: &str = "Failed to delete staff member.";
pub const BULK_FAILED: &str = "Failed to update selected staff.";
pub const IMPORT_FAILED: &str = "Failed to import staff.";
pub const CLEAR_FAILED: &str = "Failed to clear staff.";

/// Rows ticked in the staff table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<StaffId>,
}

impl Selection {
    pub fn toggle(&mut self, id: &StaffId) {
        if !self.ids.remove(id) {
            self.ids.insert(id.clone());
        }
    }

    /// Select every id in `visible`, or clear the selection if all of them are selected.
    pub fn toggle_all<'a>(&mut self, visible: impl IntoIterator<Item = &'a StaffId>) {
        let visible: BTreeSet<StaffId> = visible.into_iter().cloned().collect();
        if !visible.is_empty() && visible.is_subset(&self.ids) {
            self.ids.clear();
        } else {
            self.ids = visible;
        }
    }

    /// Drop ids that are no longer in the roster.
    pub fn retain_existing(&mut self, roster: &[StaffMember]) {
        self.ids.retain(|id| roster.iter().any(|s| &s.id == id));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &StaffId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> Vec<StaffId> {
        self.ids.iter().cloned().collect()
    }
}

/// A bulk-edit field: leave it alone, or write this value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "camelCase")]
pub enum FieldChoice<T> {
    #[default]
    Unchanged,
    Set(T),
}

impl<T> FieldChoice<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            FieldChoice::Unchanged => None,
            FieldChoice::Set(value) => Some(value),
        }
    }
}

/// The bulk-edit form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkEditForm {
    pub role: FieldChoice<String>,
    pub shift: FieldChoice<StaffShift>,
    pub is_preceptee: FieldChoice<bool>,
    pub is_traveler: FieldChoice<bool>,
    pub is_charge_nurse: FieldChoice<bool>,
}

impl BulkEditForm {
    pub fn to_patch(&self) -> StaffPatch {
        StaffPatch {
            role: self.role.clone().into_option(),
            shift: self.shift.clone().into_option(),
            is_preceptee: self.is_preceptee.clone().into_option(),
            is_traveler: self.is_traveler.clone().into_option(),
            is_charge_nurse: self.is_charge_nurse.clone().into_option(),
            ..StaffPatch::default()
        }
    }
}

/// The add/edit form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StaffForm {
    pub last_name: String,
    pub first_name: String,
    pub phone: String,
    pub extension: String,
    pub role: String,
    pub shift: StaffShift,
    pub is_preceptee: bool,
    pub is_traveler: bool,
    pub is_charge_nurse: bool,
}

impl Default for StaffForm {
    fn default() -> Self {
        Self {
            last_name: String::new(),
            first_name: String::new(),
            phone: String::new(),
            extension: String::new(),
            role: DEFAULT_ROLE.to_string(),
            shift: StaffShift::Unset,
            is_preceptee: false,
            is_traveler: false,
            is_charge_nurse: false,
        }
    }
}

impl StaffForm {
    pub fn from_member(member: &StaffMember) -> Self {
        Self {
            last_name: member.last_name.clone(),
            first_name: member.first_name.clone(),
            phone: member.phone.clone(),
            extension: member.extension.clone(),
            role: member.role.clone(),
            shift: member.shift,
            is_preceptee: member.is_preceptee,
            is_traveler: member.is_traveler,
            is_charge_nurse: member.is_charge_nurse,
        }
    }

    pub fn to_new_staff(&self) -> NewStaff {
        NewStaff {
            last_name: self.last_name.clone(),
            first_name: self.first_name.clone(),
            phone: self.phone.clone(),
            extension: self.extension.clone(),
            role: self.role.clone(),
            shift: self.shift,
            is_preceptee: self.is_preceptee,
            is_traveler: self.is_traveler,
            is_charge_nurse: self.is_charge_nurse,
        }
    }

    /// Every form field, so clearing a field in the form clears it in the store.
    pub fn to_patch(&self) -> StaffingResult<StaffPatch> {
        let role = self.role.trim();
        Ok(StaffPatch {
            last_name: Some(required_last_name(&self.last_name)?),
            first_name: Some(self.first_name.trim().to_string()),
            phone: Some(self.phone.trim().to_string()),
            extension: Some(self.extension.trim().to_string()),
            role: Some(if role.is_empty() { DEFAULT_ROLE } else { role }.to_string()),
            shift: Some(self.shift),
            is_preceptee: Some(self.is_preceptee),
            is_traveler: Some(self.is_traveler),
            is_charge_nurse: Some(self.is_charge_nurse),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Message shown to the operator after an action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

/// Controller behind the staff management table.
pub struct StaffManagement {
    directory: StaffDirectoryService,
    staff: Vec<StaffMember>,
    selection: Selection,
    editing: Option<StaffId>,
    form: StaffForm,
    notice: Option<Notice>,
}

impl StaffManagement {
    pub fn new(directory: StaffDirectoryService) -> Self {
        Self {
            directory,
            staff: Vec::new(),
            selection: Selection::default(),
            editing: None,
            form: StaffForm::default(),
            notice: None,
        }
    }

    pub fn staff(&self) -> &[StaffMember] {
        &self.staff
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn form(&self) -> &StaffForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut StaffForm {
        &mut self.form
    }

    pub fn editing(&self) -> Option<&StaffId> {
        self.editing.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Reload the table and prune the selection to rows that still exist.
    pub async fn reload(&mut self) -> StaffingResult<()> {
        match self.directory.list_all().await {
            Ok(staff) => {
                self.staff = staff;
                self.selection.retain_existing(&self.staff);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "loading staff failed");
                self.notice = Some(Notice::error(LOAD_FAILED));
                Err(e)
            }
        }
    }

    /// Reset the form for a new record.
    pub fn begin_add(&mut self) {
        self.editing = None;
        self.form = StaffForm::default();
    }

    /// Fill the form from an existing row.
    pub fn begin_edit(&mut self, id: &StaffId) -> StaffingResult<()> {
        let member = self
            .staff
            .iter()
            .find(|s| &s.id == id)
            .ok_or_else(|| StaffingError::NotFound(format!("staff member {id}")))?;
        self.form = StaffForm::from_member(member);
        self.editing = Some(id.clone());
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.begin_add();
    }

    /// Save the form as an add or an edit.
    ///
    /// A validation failure keeps the form as entered so it can be corrected.
    pub async fn submit(&mut self) -> StaffingResult<()> {
        let result = match &self.editing {
            Some(id) => match self.form.to_patch() {
                Ok(patch) => self.directory.update(id, patch).await,
                Err(e) => Err(e),
            },
            None => self.directory.add(self.form.to_new_staff()).await.map(|_| ()),
        };
        match result {
            Ok(()) => {}
            Err(e @ StaffingError::Validation(_)) => {
                self.notice = Some(Notice::error(e.to_string()));
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(error = %e, "saving staff member failed");
                self.notice = Some(Notice::error(SAVE_FAILED));
                return Err(e);
            }
        }
        self.notice = Some(Notice::info(if self.editing.is_some() {
            "Staff member updated."
        } else {
            "Staff member added."
        }));
        self.begin_add();
        self.refresh_after_write().await;
        Ok(())
    }

    pub async fn delete(&mut self, id: &StaffId) -> StaffingResult<()> {
        if let Err(e) = self.directory.delete(id).await {
            tracing::warn!(error = %e, "deleting staff member failed");
            self.notice = Some(Notice::error(DELETE_FAILED));
            return Err(e);
        }
        if self.editing.as_ref() == Some(id) {
            self.begin_add();
        }
        self.refresh_after_write().await;
        Ok(())
    }

    /// Delete every selected row.
    pub async fn delete_selected(&mut self) -> StaffingResult<usize> {
        let ids = self.selection.ids();
        for id in &ids {
            if let Err(e) = self.directory.delete(id).await {
                tracing::warn!(error = %e, "deleting selected staff failed");
                self.notice = Some(Notice::error(DELETE_FAILED));
                self.refresh_after_write().await;
                return Err(e);
            }
        }
        self.notice = Some(Notice::info(format!("Deleted {} staff member(s).", ids.len())));
        self.refresh_after_write().await;
        Ok(ids.len())
    }

    pub async fn clear_all(&mut self) -> StaffingResult<usize> {
        let result = self.directory.clear_all().await;
        self.finish_bulk(result, CLEAR_FAILED, "Deleted").await
    }

    /// Set the shift on every selected row.
    pub async fn bulk_set_shift(&mut self, shift: StaffShift) -> StaffingResult<usize> {
        let result = self
            .directory
            .bulk_update_shift(&self.selection.ids(), shift)
            .await;
        self.finish_bulk(result, BULK_FAILED, "Updated").await
    }

    /// Apply the bulk-edit form to every selected row.
    pub async fn bulk_edit(&mut self, form: &BulkEditForm) -> StaffingResult<usize> {
        let result = self
            .directory
            .bulk_update(&self.selection.ids(), &form.to_patch())
            .await;
        self.finish_bulk(result, BULK_FAILED, "Updated").await
    }

    pub async fn import(&mut self, text: &str) -> StaffingResult<ImportReport> {
        match self.directory.import_text(text).await {
            Ok(report) => {
                let mut message = format!("Imported {} staff member(s).", report.success_count);
                if !report.errors.is_empty() {
                    message.push_str(&format!(" {} line(s) skipped.", report.errors.len()));
                }
                self.notice = Some(Notice::info(message));
                self.refresh_after_write().await;
                Ok(report)
            }
            Err(e) => {
                tracing::warn!(error = %e, "importing staff failed");
                self.notice = Some(Notice::error(bulk_failure_text(IMPORT_FAILED, &e)));
                self.refresh_after_write().await;
                Err(e)
            }
        }
    }

    async fn finish_bulk(
        &mut self,
        result: StaffingResult<usize>,
        failure: &str,
        verb: &str,
    ) -> StaffingResult<usize> {
        match result {
            Ok(count) => {
                self.notice = Some(Notice::info(format!("{verb} {count} staff member(s).")));
                self.refresh_after_write().await;
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "bulk staff operation failed");
                self.notice = Some(Notice::error(bulk_failure_text(failure, &e)));
                self.refresh_after_write().await;
                Err(e)
            }
        }
    }

    /// Reload after a write has been attempted.
    ///
    /// The write's own outcome is already in the notice and the return value, so a failed
    /// reload keeps both and leaves the previous rows on screen.
    async fn refresh_after_write(&mut self) {
        match self.directory.list_all().await {
            Ok(staff) => {
                self.staff = staff;
                self.selection.retain_existing(&self.staff);
            }
            Err(e) => tracing::warn!(error = %e, "reloading staff after a write failed"),
        }
    }
}

fn bulk_failure_text(failure: &str, e: &StaffingError) -> String {
    match e.committed_before_failure() {
        0 => failure.to_string(),
        n => format!("{failure} {n} change(s) were saved before the error."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{
        Document, DocumentStore, Fields, MemoryStore, StoreError, StoreResult, WriteBatch,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Memory store whose reads can be switched off while writes keep working.
    #[derive(Default)]
    struct ReadOutageStore {
        inner: MemoryStore,
        reads_down: AtomicBool,
    }

    #[async_trait]
    impl DocumentStore for ReadOutageStore {
        async fn list_ordered(&self, c: &str, f: &str) -> StoreResult<Vec<Document>> {
            if self.reads_down.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("reads down".into()));
            }
            self.inner.list_ordered(c, f).await
        }
        async fn get(&self, c: &str, k: &str) -> StoreResult<Option<Document>> {
            self.inner.get(c, k).await
        }
        async fn create(&self, c: &str, f: Fields) -> StoreResult<String> {
            self.inner.create(c, f).await
        }
        async fn update(&self, c: &str, k: &str, f: Fields) -> StoreResult<()> {
            self.inner.update(c, k, f).await
        }
        async fn set_merge(&self, c: &str, k: &str, f: Fields) -> StoreResult<()> {
            self.inner.set_merge(c, k, f).await
        }
        async fn delete(&self, c: &str, k: &str) -> StoreResult<()> {
            self.inner.delete(c, k).await
        }
        async fn commit(&self, b: WriteBatch) -> StoreResult<()> {
            self.inner.commit(b).await
        }
        fn max_batch_ops(&self) -> usize {
            self.inner.max_batch_ops()
        }
    }

    async fn screen() -> (Arc<MemoryStore>, StaffManagement) {
        let store = Arc::new(MemoryStore::new());
        let directory = StaffDirectoryService::new(store.clone());
        for (last, first) in [("Adams", "Kim"), ("Baker", ""), ("Clark", "Lou")] {
            directory.add(NewStaff::with_name(last, first, "")).await.unwrap();
        }
        let mut screen = StaffManagement::new(directory);
        screen.reload().await.unwrap();
        (store, screen)
    }

    fn ids(screen: &StaffManagement) -> Vec<StaffId> {
        screen.staff().iter().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn test_bulk_form_only_patches_chosen_fields() {
        let form = BulkEditForm {
            shift: FieldChoice::Set(StaffShift::Unset),
            is_traveler: FieldChoice::Set(false),
            ..BulkEditForm::default()
        };
        let patch = form.to_patch();

        assert_eq!(patch.shift, Some(StaffShift::Unset));
        assert_eq!(patch.is_traveler, Some(false));
        assert_eq!(patch.role, None);
        assert_eq!(patch.is_charge_nurse, None);
        assert!(BulkEditForm::default().to_patch().is_empty());
    }

    #[test]
    fn test_selection_toggle_all_flips_between_all_and_none() {
        let visible = vec![StaffId::from("a"), StaffId::from("b")];
        let mut selection = Selection::default();

        selection.toggle(&visible[0]);
        selection.toggle_all(&visible);
        assert_eq!(selection.len(), 2);

        selection.toggle_all(&visible);
        assert!(selection.is_empty());

        selection.toggle(&visible[1]);
        selection.toggle(&visible[1]);
        assert!(!selection.contains(&visible[1]));
    }

    #[test]
    fn test_form_defaults_and_validation() {
        let form = StaffForm::default();
        assert_eq!(form.role, "RN");
        assert!(matches!(form.to_patch(), Err(StaffingError::Validation(_))));
    }

    #[tokio::test]
    async fn test_blank_last_name_keeps_form() {
        let (_, mut screen) = screen().await;
        screen.begin_add();
        screen.form_mut().first_name = "Amy".into();

        assert!(screen.submit().await.is_err());
        assert_eq!(screen.form().first_name, "Amy");
        assert_eq!(screen.notice().map(|n| n.kind), Some(NoticeKind::Error));
        assert_eq!(screen.staff().len(), 3);
    }

    #[tokio::test]
    async fn test_edit_can_clear_fields() {
        let (_, mut screen) = screen().await;
        let adams = ids(&screen)[0].clone();

        screen.begin_edit(&adams).unwrap();
        screen.form_mut().first_name.clear();
        screen.form_mut().role = "RT".into();
        screen.submit().await.unwrap();

        let updated = &screen.staff()[0];
        assert_eq!(updated.first_name, "");
        assert_eq!(updated.role, "RT");
        assert!(screen.editing().is_none());
    }

    #[tokio::test]
    async fn test_bulk_shift_applies_to_selection_only() {
        let (_, mut screen) = screen().await;
        let all = ids(&screen);
        screen.selection_mut().toggle(&all[0]);
        screen.selection_mut().toggle(&all[2]);

        assert_eq!(screen.bulk_set_shift(StaffShift::Night).await.unwrap(), 2);
        let shifts: Vec<StaffShift> = screen.staff().iter().map(|s| s.shift).collect();
        assert_eq!(shifts, vec![StaffShift::Night, StaffShift::Unset, StaffShift::Night]);
    }

    #[tokio::test]
    async fn test_delete_prunes_selection() {
        let (_, mut screen) = screen().await;
        let all = ids(&screen);
        screen.selection_mut().toggle_all(&all);

        screen.delete(&all[1]).await.unwrap();
        assert_eq!(screen.selection().len(), 2);
        assert!(!screen.selection().contains(&all[1]));

        assert_eq!(screen.delete_selected().await.unwrap(), 2);
        assert!(screen.staff().is_empty());
        assert!(screen.selection().is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_sets_notice() {
        let (store, mut screen) = screen().await;
        store.set_unavailable(true);

        assert!(screen.reload().await.is_err());
        assert_eq!(screen.notice().map(|n| n.text.as_str()), Some(LOAD_FAILED));
        assert_eq!(screen.staff().len(), 3);
    }

    #[tokio::test]
    async fn test_import_reports_skipped_lines() {
        let (_, mut screen) = screen().await;
        let report = screen.import("Lee,Amy\nSmith,").await.unwrap();

        assert_eq!(report.success_count, 1);
        assert_eq!(screen.staff().len(), 4);
        assert_eq!(
            screen.notice().map(|n| n.text.as_str()),
            Some("Imported 1 staff member(s). 1 line(s) skipped.")
        );
    }

    #[tokio::test]
    async fn test_committed_write_keeps_success_when_refresh_fails() {
        let store = Arc::new(ReadOutageStore::default());
        let directory = StaffDirectoryService::new(store.clone());
        for last in ["Adams", "Baker"] {
            directory.add(NewStaff::with_name(last, "", "")).await.unwrap();
        }
        let mut screen = StaffManagement::new(directory);
        screen.reload().await.unwrap();
        let all = ids(&screen);
        screen.selection_mut().toggle_all(&all);

        store.reads_down.store(true, Ordering::SeqCst);
        assert_eq!(screen.bulk_set_shift(StaffShift::Day).await.unwrap(), 2);
        assert_eq!(
            screen.notice(),
            Some(&Notice::info("Updated 2 staff member(s)."))
        );
        assert!(screen.staff().iter().all(|s| s.shift == StaffShift::Unset));

        screen.import("Clark,Lou").await.unwrap();
        assert_eq!(screen.notice().map(|n| n.kind), Some(NoticeKind::Info));

        store.reads_down.store(false, Ordering::SeqCst);
        screen.reload().await.unwrap();
        assert_eq!(screen.staff().len(), 3);
        assert_eq!(screen.staff()[0].shift, StaffShift::Day);
    }
}
