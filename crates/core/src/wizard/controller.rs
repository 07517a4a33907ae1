//! Wizard controller.
//!
//! [`StaffingWizard`] owns the session and the roster and is the only place that talks to
//! the store on the wizard's behalf:
//!
//! - the roster is loaded once, seeding an empty directory and falling back to the
//!   default roster when the store is unreachable;
//! - changing the shift date or label loads that shift's patient map (a missing record or
//!   a failed load keeps the current map);
//! - user edits of the patient map schedule a debounced save.

use super::reducer::{reduce, WizardAction};
use super::session::WizardSession;
use super::sheet::render_sheet;
use crate::autosave::PatientAutoSaver;
use crate::config::CoreConfig;
use crate::repositories::shift_records::ShiftRecordService;
use crate::repositories::staff_directory::StaffDirectoryService;
use crate::roster::fallback_roster;
use crate::staff::StaffMember;
use crate::store::DocumentStore;
use std::sync::Arc;

/// Where the wizard's roster came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RosterSource {
    /// Not loaded yet.
    Pending,
    /// Read from the staff directory.
    Directory,
    /// The directory was empty and has just been seeded.
    Seeded,
    /// The store could not be read; the default roster is shown instead.
    Fallback,
}

pub const ROSTER_LOAD_FAILED: &str = "Failed to load staff roster. Please refresh the page.";

pub struct StaffingWizard {
    directory: StaffDirectoryService,
    shifts: ShiftRecordService,
    autosave: PatientAutoSaver,
    roster: Vec<StaffMember>,
    roster_source: RosterSource,
    session: WizardSession,
}

impl StaffingWizard {
    pub fn new(store: Arc<dyn DocumentStore>, cfg: &CoreConfig, session: WizardSession) -> Self {
        let shifts = ShiftRecordService::new(store.clone());
        Self {
            directory: StaffDirectoryService::new(store),
            autosave: PatientAutoSaver::new(shifts.clone(), cfg.autosave_quiet_period()),
            shifts,
            roster: Vec::new(),
            roster_source: RosterSource::Pending,
            session,
        }
    }

    /// Load the roster and the current shift's patients.
    pub async fn start(&mut self) -> RosterSource {
        let source = self.load_roster().await;
        self.load_shift().await;
        source
    }

    /// Load the roster, seeding an empty directory first.
    ///
    /// Seed failures are logged and swallowed. Any listing failure switches to the default
    /// roster.
    pub async fn load_roster(&mut self) -> RosterSource {
        let (roster, source) = match self.directory.list_all().await {
            Ok(staff) if !staff.is_empty() => (staff, RosterSource::Directory),
            Ok(_) => {
                if let Err(e) = self.directory.seed_if_empty().await {
                    tracing::warn!(error = %e, "seeding the staff directory failed");
                }
                match self.directory.list_all().await {
                    Ok(staff) => (staff, RosterSource::Seeded),
                    Err(e) => {
                        tracing::warn!(error = %e, "reloading staff after seeding failed");
                        (fallback_roster(), RosterSource::Fallback)
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "staff directory unavailable, using default roster");
                (fallback_roster(), RosterSource::Fallback)
            }
        };
        self.roster = roster;
        self.roster_source = source;
        source
    }

    /// Replace the session's patient map with the stored one for the current shift, if any.
    pub async fn load_shift(&mut self) {
        let (date, label) = (self.session.shift_date, self.session.shift_time);
        match self.shifts.load(date, label).await {
            Ok(Some(record)) => {
                self.session = reduce(
                    std::mem::take(&mut self.session),
                    WizardAction::LoadPatients {
                        patients: record.room_babies,
                    },
                    &self.roster,
                );
            }
            Ok(None) => tracing::debug!(%date, shift = %label, "no stored patients for shift"),
            Err(e) => tracing::warn!(%date, shift = %label, error = %e, "loading shift patients failed"),
        }
    }

    /// Apply `action`, then load or save patient assignments as the change requires.
    pub async fn dispatch(&mut self, action: WizardAction) {
        let edits_patients = action.edits_patients();
        let before = (self.session.shift_date, self.session.shift_time);

        self.session = reduce(std::mem::take(&mut self.session), action, &self.roster);

        if (self.session.shift_date, self.session.shift_time) != before {
            self.load_shift().await;
        } else if edits_patients {
            self.autosave.schedule(
                self.session.shift_date,
                self.session.shift_time,
                self.session.room_patients.clone(),
            );
        }
    }

    pub fn session(&self) -> &WizardSession {
        &self.session
    }

    pub fn roster(&self) -> &[StaffMember] {
        &self.roster
    }

    pub fn roster_source(&self) -> RosterSource {
        self.roster_source
    }

    /// User-facing notice when the roster could not be loaded.
    pub fn roster_notice(&self) -> Option<&'static str> {
        (self.roster_source == RosterSource::Fallback).then_some(ROSTER_LOAD_FAILED)
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    pub fn render_sheet(&self) -> String {
        render_sheet(&self.session, &self.roster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SHIFTS_COLLECTION;
    use crate::repositories::shift_records::{PatientEntry, RoomPatients};
    use crate::staff::NewStaff;
    use crate::store::{Document, Fields, MemoryStore, StoreResult, WriteBatch};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use staffing_types::ShiftLabel;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Memory store that counts shift writes.
    struct CountingStore {
        inner: MemoryStore,
        shift_writes: AtomicUsize,
    }

    #[async_trait]
    impl DocumentStore for CountingStore {
        async fn list_ordered(&self, c: &str, f: &str) -> StoreResult<Vec<Document>> {
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
            if c == SHIFTS_COLLECTION {
                self.shift_writes.fetch_add(1, Ordering::SeqCst);
            }
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

    fn config() -> CoreConfig {
        CoreConfig::new(
            PathBuf::from("unused"),
            crate::config::StoreBackend::Memory,
            500,
            Duration::from_millis(1_000),
        )
        .unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn add_patient(name: &str) -> WizardAction {
        WizardAction::AddPatient {
            room: "room1".into(),
            name: name.into(),
            code: String::new(),
        }
    }

    #[tokio::test]
    async fn test_empty_directory_is_seeded() {
        let store = Arc::new(MemoryStore::new());
        let mut wizard = StaffingWizard::new(store, &config(), WizardSession::for_date(date(5)));

        assert_eq!(wizard.start().await, RosterSource::Seeded);
        assert_eq!(wizard.roster().len(), 38);
        assert!(wizard.roster_notice().is_none());
    }

    #[tokio::test]
    async fn test_existing_directory_is_used_as_is() {
        let store = Arc::new(MemoryStore::new());
        StaffDirectoryService::new(store.clone())
            .add(NewStaff::with_name("Lee", "Amy", "12345"))
            .await
            .unwrap();
        let mut wizard = StaffingWizard::new(store, &config(), WizardSession::for_date(date(5)));

        assert_eq!(wizard.load_roster().await, RosterSource::Directory);
        assert_eq!(wizard.roster().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_store_falls_back_to_default_roster() {
        let store = Arc::new(MemoryStore::new());
        store.set_unavailable(true);
        let mut wizard = StaffingWizard::new(store, &config(), WizardSession::for_date(date(5)));

        assert_eq!(wizard.start().await, RosterSource::Fallback);
        assert_eq!(wizard.roster().len(), 38);
        assert_eq!(wizard.roster_notice(), Some(ROSTER_LOAD_FAILED));
        assert!(wizard.session().room_patients.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_patient_edits_are_debounced_into_one_save() {
        let store = Arc::new(CountingStore {
            inner: MemoryStore::new(),
            shift_writes: AtomicUsize::new(0),
        });
        let mut wizard = StaffingWizard::new(store.clone(), &config(), WizardSession::for_date(date(5)));

        wizard.dispatch(add_patient("Baby A")).await;
        tokio::time::sleep(Duration::from_millis(400)).await;
        wizard.dispatch(add_patient("Baby B")).await;
        assert!(wizard.autosave_pending());

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        settle().await;
        assert_eq!(store.shift_writes.load(Ordering::SeqCst), 1);

        let stored = ShiftRecordService::new(store.clone())
            .load(date(5), ShiftLabel::Night)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.room_babies["room1"].len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_changing_date_loads_stored_patients_without_saving() {
        let store = Arc::new(CountingStore {
            inner: MemoryStore::new(),
            shift_writes: AtomicUsize::new(0),
        });
        let mut saved = RoomPatients::new();
        saved.insert("nest".into(), vec![PatientEntry::new("Twin A", "TA")]);
        ShiftRecordService::new(store.clone())
            .save_patient_map(date(6), ShiftLabel::Night, &saved)
            .await
            .unwrap();

        let mut wizard = StaffingWizard::new(store.clone(), &config(), WizardSession::for_date(date(5)));
        wizard.dispatch(WizardAction::SetShiftDate { date: date(6) }).await;
        assert_eq!(wizard.session().room_patients, saved);

        // A shift with nothing stored keeps the current map.
        wizard
            .dispatch(WizardAction::SetShiftTime { label: ShiftLabel::Day })
            .await;
        assert_eq!(wizard.session().room_patients, saved);

        tokio::time::sleep(Duration::from_millis(2_000)).await;
        settle().await;
        assert_eq!(store.shift_writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_failure_is_swallowed() {
        let store = Arc::new(MemoryStore::new());
        let mut wizard = StaffingWizard::new(store.clone(), &config(), WizardSession::for_date(date(5)));
        store.set_unavailable(true);

        wizard.dispatch(add_patient("Baby A")).await;
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        settle().await;

        assert_eq!(wizard.session().patients_in_room("room1").len(), 1);
        assert!(!wizard.autosave_pending());
    }

    #[tokio::test]
    async fn test_render_uses_loaded_roster() {
        let store = Arc::new(MemoryStore::new());
        let mut wizard = StaffingWizard::new(store, &config(), WizardSession::for_date(date(5)));
        wizard.start().await;

        let hollis = wizard
            .roster()
            .iter()
            .find(|s| s.last_name == "Hollis")
            .map(|s| s.id.clone())
            .unwrap();
        wizard.dispatch(WizardAction::ToggleWorking { id: hollis.clone() }).await;
        wizard.dispatch(WizardAction::SetCharge { id: Some(hollis) }).await;

        assert!(wizard.render_sheet().contains("CHARGE: HOLLIS (78229)"));
    }
}
