//! # Staffing Core
//!
//! Core business logic for building NICU shift staffing sheets.
//!
//! This crate contains the data operations and the wizard state machine:
//! - A narrow record store interface with in-memory and JSON-file backends
//! - The staff directory (seed, CRUD, bulk edits, text import)
//! - Per-shift patient assignments with debounced auto-save
//! - The seven-step staffing wizard and the pure sheet renderer
//! - The staff management controller (selection and bulk edit forms)
//!
//! **No API concerns**: HTTP servers and command-line parsing belong in `api-rest` and
//! `staffing-cli`.

pub mod autosave;
pub mod config;
pub mod constants;
pub mod error;
pub mod import;
pub mod management;
pub mod repositories;
pub mod roster;
pub mod staff;
pub mod store;
pub mod wizard;

pub use config::{CoreConfig, StoreBackend};
pub use error::{StaffingError, StaffingResult};
pub use import::{ImportLineError, ImportReport};
pub use repositories::shift_records::{PatientEntry, RoomPatients, ShiftRecord, ShiftRecordService};
pub use repositories::staff_directory::StaffDirectoryService;
pub use staff::{NewStaff, StaffId, StaffMember, StaffPatch};
pub use staffing_types::{NonEmptyText, ShiftLabel, StaffShift};
pub use store::{DocumentStore, JsonFileStore, MemoryStore};

use std::sync::Arc;

/// Build the record store selected by `cfg`.
pub fn open_store(cfg: &CoreConfig) -> Arc<dyn DocumentStore> {
    match cfg.store_backend() {
        StoreBackend::File => Arc::new(JsonFileStore::with_max_batch_ops(
            cfg.data_dir(),
            cfg.max_batch_ops(),
        )),
        StoreBackend::Memory => Arc::new(MemoryStore::with_max_batch_ops(cfg.max_batch_ops())),
    }
}
