//! Constants used throughout the staffing core crate.
//!
//! Collection names, storage defaults and the fixed phone numbers printed on the sheet live
//! here so the services, binaries and tests agree on them.

/// Collection holding one document per staff member.
pub const STAFF_COLLECTION: &str = "staff";

/// Collection holding one document per (date, shift label) pair.
pub const SHIFTS_COLLECTION: &str = "shifts";

/// Field the staff collection is ordered by when listed.
pub const STAFF_ORDER_FIELD: &str = "lastName";

/// Default directory for the file-backed store when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "staffing_data";

/// Upper bound on operations in one batched write.
pub const MAX_BATCH_OPS: usize = 500;

/// Default quiet period before patient assignments are auto-saved.
pub const DEFAULT_AUTOSAVE_MS: u64 = 1_000;

/// Role given to staff records that do not name one.
pub const DEFAULT_ROLE: &str = "RN";

/// Roles offered by the staff forms.
pub const KNOWN_ROLES: [&str; 5] = ["RN", "RT", "MD", "NP", "Other"];

/// Pre-filled NICU respiratory therapist phone.
pub const DEFAULT_NICU_RT_PHONE: &str = "76695";

/// L&D respiratory therapist phone, printed verbatim on every sheet.
pub const LD_RT_PHONE: &str = "76696";
