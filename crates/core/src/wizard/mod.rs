//! The seven-step staffing wizard.
//!
//! - [`session`]: the state collected across the steps
//! - [`reducer`]: pure state transitions
//! - [`roster_view`]: filtering and ordering of the roster for each step
//! - [`rooms`]: the unit's fixed rooms
//! - [`sheet`]: rendering of the printable sheet
//! - [`controller`]: store-backed roster and shift loading, debounced auto-save

pub mod controller;
pub mod reducer;
pub mod rooms;
pub mod roster_view;
pub mod session;
pub mod sheet;

pub use controller::{RosterSource, StaffingWizard};
pub use reducer::{reduce, WizardAction};
pub use rooms::{Room, ROOMS};
pub use session::{NoteField, Notes, Provider, ProviderRole, WizardSession, WizardStep};
pub use sheet::render_sheet;
