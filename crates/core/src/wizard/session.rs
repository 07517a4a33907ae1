//! Wizard session state.
//!
//! Everything the wizard collects lives in one [`WizardSession`] value. Only the patient map
//! is ever persisted (through the shift record); the rest exists to render the sheet.

use super::rooms::{self, Room};
use crate::constants::DEFAULT_NICU_RT_PHONE;
use crate::repositories::shift_records::{PatientEntry, RoomPatients};
use crate::staff::StaffId;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use staffing_types::ShiftLabel;
use std::collections::BTreeMap;

/// The seven wizard steps, in order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    #[default]
    ShiftInfo,
    BabyAssignments,
    WhosWorking,
    KeyRoles,
    RoomAssignments,
    SpecialNotes,
    Generate,
}

impl WizardStep {
    pub const ALL: [WizardStep; 7] = [
        WizardStep::ShiftInfo,
        WizardStep::BabyAssignments,
        WizardStep::WhosWorking,
        WizardStep::KeyRoles,
        WizardStep::RoomAssignments,
        WizardStep::SpecialNotes,
        WizardStep::Generate,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::ShiftInfo => "Shift Info",
            WizardStep::BabyAssignments => "Baby Assignments",
            WizardStep::WhosWorking => "Who's Working",
            WizardStep::KeyRoles => "Key Roles",
            WizardStep::RoomAssignments => "Room Assignments",
            WizardStep::SpecialNotes => "Special Notes",
            WizardStep::Generate => "Generate",
        }
    }

    /// The following step; `None` from the terminal step.
    pub fn next(self) -> Option<WizardStep> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// The preceding step; `None` from the first step.
    pub fn prev(self) -> Option<WizardStep> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// Steps that walk the room cursor through the rooms in play.
    pub fn uses_room_cursor(self) -> bool {
        matches!(self, WizardStep::BabyAssignments | WizardStep::RoomAssignments)
    }
}

/// An MD or NP on the sheet: someone from the roster, or a name typed in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Provider {
    Known(StaffId),
    Freehand(String),
}

/// Which provider slot an action targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderRole {
    #[serde(rename = "MD")]
    Md,
    #[serde(rename = "NP")]
    Np,
}

impl ProviderRole {
    /// Staff role string that qualifies someone for this slot.
    pub fn staff_role(self) -> &'static str {
        match self {
            ProviderRole::Md => "MD",
            ProviderRole::Np => "NP",
        }
    }
}

/// Free-text notes printed in the sheet footer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Notes {
    pub isolation: String,
    pub medical_updates: String,
    pub sick_flexed: String,
    pub name_alert: String,
    pub rooming_in: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoteField {
    Isolation,
    MedicalUpdates,
    SickFlexed,
    NameAlert,
    RoomingIn,
}

impl Notes {
    pub fn get_mut(&mut self, field: NoteField) -> &mut String {
        match field {
            NoteField::Isolation => &mut self.isolation,
            NoteField::MedicalUpdates => &mut self.medical_updates,
            NoteField::SickFlexed => &mut self.sick_flexed,
            NoteField::NameAlert => &mut self.name_alert,
            NoteField::RoomingIn => &mut self.rooming_in,
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn default_rt_phone() -> String {
    DEFAULT_NICU_RT_PHONE.to_string()
}

/// Everything the wizard has collected so far.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSession {
    #[serde(default)]
    pub step: WizardStep,
    #[serde(default = "today")]
    pub shift_date: NaiveDate,
    #[serde(default)]
    pub shift_time: ShiftLabel,
    #[serde(default)]
    pub census: Option<u32>,
    /// Staff marked present, in the order they were picked.
    #[serde(default)]
    pub working: Vec<StaffId>,
    #[serde(default)]
    pub charge: Option<StaffId>,
    #[serde(default)]
    pub resource: Option<StaffId>,
    #[serde(default)]
    pub ld_rn: Option<StaffId>,
    #[serde(default)]
    pub rt_name: String,
    #[serde(default = "default_rt_phone")]
    pub rt_phone: String,
    #[serde(default)]
    pub md: Option<Provider>,
    #[serde(default)]
    pub md_phone: String,
    #[serde(default)]
    pub np: Option<Provider>,
    #[serde(default)]
    pub np_phone: String,
    /// Room id → staff assigned there.
    #[serde(default)]
    pub room_staff: BTreeMap<String, Vec<StaffId>>,
    /// Room id → patients, mirrored from the shift record.
    #[serde(default)]
    pub room_patients: RoomPatients,
    #[serde(default)]
    pub notes: Notes,
    #[serde(default)]
    pub room_index: usize,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub overflow_open: bool,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::for_date(today())
    }
}

impl WizardSession {
    /// A fresh night-shift session for `shift_date`.
    pub fn for_date(shift_date: NaiveDate) -> Self {
        Self {
            step: WizardStep::ShiftInfo,
            shift_date,
            shift_time: ShiftLabel::default(),
            census: None,
            working: Vec::new(),
            charge: None,
            resource: None,
            ld_rn: None,
            rt_name: String::new(),
            rt_phone: default_rt_phone(),
            md: None,
            md_phone: String::new(),
            np: None,
            np_phone: String::new(),
            room_staff: BTreeMap::new(),
            room_patients: RoomPatients::new(),
            notes: Notes::default(),
            room_index: 0,
            search: String::new(),
            overflow_open: false,
        }
    }

    pub fn is_working(&self, id: &StaffId) -> bool {
        self.working.contains(id)
    }

    /// The room `id` is assigned to, if any.
    pub fn room_of(&self, id: &StaffId) -> Option<&str> {
        self.room_staff
            .iter()
            .find(|(_, staff)| staff.contains(id))
            .map(|(room, _)| room.as_str())
    }

    /// Working staff not yet assigned to any room, in working order.
    pub fn available_for_rooms(&self) -> Vec<StaffId> {
        self.working
            .iter()
            .filter(|id| self.room_of(id).is_none())
            .cloned()
            .collect()
    }

    pub fn rooms_in_play(&self) -> Vec<&'static Room> {
        rooms::rooms_in_play(self.overflow_open).collect()
    }

    /// The room under the cursor.
    pub fn current_room(&self) -> Option<&'static Room> {
        rooms::rooms_in_play(self.overflow_open).nth(self.room_index)
    }

    pub fn staff_in_room(&self, room_id: &str) -> &[StaffId] {
        self.room_staff.get(room_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn patients_in_room(&self, room_id: &str) -> &[PatientEntry] {
        self.room_patients.get(room_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_sequence() {
        assert_eq!(WizardStep::ShiftInfo.prev(), None);
        assert_eq!(WizardStep::ShiftInfo.next(), Some(WizardStep::BabyAssignments));
        assert_eq!(WizardStep::Generate.next(), None);
        assert_eq!(WizardStep::Generate.prev(), Some(WizardStep::SpecialNotes));
        assert_eq!(WizardStep::KeyRoles.title(), "Key Roles");
    }

    #[test]
    fn test_session_defaults() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let session = WizardSession::for_date(date);
        assert_eq!(session.shift_time, ShiftLabel::Night);
        assert_eq!(session.rt_phone, "76695");
        assert_eq!(session.current_room().map(|r| r.id), Some("room1"));
        assert_eq!(session.rooms_in_play().len(), 14);
    }

    #[test]
    fn test_partial_json_session_fills_defaults() {
        let session: WizardSession = serde_json::from_value(json!({
            "shiftDate": "2024-03-09",
            "shiftTime": "7A-7P",
            "md": {"kind": "freehand", "value": "Dr. Gray"}
        }))
        .unwrap();

        assert_eq!(session.shift_time, ShiftLabel::Day);
        assert_eq!(session.md, Some(Provider::Freehand("Dr. Gray".into())));
        assert_eq!(session.rt_phone, "76695");
        assert!(session.working.is_empty());
    }

    #[test]
    fn test_available_excludes_room_assigned() {
        let mut session = WizardSession::for_date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        session.working = vec![StaffId::from("a"), StaffId::from("b")];
        session.room_staff.insert("room1".into(), vec![StaffId::from("a")]);

        assert_eq!(session.available_for_rooms(), vec![StaffId::from("b")]);
        assert_eq!(session.room_of(&StaffId::from("a")), Some("room1"));
    }
}
