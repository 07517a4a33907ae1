//! Wizard state transitions.
//!
//! Every change to a [`WizardSession`] is a [`WizardAction`] applied by [`reduce`], which
//! takes the current session by value and returns the next one. The reducer is pure: it
//! reads the roster but never touches the store.

use super::roster_view::{find_staff, whos_working_view};
use super::rooms::{self, find_room};
use super::session::{NoteField, Provider, ProviderRole, WizardSession, WizardStep};
use crate::repositories::shift_records::{PatientEntry, RoomPatients};
use crate::staff::{StaffId, StaffMember};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use staffing_types::ShiftLabel;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WizardAction {
    NextStep,
    PrevStep,
    NextRoom,
    PrevRoom,

    SetShiftDate { date: NaiveDate },
    SetShiftTime { label: ShiftLabel },
    SetCensus { census: Option<u32> },

    SetSearch { text: String },
    /// Flip one staff member's membership in the working set.
    ToggleWorking { id: StaffId },
    /// Toggle from the search grid; clears the search when someone is added.
    PickStaff { id: StaffId },
    /// Add every staff member matching the search who is not working yet.
    SelectAllShown,

    SetCharge { id: Option<StaffId> },
    SetResource { id: Option<StaffId> },
    SetLdRn { id: Option<StaffId> },
    SetRtName { name: String },
    SetRtPhone { phone: String },
    /// Pick a provider from the roster (or clear the pick); fills or clears the phone.
    SelectProvider { role: ProviderRole, id: Option<StaffId> },
    /// Type a provider name; an empty name clears the slot and its phone.
    SetProviderName { role: ProviderRole, name: String },
    SetProviderPhone { role: ProviderRole, phone: String },

    AssignToRoom { room: String, id: StaffId },
    RemoveFromRoom { room: String, id: StaffId },

    AddPatient { room: String, name: String, code: String },
    RemovePatient { room: String, index: usize },
    MovePatient { from: String, index: usize, to: String },
    /// Replace the patient map with one loaded from the shift record.
    LoadPatients { patients: RoomPatients },

    SetOverflowOpen { open: bool },
    SetNote { field: NoteField, text: String },
}

impl WizardAction {
    /// True for user edits of the patient map (not loads), which are what auto-save follows.
    pub fn edits_patients(&self) -> bool {
        matches!(
            self,
            WizardAction::AddPatient { .. }
                | WizardAction::RemovePatient { .. }
                | WizardAction::MovePatient { .. }
        )
    }
}

/// Apply `action` to `state`.
pub fn reduce(mut state: WizardSession, action: WizardAction, roster: &[StaffMember]) -> WizardSession {
    match action {
        WizardAction::NextStep => {
            if let Some(next) = state.step.next() {
                enter_step(&mut state, next);
            }
        }
        WizardAction::PrevStep => {
            if let Some(prev) = state.step.prev() {
                enter_step(&mut state, prev);
            }
        }
        WizardAction::NextRoom => {
            if state.room_index + 1 < rooms::room_count(state.overflow_open) {
                state.room_index += 1;
            }
        }
        WizardAction::PrevRoom => {
            state.room_index = state.room_index.saturating_sub(1);
        }

        WizardAction::SetShiftDate { date } => state.shift_date = date,
        WizardAction::SetShiftTime { label } => state.shift_time = label,
        WizardAction::SetCensus { census } => state.census = census,

        WizardAction::SetSearch { text } => state.search = text,
        WizardAction::ToggleWorking { id } => toggle_working(&mut state, &id, roster),
        WizardAction::PickStaff { id } => {
            let adding = !state.is_working(&id);
            toggle_working(&mut state, &id, roster);
            if adding {
                state.search.clear();
            }
        }
        WizardAction::SelectAllShown => {
            let shown: Vec<StaffId> = whos_working_view(roster, &state.search, state.shift_time)
                .into_iter()
                .filter(|s| !state.is_working(&s.id))
                .map(|s| s.id.clone())
                .collect();
            for id in shown {
                toggle_working(&mut state, &id, roster);
            }
            state.search.clear();
        }

        WizardAction::SetCharge { id } => state.charge = id,
        WizardAction::SetResource { id } => state.resource = id,
        WizardAction::SetLdRn { id } => state.ld_rn = id,
        WizardAction::SetRtName { name } => state.rt_name = name,
        WizardAction::SetRtPhone { phone } => state.rt_phone = phone,
        WizardAction::SelectProvider { role, id } => {
            let phone = id
                .as_ref()
                .and_then(|id| find_staff(roster, id))
                .map(|s| s.phone.clone())
                .unwrap_or_default();
            let (slot, slot_phone) = provider_slot(&mut state, role);
            *slot = id.map(Provider::Known);
            *slot_phone = phone;
        }
        WizardAction::SetProviderName { role, name } => {
            let (slot, slot_phone) = provider_slot(&mut state, role);
            if name.is_empty() {
                *slot = None;
                slot_phone.clear();
            } else {
                *slot = Some(Provider::Freehand(name));
            }
        }
        WizardAction::SetProviderPhone { role, phone } => {
            *provider_slot(&mut state, role).1 = phone;
        }

        WizardAction::AssignToRoom { room, id } => {
            let assignable = find_room(&room).is_some()
                && state.is_working(&id)
                && state.room_of(&id).is_none();
            if assignable {
                state.room_staff.entry(room).or_default().push(id);
            } else {
                tracing::debug!(%room, %id, "ignoring room assignment for unavailable staff");
            }
        }
        WizardAction::RemoveFromRoom { room, id } => {
            if let Some(staff) = state.room_staff.get_mut(&room) {
                staff.retain(|s| s != &id);
            }
        }

        WizardAction::AddPatient { room, name, code } => {
            let name = name.trim();
            if name.is_empty() {
                tracing::debug!(%room, "ignoring blank patient name");
            } else {
                state
                    .room_patients
                    .entry(room)
                    .or_default()
                    .push(PatientEntry::new(name, code.trim()));
            }
        }
        WizardAction::RemovePatient { room, index } => {
            if let Some(patients) = state.room_patients.get_mut(&room) {
                if index < patients.len() {
                    patients.remove(index);
                }
            }
        }
        WizardAction::MovePatient { from, index, to } => {
            let moved = state
                .room_patients
                .get_mut(&from)
                .filter(|patients| index < patients.len())
                .map(|patients| patients.remove(index));
            match moved {
                Some(patient) => state.room_patients.entry(to).or_default().push(patient),
                None => tracing::debug!(%from, index, "stale patient index, move ignored"),
            }
        }
        WizardAction::LoadPatients { patients } => state.room_patients = patients,

        WizardAction::SetOverflowOpen { open } => {
            state.overflow_open = open;
            let last = rooms::room_count(open).saturating_sub(1);
            state.room_index = state.room_index.min(last);
        }
        WizardAction::SetNote { field, text } => *state.notes.get_mut(field) = text,
    }
    state
}

fn enter_step(state: &mut WizardSession, step: WizardStep) {
    let leaving = matches!(state.step, WizardStep::WhosWorking | WizardStep::SpecialNotes);
    if leaving || step.uses_room_cursor() {
        state.room_index = 0;
    }
    state.step = step;
}

fn provider_slot(state: &mut WizardSession, role: ProviderRole) -> (&mut Option<Provider>, &mut String) {
    match role {
        ProviderRole::Md => (&mut state.md, &mut state.md_phone),
        ProviderRole::Np => (&mut state.np, &mut state.np_phone),
    }
}

fn toggle_working(state: &mut WizardSession, id: &StaffId, roster: &[StaffMember]) {
    let standing_charge = find_staff(roster, id).is_some_and(|s| s.is_charge_nurse);

    if state.is_working(id) {
        state.working.retain(|w| w != id);
        for staff in state.room_staff.values_mut() {
            staff.retain(|s| s != id);
        }
        if standing_charge && state.charge.as_ref() == Some(id) {
            state.charge = None;
        }
    } else {
        state.working.push(id.clone());
        if standing_charge && state.charge.is_none() {
            state.charge = Some(id.clone());
        }
    }
}
