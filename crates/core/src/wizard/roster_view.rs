//! Roster projections used by the wizard steps.

use super::session::{ProviderRole, WizardSession};
use crate::staff::{StaffId, StaffMember};
use staffing_types::ShiftLabel;
use std::cmp::Ordering;

pub fn find_staff<'a>(roster: &'a [StaffMember], id: &StaffId) -> Option<&'a StaffMember> {
    roster.iter().find(|s| &s.id == id)
}

/// Case-insensitive substring match against last name, first name or `Last, First`.
pub fn matches_search(staff: &StaffMember, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    staff.last_name.to_lowercase().contains(&needle)
        || staff.first_name.to_lowercase().contains(&needle)
        || staff.display_name().to_lowercase().contains(&needle)
}

fn shift_rank(staff: &StaffMember, label: ShiftLabel) -> u8 {
    if staff.shift == label.matching_staff_shift() {
        0
    } else if staff.shift == label.opposite_staff_shift() {
        2
    } else {
        1
    }
}

/// Order for the who's-working grid: staff on this shift first, the opposite shift last,
/// then by last name ignoring case.
pub fn compare_for_shift(a: &StaffMember, b: &StaffMember, label: ShiftLabel) -> Ordering {
    shift_rank(a, label)
        .cmp(&shift_rank(b, label))
        .then_with(|| a.last_name.to_lowercase().cmp(&b.last_name.to_lowercase()))
}

/// The roster filtered by `search` and sorted for `label`.
pub fn whos_working_view<'a>(
    roster: &'a [StaffMember],
    search: &str,
    label: ShiftLabel,
) -> Vec<&'a StaffMember> {
    let mut shown: Vec<&StaffMember> = roster.iter().filter(|s| matches_search(s, search)).collect();
    shown.sort_by(|a, b| compare_for_shift(a, b, label));
    shown
}

/// Working staff resolved against the roster, in working order.
pub fn working_staff<'a>(session: &WizardSession, roster: &'a [StaffMember]) -> Vec<&'a StaffMember> {
    session
        .working
        .iter()
        .filter_map(|id| find_staff(roster, id))
        .collect()
}

/// Working staff eligible for the MD or NP slot.
pub fn provider_candidates<'a>(
    session: &WizardSession,
    roster: &'a [StaffMember],
    role: ProviderRole,
) -> Vec<&'a StaffMember> {
    working_staff(session, roster)
        .into_iter()
        .filter(|s| s.has_role(role.staff_role()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use staffing_types::StaffShift;

    fn member(id: &str, last: &str, first: &str, shift: StaffShift) -> StaffMember {
        StaffMember {
            id: StaffId::from(id),
            last_name: last.into(),
            first_name: first.into(),
            phone: String::new(),
            extension: String::new(),
            role: "RN".into(),
            shift,
            is_preceptee: false,
            is_traveler: false,
            is_charge_nurse: false,
        }
    }

    fn roster() -> Vec<StaffMember> {
        vec![
            member("1", "zed", "", StaffShift::Night),
            member("2", "Adams", "Kim", StaffShift::Day),
            member("3", "Baker", "", StaffShift::Unset),
            member("4", "azor", "Nola", StaffShift::Night),
            member("5", "Clark", "", StaffShift::Day),
        ]
    }

    fn ids(view: &[&StaffMember]) -> Vec<String> {
        view.iter().map(|s| s.id.to_string()).collect()
    }

    #[test]
    fn test_night_shift_ordering() {
        let roster = roster();
        let view = whos_working_view(&roster, "", ShiftLabel::Night);
        assert_eq!(ids(&view), vec!["4", "1", "3", "2", "5"]);
    }

    #[test]
    fn test_day_shift_ordering() {
        let roster = roster();
        let view = whos_working_view(&roster, "", ShiftLabel::Day);
        assert_eq!(ids(&view), vec!["2", "5", "3", "4", "1"]);
    }

    #[test]
    fn test_search_matches_combined_form_case_insensitively() {
        let roster = roster();
        assert_eq!(ids(&whos_working_view(&roster, "AZOR, n", ShiftLabel::Night)), vec!["4"]);
        assert_eq!(ids(&whos_working_view(&roster, "kim", ShiftLabel::Night)), vec!["2"]);
        assert!(whos_working_view(&roster, "nobody", ShiftLabel::Night).is_empty());
    }

    #[test]
    fn test_provider_candidates_are_working_with_role() {
        let mut roster = roster();
        roster[1].role = "MD".into();
        roster[2].role = "MD".into();
        let mut session = WizardSession::for_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        session.working = vec![StaffId::from("2"), StaffId::from("4")];

        let mds = provider_candidates(&session, &roster, ProviderRole::Md);
        assert_eq!(ids(&mds), vec!["2"]);
        assert!(provider_candidates(&session, &roster, ProviderRole::Np).is_empty());
    }
}
