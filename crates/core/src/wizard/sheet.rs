//! Staffing sheet rendering.
//!
//! [`render_sheet`] turns a session and the roster into the printable text sheet. It has no
//! side effects: the same session and roster always produce the same bytes.
//!
//! ```text
//! NICU STAFFING SHEET: 1/5/24 SHIFT: 7P-7A CENSUS: 12 CHARGE: LEE, AMY (12345)
//! L&D RN: FORD (5896) NICU RT: Pat (76695) L&D RT: 76696 MD: HOUSE, GREG (4242) NP: Dr. Gray ()
//!
//! Room 1 ext. 21124
//!   Baby A (A1), Baby B
//!   Lee12345 Amy
//! ...
//! RESOURCE:
//!   Young7879
//!
//! NAME ALERT:
//! ROOMING IN:
//! ```

use super::rooms::{self, Room, MAIN_GRID_LEN};
use super::roster_view::find_staff;
use super::session::{Provider, WizardSession};
use crate::constants::LD_RT_PHONE;
use crate::staff::{StaffId, StaffMember};
use chrono::{Datelike, NaiveDate};
use std::fmt::Write;

/// `M/D/YY` without zero padding on month and day.
pub fn format_sheet_date(date: NaiveDate) -> String {
    format!("{}/{}/{:02}", date.month(), date.day(), date.year().rem_euclid(100))
}

fn upper_name(roster: &[StaffMember], id: Option<&StaffId>) -> (String, String) {
    id.and_then(|id| find_staff(roster, id))
        .map(|s| (s.display_name().to_uppercase(), s.phone.clone()))
        .unwrap_or_default()
}

fn provider_name(roster: &[StaffMember], provider: Option<&Provider>) -> String {
    match provider {
        Some(Provider::Known(id)) => upper_name(roster, Some(id)).0,
        Some(Provider::Freehand(name)) => name.clone(),
        None => String::new(),
    }
}

fn push_block(out: &mut String, heading: &str, text: &str) {
    out.push_str(heading);
    out.push('\n');
    for line in text.lines() {
        let _ = writeln!(out, "  {line}");
    }
}

fn push_room(out: &mut String, session: &WizardSession, roster: &[StaffMember], room: &Room) {
    out.push_str(&room.heading());
    out.push('\n');

    let patients = session.patients_in_room(room.id);
    if !patients.is_empty() {
        let labels: Vec<String> = patients.iter().map(|p| p.label()).collect();
        let _ = writeln!(out, "  {}", labels.join(", "));
    }
    for staff in session
        .staff_in_room(room.id)
        .iter()
        .filter_map(|id| find_staff(roster, id))
    {
        let _ = writeln!(out, "  {}", staff.sheet_label());
    }
}

/// Render the staffing sheet for `session`, resolving staff ids against `roster`.
pub fn render_sheet(session: &WizardSession, roster: &[StaffMember]) -> String {
    let mut out = String::new();

    let census = session.census.map(|c| c.to_string()).unwrap_or_default();
    let (charge, charge_phone) = upper_name(roster, session.charge.as_ref());
    let _ = writeln!(
        out,
        "NICU STAFFING SHEET: {} SHIFT: {} CENSUS: {} CHARGE: {} ({})",
        format_sheet_date(session.shift_date),
        session.shift_time,
        census,
        charge,
        charge_phone
    );

    let (ld_rn, ld_rn_phone) = upper_name(roster, session.ld_rn.as_ref());
    let _ = writeln!(
        out,
        "L&D RN: {} ({}) NICU RT: {} ({}) L&D RT: {} MD: {} ({}) NP: {} ({})",
        ld_rn,
        ld_rn_phone,
        session.rt_name,
        session.rt_phone,
        LD_RT_PHONE,
        provider_name(roster, session.md.as_ref()),
        session.md_phone,
        provider_name(roster, session.np.as_ref()),
        session.np_phone
    );

    for room in rooms::ROOMS.iter().take(MAIN_GRID_LEN) {
        out.push('\n');
        push_room(&mut out, session, roster, room);
    }
    for room in rooms::rooms_in_play(session.overflow_open).skip(MAIN_GRID_LEN) {
        out.push('\n');
        push_room(&mut out, session, roster, room);
    }

    out.push('\n');
    out.push_str("RESOURCE:\n");
    if let Some(resource) = session.resource.as_ref().and_then(|id| find_staff(roster, id)) {
        let _ = writeln!(out, "  {}", resource.sheet_label());
    }

    let notes = &session.notes;
    out.push('\n');
    push_block(&mut out, "NAME ALERT:", &notes.name_alert);
    push_block(&mut out, "ROOMING IN:", &notes.rooming_in);
    for (heading, text) in [
        ("ISOLATION:", &notes.isolation),
        ("SICK/FLEXED:", &notes.sick_flexed),
        ("MEDICAL UPDATES:", &notes.medical_updates),
    ] {
        if !text.trim().is_empty() {
            push_block(&mut out, heading, text);
        }
    }
    out
}
