//! Free-text staff import.
//!
//! Each non-blank line becomes one staff record. The delimiter is chosen per line: a comma
//! if the line has one, otherwise a tab, otherwise runs of whitespace. Fields are
//! positional:
//!
//! ```text
//! lastName, firstName, phone, extension, role, shift[, isPreceptee, isTraveler, isChargeNurse]
//! ```
//!
//! Missing trailing fields take the same defaults as a single add. Flags accept
//! `true`, `1` or `yes` (any case) as true. A line is rejected when the chosen delimiter yields
//! fewer than two non-empty fields or its last name is empty; rejected lines are reported
//! with their 1-based position in the input and never stop the rest of the import.

use crate::staff::NewStaff;
use serde::{Deserialize, Serialize};
use staffing_types::StaffShift;
use std::fmt;

pub const MISSING_LAST_NAME: &str = "Missing last name";

/// One rejected import line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportLineError {
    pub line: usize,
    pub raw: String,
    pub reason: String,
}

impl fmt::Display for ImportLineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {} ({:?})", self.line, self.reason, self.raw)
    }
}

/// Outcome of an import: how many records were written and which lines were rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub success_count: usize,
    pub errors: Vec<ImportLineError>,
}

impl ImportReport {
    /// Error messages in input order.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Records and rejections parsed from import text, before anything is written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedImport {
    pub records: Vec<NewStaff>,
    pub errors: Vec<ImportLineError>,
}

pub fn parse_import(text: &str) -> ParsedImport {
    let mut parsed = ParsedImport::default();
    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(record) => parsed.records.push(record),
            Err(reason) => parsed.errors.push(ImportLineError {
                line: idx + 1,
                raw: line.to_string(),
                reason: reason.to_string(),
            }),
        }
    }
    parsed
}

fn split_fields(line: &str) -> Vec<&str> {
    if line.contains(',') {
        line.split(',').map(str::trim).collect()
    } else if line.contains('\t') {
        line.split('\t').map(str::trim).collect()
    } else {
        line.split_whitespace().collect()
    }
}

fn parse_flag(token: Option<&&str>) -> bool {
    token.is_some_and(|t| {
        let t = t.to_ascii_lowercase();
        t == "true" || t == "1" || t == "yes"
    })
}

fn parse_line(line: &str) -> Result<NewStaff, &'static str> {
    let fields = split_fields(line);
    if fields.iter().filter(|f| !f.is_empty()).count() < 2 {
        return Err(MISSING_LAST_NAME);
    }

    let field = |i: usize| fields.get(i).copied().unwrap_or("").to_string();

    let last_name = field(0);
    if last_name.is_empty() {
        return Err(MISSING_LAST_NAME);
    }

    let shift_token = field(5);
    let shift = StaffShift::parse_lenient(&shift_token).unwrap_or_else(|_| {
        tracing::debug!(token = %shift_token, "unrecognised shift in import line, leaving unset");
        StaffShift::Unset
    });

    let mut record = NewStaff {
        last_name,
        first_name: field(1),
        phone: field(2),
        extension: field(3),
        shift,
        is_preceptee: parse_flag(fields.get(6)),
        is_traveler: parse_flag(fields.get(7)),
        is_charge_nurse: parse_flag(fields.get(8)),
        ..NewStaff::default()
    };
    let role = field(4);
    if !role.is_empty() {
        record.role = role;
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_valid_and_missing_last_name() {
        let parsed = parse_import("Lee,Amy,12345,21124,RN,Day\nSmith,");

        assert_eq!(parsed.records.len(), 1);
        let lee = &parsed.records[0];
        assert_eq!(lee.last_name, "Lee");
        assert_eq!(lee.first_name, "Amy");
        assert_eq!(lee.phone, "12345");
        assert_eq!(lee.extension, "21124");
        assert_eq!(lee.shift, StaffShift::Day);

        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].line, 2);
        assert_eq!(parsed.errors[0].reason, MISSING_LAST_NAME);
        assert_eq!(parsed.errors[0].raw, "Smith,");
    }

    #[test]
    fn test_comma_lines_are_not_resplit_on_spaces() {
        let parsed = parse_import("Medina Perez, Ana Maria, 29038");
        let r = &parsed.records[0];
        assert_eq!(r.last_name, "Medina Perez");
        assert_eq!(r.first_name, "Ana Maria");
        assert_eq!(r.phone, "29038");
    }

    #[test]
    fn test_tab_then_whitespace_delimiters() {
        let parsed = parse_import("Young Jr\tSam\t7879\n  Ford   Pat 5896 36036 RT night yes no 1  ");
        assert_eq!(parsed.records[0].last_name, "Young Jr");
        assert_eq!(parsed.records[0].first_name, "Sam");

        let ford = &parsed.records[1];
        assert_eq!(ford.last_name, "Ford");
        assert_eq!(ford.role, "RT");
        assert_eq!(ford.shift, StaffShift::Night);
        assert!(ford.is_preceptee);
        assert!(!ford.is_traveler);
        assert!(ford.is_charge_nurse);
    }

    #[test]
    fn test_defaults_for_missing_trailing_fields() {
        let parsed = parse_import("Lee Amy");
        let r = &parsed.records[0];
        assert_eq!(r.role, "RN");
        assert_eq!(r.shift, StaffShift::Unset);
        assert_eq!(r.phone, "");
        assert!(!r.is_traveler);
    }

    #[test]
    fn test_blank_lines_skipped_but_line_numbers_kept() {
        let parsed = parse_import("\n   \nLee,Amy\nSolo\n,Amy,123");
        assert_eq!(parsed.records.len(), 1);
        let lines: Vec<usize> = parsed.errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![4, 5]);
    }

    #[test]
    fn test_unknown_shift_token_is_unset() {
        let parsed = parse_import("Lee,Amy,1,2,RN,Evening");
        assert_eq!(parsed.records[0].shift, StaffShift::Unset);
    }

    #[test]
    fn test_single_field_lines_rejected_for_every_delimiter() {
        let parsed = parse_import("Lee,Amy\nLee\tAmy\nSmith,\nSmith\t\nSolo");
        assert_eq!(parsed.records.len(), 2);
        let lines: Vec<usize> = parsed.errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert!(parsed.errors.iter().all(|e| e.reason == MISSING_LAST_NAME));
    }

    #[test]
    fn test_error_message_format() {
        let err = ImportLineError {
            line: 2,
            raw: "Smith,".into(),
            reason: MISSING_LAST_NAME.into(),
        };
        assert_eq!(err.to_string(), "Line 2: Missing last name (\"Smith,\")");
    }
}
