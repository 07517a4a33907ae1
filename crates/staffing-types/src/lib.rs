//! # Staffing Types
//!
//! Small validated primitives shared by the core services and the API layers:
//! - [`NonEmptyText`] for required free-text fields (staff last names, patient names)
//! - [`ShiftLabel`] for the two fixed shift labels a staffing sheet is built for
//! - [`StaffShift`] for the standing shift preference stored on a staff record

use std::fmt;
use std::str::FromStr;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input did not name a known shift
    #[error("unknown shift: '{0}'")]
    UnknownShift(String),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// Returns `Err(TextError::Empty)` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// The shift a staffing sheet is being built for.
///
/// Serialised with the labels printed on the sheet and used in shift record keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum ShiftLabel {
    /// 7 pm to 7 am.
    #[default]
    #[serde(rename = "7P-7A")]
    Night,
    /// 7 am to 7 pm.
    #[serde(rename = "7A-7P")]
    Day,
}

impl ShiftLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            ShiftLabel::Night => "7P-7A",
            ShiftLabel::Day => "7A-7P",
        }
    }

    /// The staff shift preference that matches this label.
    pub fn matching_staff_shift(self) -> StaffShift {
        match self {
            ShiftLabel::Night => StaffShift::Night,
            ShiftLabel::Day => StaffShift::Day,
        }
    }

    /// The staff shift preference on the other side of the clock.
    pub fn opposite_staff_shift(self) -> StaffShift {
        match self {
            ShiftLabel::Night => StaffShift::Day,
            ShiftLabel::Day => StaffShift::Night,
        }
    }
}

impl fmt::Display for ShiftLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftLabel {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7P-7A" => Ok(ShiftLabel::Night),
            "7A-7P" => Ok(ShiftLabel::Day),
            other => Err(TextError::UnknownShift(other.to_string())),
        }
    }
}

/// Standing shift preference on a staff record.
///
/// Stored as `"Day"`, `"Night"` or `""` when unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum StaffShift {
    Day,
    Night,
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl StaffShift {
    pub fn as_str(self) -> &'static str {
        match self {
            StaffShift::Day => "Day",
            StaffShift::Night => "Night",
            StaffShift::Unset => "",
        }
    }

    pub fn is_set(self) -> bool {
        self != StaffShift::Unset
    }

    /// Lenient parse used for free-text input (imports, CLI flags).
    ///
    /// Accepts `day`/`night` in any case; blank, `unset` and `none` mean unset.
    /// Anything else is rejected.
    pub fn parse_lenient(input: &str) -> Result<Self, TextError> {
        let trimmed = input.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "day" => Ok(StaffShift::Day),
            "night" => Ok(StaffShift::Night),
            "" | "unset" | "none" => Ok(StaffShift::Unset),
            _ => Err(TextError::UnknownShift(trimmed.to_string())),
        }
    }
}

impl fmt::Display for StaffShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffShift {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StaffShift::parse_lenient(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Lee  ").expect("non-empty");
        assert_eq!(text, NonEmptyText::new("Lee").unwrap());
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"Lee\"");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace_only() {
        assert_eq!(NonEmptyText::new("   ").unwrap_err(), TextError::Empty);
        assert_eq!(NonEmptyText::new("").unwrap_err(), TextError::Empty);
    }

    #[test]
    fn test_non_empty_text_deserialize_validates() {
        let ok: NonEmptyText = serde_json::from_str("\" Amy \"").unwrap();
        assert_eq!(ok, NonEmptyText::new("Amy").unwrap());
        assert!(serde_json::from_str::<NonEmptyText>("\"  \"").is_err());
    }

    #[test]
    fn test_shift_label_wire_format() {
        assert_eq!(serde_json::to_string(&ShiftLabel::Night).unwrap(), "\"7P-7A\"");
        assert_eq!(serde_json::to_string(&ShiftLabel::Day).unwrap(), "\"7A-7P\"");
        assert_eq!("7A-7P".parse::<ShiftLabel>().unwrap(), ShiftLabel::Day);
        assert!("7A-7A".parse::<ShiftLabel>().is_err());
        assert_eq!(ShiftLabel::default(), ShiftLabel::Night);
    }

    #[test]
    fn test_shift_label_matching_and_opposite() {
        assert_eq!(ShiftLabel::Night.matching_staff_shift(), StaffShift::Night);
        assert_eq!(ShiftLabel::Night.opposite_staff_shift(), StaffShift::Day);
        assert_eq!(ShiftLabel::Day.matching_staff_shift(), StaffShift::Day);
        assert_eq!(ShiftLabel::Day.opposite_staff_shift(), StaffShift::Night);
    }

    #[test]
    fn test_staff_shift_unset_is_empty_string() {
        assert_eq!(serde_json::to_string(&StaffShift::Unset).unwrap(), "\"\"");
        let parsed: StaffShift = serde_json::from_str("\"\"").unwrap();
        assert_eq!(parsed, StaffShift::Unset);
        let parsed: StaffShift = serde_json::from_str("\"Night\"").unwrap();
        assert_eq!(parsed, StaffShift::Night);
    }

    #[test]
    fn test_staff_shift_parse_lenient() {
        assert_eq!(StaffShift::parse_lenient("DAY").unwrap(), StaffShift::Day);
        assert_eq!(StaffShift::parse_lenient(" night ").unwrap(), StaffShift::Night);
        assert_eq!(StaffShift::parse_lenient("").unwrap(), StaffShift::Unset);
        assert_eq!(StaffShift::parse_lenient("unset").unwrap(), StaffShift::Unset);
        assert!(matches!(
            StaffShift::parse_lenient("evening"),
            Err(TextError::UnknownShift(s)) if s == "evening"
        ));
    }
}
