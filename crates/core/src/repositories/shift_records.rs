//! Per-shift patient records.
//!
//! One document per `(date, shift label)` pair in the `shifts` collection, keyed
//! `{YYYY-MM-DD}_{label}` (e.g. `2024-01-05_7P-7A`). The only mutable state kept per shift
//! is `roomBabies`, the room → patients map.
//!
//! Older documents hold patients as bare strings rather than `{name, code}` objects. Both
//! shapes are accepted when reading and normalised into [`PatientEntry`] immediately.

use crate::constants::SHIFTS_COLLECTION;
use crate::error::StaffingResult;
use crate::store::{encode_fields, DocumentStore};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use staffing_types::ShiftLabel;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A patient placed in a room.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PatientEntry {
    pub name: String,
    pub code: String,
}

impl PatientEntry {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }

    /// `name (code)`, or just `name` when there is no code.
    pub fn label(&self) -> String {
        if self.code.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.code)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredPatient {
    Bare(String),
    Entry {
        #[serde(default)]
        name: String,
        #[serde(default)]
        code: Option<String>,
    },
}

impl<'de> Deserialize<'de> for PatientEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match StoredPatient::deserialize(deserializer)? {
            StoredPatient::Bare(name) => PatientEntry::new(name, ""),
            StoredPatient::Entry { name, code } => PatientEntry::new(name, code.unwrap_or_default()),
        })
    }
}

/// Room id → ordered patients.
pub type RoomPatients = BTreeMap<String, Vec<PatientEntry>>;

/// A stored shift document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecord {
    pub shift_date: NaiveDate,
    pub shift_time: ShiftLabel,
    #[serde(default)]
    pub room_babies: RoomPatients,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PatientMapWrite<'a> {
    shift_date: NaiveDate,
    shift_time: ShiftLabel,
    room_babies: &'a RoomPatients,
    updated_at: String,
}

/// Composite document key for a shift.
pub fn shift_key(date: NaiveDate, label: ShiftLabel) -> String {
    format!("{}_{}", date.format("%Y-%m-%d"), label)
}

/// Service over the shifts collection.
#[derive(Clone)]
pub struct ShiftRecordService {
    store: Arc<dyn DocumentStore>,
}

impl ShiftRecordService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The stored record for this shift, or `None` if nothing was saved yet.
    pub async fn load(&self, date: NaiveDate, label: ShiftLabel) -> StaffingResult<Option<ShiftRecord>> {
        let key = shift_key(date, label);
        match self.store.get(SHIFTS_COLLECTION, &key).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    /// Merge the full patient map into the shift record, creating it if absent.
    ///
    /// `roomBabies` is replaced as a whole; other fields of the record are left alone.
    pub async fn save_patient_map(
        &self,
        date: NaiveDate,
        label: ShiftLabel,
        patients: &RoomPatients,
    ) -> StaffingResult<()> {
        let key = shift_key(date, label);
        let fields = encode_fields(&PatientMapWrite {
            shift_date: date,
            shift_time: label,
            room_babies: patients,
            updated_at: Utc::now().to_rfc3339(),
        })?;
        self.store.set_merge(SHIFTS_COLLECTION, &key, fields).await?;
        tracing::info!(shift = %key, "saved patient assignments");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Fields, MemoryStore};
    use serde_json::{json, Value};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    #[test]
    fn test_shift_key_format() {
        assert_eq!(shift_key(date(), ShiftLabel::Night), "2024-01-05_7P-7A");
        assert_eq!(shift_key(date(), ShiftLabel::Day), "2024-01-05_7A-7P");
    }

    #[test]
    fn test_legacy_bare_strings_are_normalised() {
        let patients: Vec<PatientEntry> =
            serde_json::from_value(json!(["Baby A", {"name": "Baby B", "code": "B2"}, {"name": "Baby C"}]))
                .unwrap();
        assert_eq!(
            patients,
            vec![
                PatientEntry::new("Baby A", ""),
                PatientEntry::new("Baby B", "B2"),
                PatientEntry::new("Baby C", ""),
            ]
        );
        assert_eq!(patients[1].label(), "Baby B (B2)");
        assert_eq!(patients[0].label(), "Baby A");
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let svc = ShiftRecordService::new(Arc::new(MemoryStore::new()));
        assert!(svc.load(date(), ShiftLabel::Night).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_room_map_and_keeps_other_fields() {
        let store = Arc::new(MemoryStore::new());
        let mut extra = Fields::new();
        extra.insert("roomAssignments".into(), json!({"room1": ["x"]}));
        store
            .set_merge(SHIFTS_COLLECTION, "2024-01-05_7P-7A", extra)
            .await
            .unwrap();

        let svc = ShiftRecordService::new(store.clone());
        let mut first = RoomPatients::new();
        first.insert("room1".into(), vec![PatientEntry::new("Baby A", "A1")]);
        first.insert("room2".into(), vec![PatientEntry::new("Baby B", "")]);
        svc.save_patient_map(date(), ShiftLabel::Night, &first).await.unwrap();

        let mut second = RoomPatients::new();
        second.insert("room3".into(), vec![PatientEntry::new("Baby C", "")]);
        svc.save_patient_map(date(), ShiftLabel::Night, &second).await.unwrap();

        let record = svc.load(date(), ShiftLabel::Night).await.unwrap().unwrap();
        assert_eq!(record.room_babies, second);
        assert_eq!(record.shift_time, ShiftLabel::Night);
        assert!(record.updated_at.is_some());

        let raw = store.get(SHIFTS_COLLECTION, "2024-01-05_7P-7A").await.unwrap().unwrap();
        assert_eq!(raw.fields["roomAssignments"], json!({"room1": ["x"]}));
        assert_eq!(raw.fields["shiftDate"], Value::String("2024-01-05".into()));
    }

    #[tokio::test]
    async fn test_load_reads_legacy_document() {
        let store = Arc::new(MemoryStore::new());
        let fields = match json!({
            "shiftDate": "2024-01-05",
            "shiftTime": "7A-7P",
            "roomBabies": {"nest": ["Twin A", {"name": "Twin B", "code": "TB"}]}
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        store.set_merge(SHIFTS_COLLECTION, "2024-01-05_7A-7P", fields).await.unwrap();

        let svc = ShiftRecordService::new(store);
        let record = svc.load(date(), ShiftLabel::Day).await.unwrap().unwrap();
        assert_eq!(
            record.room_babies["nest"],
            vec![PatientEntry::new("Twin A", ""), PatientEntry::new("Twin B", "TB")]
        );
    }
}
