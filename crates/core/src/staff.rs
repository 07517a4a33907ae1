//! Staff records.
//!
//! A [`StaffMember`] is what the services hand out: the stored fields plus the document key
//! as its [`StaffId`]. [`NewStaff`] is the input to add, import and seed. [`StaffPatch`] is a
//! partial update in which every field is optional; a `None` field is left untouched while
//! `Some("")` or `Some(false)` is written.

use crate::constants::DEFAULT_ROLE;
use crate::error::{StaffingError, StaffingResult};
use crate::store::{decode_fields, encode_fields, Document, Fields, StoreResult};
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use staffing_types::{NonEmptyText, StaffShift};
use staffing_uuid::DocumentId;
use std::fmt;

pub const LAST_NAME_REQUIRED: &str = "Last name is required";

/// Validate a last name typed by the operator.
pub fn required_last_name(input: &str) -> StaffingResult<NonEmptyText> {
    NonEmptyText::new(input).map_err(|_| StaffingError::Validation(LAST_NAME_REQUIRED.into()))
}

/// Opaque identifier of a staff record (the store's document key).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffId(String);

impl StaffId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse an id supplied from outside (REST path, CLI argument).
    ///
    /// Stored staff ids are canonical document keys; anything else is rejected before it
    /// reaches the store.
    pub fn parse(input: &str) -> StaffingResult<Self> {
        DocumentId::parse(input.trim())
            .map(|id| Self(id.to_string()))
            .map_err(|e| StaffingError::InvalidInput(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StaffId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for StaffId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

/// Unknown shift strings in stored data read back as unset rather than failing the record.
fn lenient_shift<'de, D>(deserializer: D) -> Result<StaffShift, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .and_then(|s| StaffShift::parse_lenient(s).ok())
        .unwrap_or_default())
}

/// A staff member as stored in the directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: StaffId,
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub extension: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_shift")]
    pub shift: StaffShift,
    #[serde(default)]
    pub is_preceptee: bool,
    #[serde(default)]
    pub is_traveler: bool,
    #[serde(default)]
    pub is_charge_nurse: bool,
}

/// Stored shape of a staff document; the key is not part of the body.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StaffDocument {
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    extension: String,
    #[serde(default = "default_role")]
    role: String,
    #[serde(default, deserialize_with = "lenient_shift")]
    shift: StaffShift,
    #[serde(default)]
    is_preceptee: bool,
    #[serde(default)]
    is_traveler: bool,
    #[serde(default)]
    is_charge_nurse: bool,
}

impl StaffMember {
    /// Decode a stored staff document, taking the id from the document key.
    pub fn from_document(doc: &Document) -> StoreResult<Self> {
        let body: StaffDocument = decode_fields(doc.fields.clone())?;
        Ok(Self {
            id: StaffId::new(doc.key.clone()),
            last_name: body.last_name,
            first_name: body.first_name,
            phone: body.phone,
            extension: body.extension,
            role: body.role,
            shift: body.shift,
            is_preceptee: body.is_preceptee,
            is_traveler: body.is_traveler,
            is_charge_nurse: body.is_charge_nurse,
        })
    }

    /// `Last, First`, or just `Last` when there is no first name.
    pub fn display_name(&self) -> String {
        if self.first_name.is_empty() {
            self.last_name.clone()
        } else {
            format!("{}, {}", self.last_name, self.first_name)
        }
    }

    /// Sheet form: `LastPhone First`, or `LastPhone` when there is no first name.
    pub fn sheet_label(&self) -> String {
        if self.first_name.is_empty() {
            format!("{}{}", self.last_name, self.phone)
        } else {
            format!("{}{} {}", self.last_name, self.phone, self.first_name)
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

/// Input for a new staff record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewStaff {
    pub last_name: String,
    pub first_name: String,
    pub phone: String,
    pub extension: String,
    pub role: String,
    pub shift: StaffShift,
    pub is_preceptee: bool,
    pub is_traveler: bool,
    pub is_charge_nurse: bool,
}

impl Default for NewStaff {
    fn default() -> Self {
        Self {
            last_name: String::new(),
            first_name: String::new(),
            phone: String::new(),
            extension: String::new(),
            role: default_role(),
            shift: StaffShift::Unset,
            is_preceptee: false,
            is_traveler: false,
            is_charge_nurse: false,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StaffCreateDocument<'a> {
    last_name: NonEmptyText,
    first_name: &'a str,
    phone: &'a str,
    extension: &'a str,
    role: &'a str,
    shift: StaffShift,
    is_preceptee: bool,
    is_traveler: bool,
    is_charge_nurse: bool,
    created_at: String,
}

impl NewStaff {
    pub fn with_name(last_name: &str, first_name: &str, phone: &str) -> Self {
        Self {
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
            phone: phone.to_string(),
            ..Self::default()
        }
    }

    /// Document fields for a create, trimmed, with a blank role defaulted and
    /// `createdAt` stamped.
    ///
    /// # Errors
    ///
    /// Returns [`StaffingError::Validation`] if the last name is blank.
    pub(crate) fn to_fields(&self) -> StaffingResult<Fields> {
        let role = self.role.trim();
        Ok(encode_fields(&StaffCreateDocument {
            last_name: required_last_name(&self.last_name)?,
            first_name: self.first_name.trim(),
            phone: self.phone.trim(),
            extension: self.extension.trim(),
            role: if role.is_empty() { DEFAULT_ROLE } else { role },
            shift: self.shift,
            is_preceptee: self.is_preceptee,
            is_traveler: self.is_traveler,
            is_charge_nurse: self.is_charge_nurse,
            created_at: Utc::now().to_rfc3339(),
        })?)
    }
}

/// Partial update of a staff record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffPatch {
    /// A blank last name is rejected when the patch is built or deserialised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<NonEmptyText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift: Option<StaffShift>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_preceptee: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_traveler: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_charge_nurse: Option<bool>,
}

impl StaffPatch {
    pub fn shift_only(shift: StaffShift) -> Self {
        Self {
            shift: Some(shift),
            ..Self::default()
        }
    }

    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Document fields for a merge: only present fields, plus `updatedAt`.
    pub(crate) fn to_fields(&self) -> StoreResult<Fields> {
        let mut fields = encode_fields(self)?;
        fields.insert(
            "updatedAt".to_string(),
            serde_json::Value::String(Utc::now().to_rfc3339()),
        );
        Ok(fields)
    }
}
