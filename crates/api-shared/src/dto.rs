//! Wire types for the REST API.
//!
//! Field names are camelCase on the wire, matching the stored documents.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// One row of the staff directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffRes {
    pub id: String,
    pub last_name: String,
    pub first_name: String,
    pub phone: String,
    pub extension: String,
    pub role: String,
    /// `Day`, `Night` or empty.
    pub shift: String,
    pub is_preceptee: bool,
    pub is_traveler: bool,
    pub is_charge_nurse: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListStaffRes {
    pub staff: Vec<StaffRes>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateStaffReq {
    pub last_name: String,
    pub first_name: String,
    pub phone: String,
    pub extension: String,
    /// Defaults to `RN` when blank.
    pub role: String,
    pub shift: String,
    pub is_preceptee: bool,
    pub is_traveler: bool,
    pub is_charge_nurse: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreateStaffRes {
    pub id: String,
}

/// Partial update. Absent fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateStaffReq {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shift: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_preceptee: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_traveler: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_charge_nurse: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BulkUpdateReq {
    pub ids: Vec<String>,
    pub patch: UpdateStaffReq,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BulkShiftReq {
    pub ids: Vec<String>,
    /// `Day`, `Night`, or blank to unset.
    pub shift: String,
}

/// Number of records a bulk operation touched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CountRes {
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImportReq {
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImportLineErrorRes {
    pub line: usize,
    pub raw: String,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportRes {
    pub success_count: usize,
    pub errors: Vec<ImportLineErrorRes>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientDto {
    pub name: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftRecordRes {
    /// `YYYY-MM-DD`.
    pub shift_date: String,
    /// `7P-7A` or `7A-7P`.
    pub shift_time: String,
    pub room_babies: BTreeMap<String, Vec<PatientDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SavePatientsReq {
    pub room_babies: BTreeMap<String, Vec<PatientDto>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_req_absent_fields_stay_none() {
        let req: UpdateStaffReq = serde_json::from_str(r#"{"shift":"","isTraveler":false}"#).unwrap();
        assert_eq!(req.shift.as_deref(), Some(""));
        assert_eq!(req.is_traveler, Some(false));
        assert_eq!(req.last_name, None);
    }

    #[test]
    fn test_import_res_wire_names() {
        let res = ImportRes {
            success_count: 1,
            errors: vec![],
        };
        assert_eq!(
            serde_json::to_string(&res).unwrap(),
            r#"{"successCount":1,"errors":[]}"#
        );
    }
}
