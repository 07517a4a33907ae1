//! Conversions between the wire DTOs and the core types.

use api_shared::{
    CreateStaffReq, ImportLineErrorRes, ImportRes, PatientDto, ShiftRecordRes, StaffRes,
    UpdateStaffReq,
};
use axum::http::StatusCode;
use staffing_core::{
    staff::required_last_name, store::StoreError, ImportReport, NewStaff, PatientEntry, RoomPatients, ShiftRecord,
    StaffMember, StaffPatch, StaffShift, StaffingError,
};

pub(crate) type ApiError = (StatusCode, String);

/// Map a service error to the HTTP status the client sees.
pub(crate) fn api_error(e: StaffingError) -> ApiError {
    let status = match &e {
        StaffingError::Validation(_)
        | StaffingError::InvalidInput(_)
        | StaffingError::Store(StoreError::InvalidKey(_)) => StatusCode::BAD_REQUEST,
        StaffingError::NotFound(_) => StatusCode::NOT_FOUND,
        e if e.is_store_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("request failed: {:?}", e);
    }
    (status, e.to_string())
}

pub(crate) fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, message.into())
}

pub(crate) fn parse_shift(raw: &str) -> Result<StaffShift, ApiError> {
    StaffShift::parse_lenient(raw).map_err(|e| bad_request(e.to_string()))
}

pub(crate) fn staff_res(member: StaffMember) -> StaffRes {
    StaffRes {
        id: member.id.to_string(),
        last_name: member.last_name,
        first_name: member.first_name,
        phone: member.phone,
        extension: member.extension,
        role: member.role,
        shift: member.shift.as_str().to_string(),
        is_preceptee: member.is_preceptee,
        is_traveler: member.is_traveler,
        is_charge_nurse: member.is_charge_nurse,
    }
}

pub(crate) fn new_staff(req: CreateStaffReq) -> Result<NewStaff, ApiError> {
    Ok(NewStaff {
        shift: parse_shift(&req.shift)?,
        last_name: req.last_name,
        first_name: req.first_name,
        phone: req.phone,
        extension: req.extension,
        role: req.role,
        is_preceptee: req.is_preceptee,
        is_traveler: req.is_traveler,
        is_charge_nurse: req.is_charge_nurse,
    })
}

pub(crate) fn staff_patch(req: UpdateStaffReq) -> Result<StaffPatch, ApiError> {
    Ok(StaffPatch {
        shift: req.shift.as_deref().map(parse_shift).transpose()?,
        last_name: req
            .last_name
            .as_deref()
            .map(required_last_name)
            .transpose()
            .map_err(api_error)?,
        first_name: req.first_name,
        phone: req.phone,
        extension: req.extension,
        role: req.role,
        is_preceptee: req.is_preceptee,
        is_traveler: req.is_traveler,
        is_charge_nurse: req.is_charge_nurse,
    })
}

pub(crate) fn import_res(report: ImportReport) -> ImportRes {
    ImportRes {
        success_count: report.success_count,
        errors: report
            .errors
            .into_iter()
            .map(|e| ImportLineErrorRes {
                line: e.line,
                raw: e.raw,
                reason: e.reason,
            })
            .collect(),
    }
}

pub(crate) fn room_patients(
    rooms: std::collections::BTreeMap<String, Vec<PatientDto>>,
) -> RoomPatients {
    rooms
        .into_iter()
        .map(|(room, patients)| {
            let entries = patients
                .into_iter()
                .map(|p| PatientEntry::new(p.name, p.code))
                .collect();
            (room, entries)
        })
        .collect()
}

pub(crate) fn shift_record_res(record: ShiftRecord) -> ShiftRecordRes {
    ShiftRecordRes {
        shift_date: record.shift_date.format("%Y-%m-%d").to_string(),
        shift_time: record.shift_time.to_string(),
        room_babies: record
            .room_babies
            .into_iter()
            .map(|(room, patients)| {
                let dtos = patients
                    .into_iter()
                    .map(|p| PatientDto {
                        name: p.name,
                        code: p.code,
                    })
                    .collect();
                (room, dtos)
            })
            .collect(),
        updated_at: record.updated_at,
    }
}
