//! # API REST
//!
//! REST API for the staffing sheet builder.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Uses `api-shared` for wire types and `staffing-core` for every data operation.

#![warn(rust_2018_idioms)]

mod convert;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    BulkShiftReq, BulkUpdateReq, CountRes, CreateStaffReq, CreateStaffRes, HealthRes,
    HealthService, ImportLineErrorRes, ImportReq, ImportRes, ListStaffRes, PatientDto,
    SavePatientsReq, ShiftRecordRes, StaffRes, UpdateStaffReq,
};
use convert::{api_error, bad_request, ApiError};
use staffing_core::{
    wizard::{render_sheet, WizardSession},
    DocumentStore, ShiftLabel, ShiftRecordService, StaffDirectoryService, StaffId,
};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    directory: StaffDirectoryService,
    shifts: ShiftRecordService,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            directory: StaffDirectoryService::new(store.clone()),
            shifts: ShiftRecordService::new(store),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_staff,
        create_staff,
        update_staff,
        delete_staff,
        clear_staff,
        seed_staff,
        bulk_update,
        bulk_shift,
        import_staff,
        get_shift,
        save_shift_patients,
        sheet,
    ),
    components(schemas(
        HealthRes,
        StaffRes,
        ListStaffRes,
        CreateStaffReq,
        CreateStaffRes,
        UpdateStaffReq,
        BulkUpdateReq,
        BulkShiftReq,
        CountRes,
        ImportReq,
        ImportRes,
        ImportLineErrorRes,
        PatientDto,
        ShiftRecordRes,
        SavePatientsReq,
    ))
)]
pub struct ApiDoc;

/// Build the REST router over `store`, with Swagger UI and permissive CORS.
pub fn router(store: Arc<dyn DocumentStore>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/staff", get(list_staff).post(create_staff).delete(clear_staff))
        .route("/staff/seed", post(seed_staff))
        .route("/staff/bulk", post(bulk_update))
        .route("/staff/bulk/shift", post(bulk_shift))
        .route("/staff/import", post(import_staff))
        .route("/staff/:id", put(update_staff).delete(delete_staff))
        .route("/shifts/:date/:shift", get(get_shift))
        .route("/shifts/:date/:shift/patients", put(save_shift_patients))
        .route("/sheet", post(sheet))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(store))
}

fn parse_shift_path(date: &str, shift: &str) -> Result<(NaiveDate, ShiftLabel), ApiError> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| bad_request(format!("invalid shift date: {date}")))?;
    let label = shift
        .parse::<ShiftLabel>()
        .map_err(|e| bad_request(e.to_string()))?;
    Ok((date, label))
}

fn staff_id(raw: &str) -> Result<StaffId, ApiError> {
    StaffId::parse(raw).map_err(api_error)
}

fn staff_ids(ids: &[String]) -> Result<Vec<StaffId>, ApiError> {
    ids.iter().map(|id| staff_id(id)).collect()
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
#[axum::debug_handler]
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/staff",
    responses(
        (status = 200, description = "Staff ordered by last name", body = ListStaffRes),
        (status = 503, description = "Record store unavailable")
    )
)]
/// List the whole staff directory, ordered by last name.
#[axum::debug_handler]
async fn list_staff(State(state): State<AppState>) -> Result<Json<ListStaffRes>, ApiError> {
    let staff = state.directory.list_all().await.map_err(api_error)?;
    Ok(Json(ListStaffRes {
        staff: staff.into_iter().map(convert::staff_res).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/staff",
    request_body = CreateStaffReq,
    responses(
        (status = 201, description = "Staff member added", body = CreateStaffRes),
        (status = 400, description = "Blank last name or unknown shift"),
        (status = 503, description = "Record store unavailable")
    )
)]
/// Add one staff member.
///
/// # Errors
/// Returns `400 Bad Request` if the last name is blank or the shift is not `Day`, `Night`
/// or blank.
#[axum::debug_handler]
async fn create_staff(
    State(state): State<AppState>,
    Json(req): Json<CreateStaffReq>,
) -> Result<(StatusCode, Json<CreateStaffRes>), ApiError> {
    let new = convert::new_staff(req)?;
    let id = state.directory.add(new).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(CreateStaffRes { id: id.to_string() })))
}

#[utoipa::path(
    put,
    path = "/staff/{id}",
    request_body = UpdateStaffReq,
    params(("id" = String, Path, description = "Staff id")),
    responses(
        (status = 204, description = "Staff member updated"),
        (status = 400, description = "Invalid id or patch"),
        (status = 404, description = "No such staff member")
    )
)]
/// Merge the supplied fields into one staff record.
#[axum::debug_handler]
async fn update_staff(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStaffReq>,
) -> Result<StatusCode, ApiError> {
    let id = staff_id(&id)?;
    let patch = convert::staff_patch(req)?;
    state
        .directory
        .update(&id, patch)
        .await
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/staff/{id}",
    params(("id" = String, Path, description = "Staff id")),
    responses(
        (status = 204, description = "Staff member removed (or was never there)"),
        (status = 400, description = "Invalid id")
    )
)]
/// Remove one staff record.
#[axum::debug_handler]
async fn delete_staff(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = staff_id(&id)?;
    state
        .directory
        .delete(&id)
        .await
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/staff",
    responses(
        (status = 200, description = "Number of records deleted", body = CountRes)
    )
)]
/// Delete every staff record.
#[axum::debug_handler]
async fn clear_staff(State(state): State<AppState>) -> Result<Json<CountRes>, ApiError> {
    let count = state.directory.clear_all().await.map_err(api_error)?;
    Ok(Json(CountRes { count }))
}

#[utoipa::path(
    post,
    path = "/staff/seed",
    responses(
        (status = 200, description = "Number of records seeded (0 if the directory was not empty)", body = CountRes)
    )
)]
/// Load the default roster into an empty directory.
#[axum::debug_handler]
async fn seed_staff(State(state): State<AppState>) -> Result<Json<CountRes>, ApiError> {
    let count = state.directory.seed_if_empty().await.map_err(api_error)?;
    Ok(Json(CountRes { count }))
}

#[utoipa::path(
    post,
    path = "/staff/bulk",
    request_body = BulkUpdateReq,
    responses(
        (status = 200, description = "Number of records updated", body = CountRes),
        (status = 404, description = "An id does not exist"),
        (status = 500, description = "Bulk write stopped part way")
    )
)]
/// Apply the same patch to every listed id.
#[axum::debug_handler]
async fn bulk_update(
    State(state): State<AppState>,
    Json(req): Json<BulkUpdateReq>,
) -> Result<Json<CountRes>, ApiError> {
    let ids = staff_ids(&req.ids)?;
    let patch = convert::staff_patch(req.patch)?;
    let count = state
        .directory
        .bulk_update(&ids, &patch)
        .await
        .map_err(api_error)?;
    Ok(Json(CountRes { count }))
}

#[utoipa::path(
    post,
    path = "/staff/bulk/shift",
    request_body = BulkShiftReq,
    responses(
        (status = 200, description = "Number of records updated", body = CountRes),
        (status = 400, description = "Unknown shift")
    )
)]
/// Set the shift on every listed id.
#[axum::debug_handler]
async fn bulk_shift(
    State(state): State<AppState>,
    Json(req): Json<BulkShiftReq>,
) -> Result<Json<CountRes>, ApiError> {
    let ids = staff_ids(&req.ids)?;
    let shift = convert::parse_shift(&req.shift)?;
    let count = state
        .directory
        .bulk_update_shift(&ids, shift)
        .await
        .map_err(api_error)?;
    Ok(Json(CountRes { count }))
}

#[utoipa::path(
    post,
    path = "/staff/import",
    request_body = ImportReq,
    responses(
        (status = 200, description = "Import report; bad lines are listed, not fatal", body = ImportRes)
    )
)]
/// Import staff from pasted text, one person per line.
#[axum::debug_handler]
async fn import_staff(
    State(state): State<AppState>,
    Json(req): Json<ImportReq>,
) -> Result<Json<ImportRes>, ApiError> {
    let report = state
        .directory
        .import_text(&req.text)
        .await
        .map_err(api_error)?;
    Ok(Json(convert::import_res(report)))
}

#[utoipa::path(
    get,
    path = "/shifts/{date}/{shift}",
    params(
        ("date" = String, Path, description = "Shift date, YYYY-MM-DD"),
        ("shift" = String, Path, description = "7P-7A or 7A-7P")
    ),
    responses(
        (status = 200, description = "Stored shift record", body = ShiftRecordRes),
        (status = 404, description = "Nothing saved for this shift")
    )
)]
/// Fetch the stored patient assignments for one shift.
#[axum::debug_handler]
async fn get_shift(
    State(state): State<AppState>,
    Path((date, shift)): Path<(String, String)>,
) -> Result<Json<ShiftRecordRes>, ApiError> {
    let (date, label) = parse_shift_path(&date, &shift)?;
    match state.shifts.load(date, label).await.map_err(api_error)? {
        Some(record) => Ok(Json(convert::shift_record_res(record))),
        None => Err((StatusCode::NOT_FOUND, format!("no record for {date} {label}"))),
    }
}

#[utoipa::path(
    put,
    path = "/shifts/{date}/{shift}/patients",
    request_body = SavePatientsReq,
    params(
        ("date" = String, Path, description = "Shift date, YYYY-MM-DD"),
        ("shift" = String, Path, description = "7P-7A or 7A-7P")
    ),
    responses(
        (status = 204, description = "Patient map saved")
    )
)]
/// Replace the room-to-patients map of one shift, creating the record if needed.
#[axum::debug_handler]
async fn save_shift_patients(
    State(state): State<AppState>,
    Path((date, shift)): Path<(String, String)>,
    Json(req): Json<SavePatientsReq>,
) -> Result<StatusCode, ApiError> {
    let (date, label) = parse_shift_path(&date, &shift)?;
    let patients = convert::room_patients(req.room_babies);
    state
        .shifts
        .save_patient_map(date, label, &patients)
        .await
        .map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/sheet",
    responses(
        (status = 200, description = "Rendered staffing sheet", body = String, content_type = "text/plain")
    )
)]
/// Render the staffing sheet for a wizard session, resolving staff against the directory.
#[axum::debug_handler]
async fn sheet(
    State(state): State<AppState>,
    Json(session): Json<WizardSession>,
) -> Result<impl IntoResponse, ApiError> {
    let roster = state.directory.list_all().await.map_err(api_error)?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_sheet(&session, &roster),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use staffing_core::MemoryStore;
    use tower::ServiceExt;

    fn app() -> (Arc<MemoryStore>, Router) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), router(store))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    fn json_body(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (_, app) = app();
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["ok"], true);
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let (_, app) = app();
        let (status, body) = send(
            &app,
            "POST",
            "/staff",
            Some(json!({"lastName": "Lee", "firstName": "Amy", "shift": "night"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = json_body(&body)["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, "GET", "/staff", None).await;
        assert_eq!(status, StatusCode::OK);
        let staff = &json_body(&body)["staff"];
        assert_eq!(staff[0]["id"], id.as_str());
        assert_eq!(staff[0]["role"], "RN");
        assert_eq!(staff[0]["shift"], "Night");
    }

    #[tokio::test]
    async fn test_blank_last_name_is_bad_request() {
        let (store, app) = app();
        let (status, _) = send(&app, "POST", "/staff", Some(json!({"lastName": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(store.count("staff").await, 0);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (_, app) = app();
        let uri = "/staff/0123456789abcdef0123456789abcdef";
        let (status, _) = send(&app, "PUT", uri, Some(json!({"role": "RT"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "DELETE", uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_malformed_staff_id_is_bad_request() {
        let (store, app) = app();
        let (_, body) = send(&app, "POST", "/staff", Some(json!({"lastName": "Lee"}))).await;
        assert_eq!(store.count("staff").await, 1);
        let id = json_body(&body)["id"].as_str().unwrap().to_string();

        let (status, _) = send(&app, "PUT", "/staff/nobody", Some(json!({"role": "RT"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, "DELETE", "/staff/..%2Fstaff", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "POST",
            "/staff/bulk/shift",
            Some(json!({"ids": [&id, "nobody"], "shift": "Day"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/staff/{id}"),
            Some(json!({"lastName": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(store.count("staff").await, 1);
    }

    #[tokio::test]
    async fn test_import_reports_bad_lines() {
        let (_, app) = app();
        let (status, body) = send(
            &app,
            "POST",
            "/staff/import",
            Some(json!({"text": "Lee,Amy,12345\nSmith"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let report = json_body(&body);
        assert_eq!(report["successCount"], 1);
        assert_eq!(report["errors"][0]["line"], 2);
    }

    #[tokio::test]
    async fn test_seed_bulk_shift_and_clear() {
        let (_, app) = app();
        let (_, body) = send(&app, "POST", "/staff/seed", None).await;
        let seeded = json_body(&body)["count"].as_u64().unwrap();
        assert!(seeded > 0);

        let (_, body) = send(&app, "GET", "/staff", None).await;
        let first = json_body(&body)["staff"][0]["id"].as_str().unwrap().to_string();
        let (status, body) = send(
            &app,
            "POST",
            "/staff/bulk/shift",
            Some(json!({"ids": [first], "shift": "Day"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["count"], 1);

        let (status, _) = send(
            &app,
            "POST",
            "/staff/bulk/shift",
            Some(json!({"ids": [], "shift": "Evening"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(&app, "DELETE", "/staff", None).await;
        assert_eq!(json_body(&body)["count"].as_u64(), Some(seeded));
    }

    #[tokio::test]
    async fn test_shift_patients_round_trip() {
        let (_, app) = app();
        let (status, _) = send(&app, "GET", "/shifts/2024-01-05/7P-7A", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            "PUT",
            "/shifts/2024-01-05/7P-7A/patients",
            Some(json!({"roomBabies": {"room1": [{"name": "Baby A", "code": "A1"}]}})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, "GET", "/shifts/2024-01-05/7P-7A", None).await;
        assert_eq!(status, StatusCode::OK);
        let record = json_body(&body);
        assert_eq!(record["shiftTime"], "7P-7A");
        assert_eq!(record["roomBabies"]["room1"][0]["code"], "A1");

        let (status, _) = send(&app, "GET", "/shifts/2024-13-05/7P-7A", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_sheet_is_plain_text() {
        let (_, app) = app();
        let (status, body) = send(
            &app,
            "POST",
            "/sheet",
            Some(json!({"shiftDate": "2024-01-05", "shiftTime": "7A-7P", "census": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with("NICU STAFFING SHEET: 1/5/24 SHIFT: 7A-7P CENSUS: 3"));
    }

    #[tokio::test]
    async fn test_store_outage_is_service_unavailable() {
        let (store, app) = app();
        store.set_unavailable(true);
        let (status, _) = send(&app, "GET", "/staff", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
