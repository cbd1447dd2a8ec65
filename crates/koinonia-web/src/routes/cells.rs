//! Cell route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::routes::to_http;
use crate::state::{AppState, RefreshMessage};
use koinonia_core::cell::model::{AttendanceMark, Cell, CellMeeting};
use koinonia_core::cell;

#[derive(Deserialize)]
pub struct CreateCellRequest {
    pub name: String,
    pub supervision_id: Option<String>,
    pub leader_id: Option<String>,
}

#[derive(Deserialize)]
pub struct AddMemberRequest {
    pub person_id: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "member".to_string()
}

#[derive(Deserialize)]
pub struct RecordMeetingRequest {
    pub meeting_date: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub attendance: Vec<AttendanceMark>,
}

pub async fn create_cell(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    Json(req): Json<CreateCellRequest>,
) -> Result<(StatusCode, Json<Cell>), (StatusCode, String)> {
    let cell = cell::create_cell(
        &state.db,
        &tenant,
        &req.name,
        req.supervision_id.as_deref(),
        req.leader_id.as_deref(),
    )
    .map_err(to_http)?;
    Ok((StatusCode::CREATED, Json(cell)))
}

pub async fn list_cells(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> Result<Json<Vec<Cell>>, (StatusCode, String)> {
    let cells = cell::list_cells(&state.db, &tenant).map_err(to_http)?;
    Ok(Json(cells))
}

pub async fn get_cell(
    State(state): State<AppState>,
    Path((tenant, id)): Path<(String, String)>,
) -> Result<Json<Cell>, (StatusCode, String)> {
    let cell = cell::get_cell(&state.db, &tenant, &id).map_err(to_http)?;
    Ok(Json(cell))
}

pub async fn add_member(
    State(state): State<AppState>,
    Path((tenant, id)): Path<(String, String)>,
    Json(req): Json<AddMemberRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    cell::add_member(&state.db, &tenant, &id, &req.person_id, &req.role).map_err(to_http)?;
    Ok(StatusCode::CREATED)
}

pub async fn record_meeting(
    State(state): State<AppState>,
    Path((tenant, id)): Path<(String, String)>,
    Json(req): Json<RecordMeetingRequest>,
) -> Result<(StatusCode, Json<CellMeeting>), (StatusCode, String)> {
    let meeting = cell::record_meeting(
        &state.db,
        &tenant,
        &id,
        &req.meeting_date,
        req.notes.as_deref(),
        &req.attendance,
    )
    .map_err(to_http)?;

    state.broadcast(RefreshMessage::DashboardRefresh { tenant_id: tenant });

    Ok((StatusCode::CREATED, Json(meeting)))
}

pub async fn list_meetings(
    State(state): State<AppState>,
    Path((tenant, id)): Path<(String, String)>,
) -> Result<Json<Vec<CellMeeting>>, (StatusCode, String)> {
    let meetings = cell::list_recent_meetings(&state.db, &tenant, &id, 20).map_err(to_http)?;
    Ok(Json(meetings))
}
