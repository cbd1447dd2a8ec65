//! Supervision route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::routes::to_http;
use crate::state::{AppState, RefreshMessage};
use koinonia_core::cell::model::AttendanceMark;
use koinonia_core::supervision::model::{
    Supervision, SupervisionAlert, SupervisionDashboard,
};
use koinonia_core::supervision;

#[derive(Deserialize)]
pub struct CreateSupervisionRequest {
    pub name: String,
    pub parent_id: Option<String>,
    pub supervisor_id: Option<String>,
}

#[derive(Deserialize)]
pub struct RecordVisitRequest {
    pub cell_id: String,
    pub visitor_id: Option<String>,
    pub visit_date: String,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct RecordMeetingRequest {
    pub meeting_date: String,
    pub agenda: Option<String>,
    #[serde(default)]
    pub attendance: Vec<AttendanceMark>,
}

pub async fn create_supervision(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    Json(req): Json<CreateSupervisionRequest>,
) -> Result<(StatusCode, Json<Supervision>), (StatusCode, String)> {
    let supervision = supervision::create_supervision(
        &state.db,
        &tenant,
        &req.name,
        req.parent_id.as_deref(),
        req.supervisor_id.as_deref(),
    )
    .map_err(to_http)?;
    Ok((StatusCode::CREATED, Json(supervision)))
}

pub async fn list_supervisions(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> Result<Json<Vec<Supervision>>, (StatusCode, String)> {
    let supervisions = supervision::list_supervisions(&state.db, &tenant).map_err(to_http)?;
    Ok(Json(supervisions))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Path((tenant, id)): Path<(String, String)>,
) -> Result<Json<SupervisionDashboard>, (StatusCode, String)> {
    let dashboard = supervision::get_dashboard(&state.db, &tenant, &id).map_err(to_http)?;
    Ok(Json(dashboard))
}

pub async fn get_status(
    State(state): State<AppState>,
    Path((tenant, id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let status = supervision::get_status(&state.db, &tenant, &id).map_err(to_http)?;
    Ok(Json(serde_json::json!({ "supervision_id": id, "status": status.as_str() })))
}

pub async fn generate_alerts(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> Result<Json<Vec<SupervisionAlert>>, (StatusCode, String)> {
    let alerts = supervision::generate_alerts(&state.db, &tenant).map_err(to_http)?;

    state.broadcast(RefreshMessage::AlertsChanged { tenant_id: tenant });

    Ok(Json(alerts))
}

pub async fn list_alerts(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> Result<Json<Vec<SupervisionAlert>>, (StatusCode, String)> {
    let alerts = supervision::list_unresolved_alerts(&state.db, &tenant).map_err(to_http)?;
    Ok(Json(alerts))
}

pub async fn resolve_alert(
    State(state): State<AppState>,
    Path((tenant, id)): Path<(String, String)>,
) -> Result<StatusCode, (StatusCode, String)> {
    supervision::resolve_alert(&state.db, &tenant, &id).map_err(to_http)?;

    state.broadcast(RefreshMessage::AlertsChanged { tenant_id: tenant });

    Ok(StatusCode::NO_CONTENT)
}

pub async fn record_visit(
    State(state): State<AppState>,
    Path((tenant, id)): Path<(String, String)>,
    Json(req): Json<RecordVisitRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    supervision::record_visit(
        &state.db,
        &tenant,
        &id,
        &req.cell_id,
        req.visitor_id.as_deref(),
        &req.visit_date,
        req.notes.as_deref(),
    )
    .map_err(to_http)?;
    Ok(StatusCode::CREATED)
}

pub async fn record_meeting(
    State(state): State<AppState>,
    Path((tenant, id)): Path<(String, String)>,
    Json(req): Json<RecordMeetingRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), (StatusCode, String)> {
    let meeting_id = supervision::record_supervision_meeting(
        &state.db,
        &tenant,
        &id,
        &req.meeting_date,
        req.agenda.as_deref(),
        &req.attendance,
    )
    .map_err(to_http)?;

    state.broadcast(RefreshMessage::DashboardRefresh { tenant_id: tenant });

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "meeting_id": meeting_id }))))
}
