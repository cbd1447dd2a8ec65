//! Consolidation route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::routes::to_http;
use crate::state::{AppState, RefreshMessage};
use koinonia_core::consolidation::model::{
    ConsolidationEvent, ConsolidationStats, Convert, FunnelData,
};
use koinonia_core::consolidation::{self, DecisionInput};

#[derive(Deserialize)]
pub struct RegisterDecisionRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub decision_date: String,
    pub decision_context: String,
    pub neighborhood: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub consolidator_id: Option<String>,
    pub person_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Deserialize)]
pub struct LogEventRequest {
    pub event_type: String,
    pub description: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

pub async fn register_decision(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
    Json(req): Json<RegisterDecisionRequest>,
) -> Result<(StatusCode, Json<Convert>), (StatusCode, String)> {
    let input = DecisionInput {
        full_name: req.full_name.unwrap_or_default(),
        phone: req.phone,
        decision_date: req.decision_date,
        decision_context: req.decision_context,
        neighborhood: req.neighborhood,
        birth_date: req.birth_date,
        gender: req.gender,
        consolidator_id: req.consolidator_id,
        person_id: req.person_id,
    };

    let convert =
        consolidation::register_decision(&state.db, &tenant, &input).map_err(to_http)?;

    state.broadcast(RefreshMessage::ConvertsChanged { tenant_id: tenant });

    Ok((StatusCode::CREATED, Json(convert)))
}

pub async fn list_converts(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> Result<Json<Vec<Convert>>, (StatusCode, String)> {
    let converts = consolidation::list_converts(&state.db, &tenant).map_err(to_http)?;
    Ok(Json(converts))
}

pub async fn get_convert(
    State(state): State<AppState>,
    Path((tenant, id)): Path<(String, String)>,
) -> Result<Json<Convert>, (StatusCode, String)> {
    let convert = consolidation::get_convert(&state.db, &tenant, &id).map_err(to_http)?;
    Ok(Json(convert))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path((tenant, id)): Path<(String, String)>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Convert>, (StatusCode, String)> {
    let convert = consolidation::update_convert_status(&state.db, &tenant, &id, &req.status)
        .map_err(to_http)?;

    state.broadcast(RefreshMessage::ConvertsChanged { tenant_id: tenant });

    Ok(Json(convert))
}

pub async fn log_event(
    State(state): State<AppState>,
    Path((tenant, id)): Path<(String, String)>,
    Json(req): Json<LogEventRequest>,
) -> Result<(StatusCode, Json<ConsolidationEvent>), (StatusCode, String)> {
    let event = consolidation::log_event(
        &state.db,
        &tenant,
        &id,
        &req.event_type,
        req.description.as_deref(),
        req.metadata.as_ref(),
    )
    .map_err(to_http)?;

    state.broadcast(RefreshMessage::ConvertsChanged { tenant_id: tenant });

    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_events(
    State(state): State<AppState>,
    Path((tenant, id)): Path<(String, String)>,
) -> Result<Json<Vec<ConsolidationEvent>>, (StatusCode, String)> {
    let events = consolidation::list_events(&state.db, &tenant, &id).map_err(to_http)?;
    Ok(Json(events))
}

pub async fn compute_risk(
    State(state): State<AppState>,
    Path((tenant, id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let score = consolidation::compute_evasion_risk(&state.db, &tenant, &id).map_err(to_http)?;
    Ok(Json(serde_json::json!({ "convert_id": id, "evasion_risk_score": score })))
}

pub async fn get_funnel(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> Result<Json<FunnelData>, (StatusCode, String)> {
    let funnel = consolidation::get_funnel_data(&state.db, &tenant).map_err(to_http)?;
    Ok(Json(funnel))
}

pub async fn get_stats(
    State(state): State<AppState>,
    Path(tenant): Path<String>,
) -> Result<Json<ConsolidationStats>, (StatusCode, String)> {
    let stats = consolidation::get_consolidation_stats(&state.db, &tenant).map_err(to_http)?;
    Ok(Json(stats))
}
