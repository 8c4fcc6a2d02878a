// Administrative maintenance endpoints

use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use super::common::{ApiResponse, ApiResult, ScheduleQuery};
use crate::engine::ScheduleEntry;
use crate::errors::MaintenanceError;
use crate::event::MaintenanceEvent;
use crate::web::AppState;

#[derive(Debug, Serialize)]
pub struct MaintenanceStatusView {
    pub mode: &'static str,
    pub current_event: Option<MaintenanceEvent>,
}

/// End the active maintenance. Not being in maintenance is not an error.
pub async fn end_maintenance(State(state): State<AppState>) -> ApiResult<Value> {
    info!("Manual end of maintenance requested");

    let ended = state.engine.end_maintenance().await;
    let message = if ended {
        "Maintenance mode disabled".to_string()
    } else {
        MaintenanceError::NotActive.to_string()
    };

    Ok(Json(ApiResponse::success_with_message(
        json!({
            "ended": ended,
            "mode": state.engine.mode().as_str(),
        }),
        message,
    )))
}

pub async fn get_maintenance_status(State(state): State<AppState>) -> ApiResult<MaintenanceStatusView> {
    let mode = state.engine.mode();

    Ok(Json(ApiResponse::success(MaintenanceStatusView {
        mode: mode.as_str(),
        current_event: mode.current().cloned(),
    })))
}

pub async fn get_maintenance_schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> ApiResult<Vec<ScheduleEntry>> {
    let entries = state.engine.schedule_overview(query.effective_limit()).await;

    if entries.is_empty() {
        return Ok(Json(ApiResponse::success_with_message(
            entries,
            "No maintenance scheduled".to_string(),
        )));
    }

    Ok(Json(ApiResponse::success(entries)))
}
