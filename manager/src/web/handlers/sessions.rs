// Proxy bridge endpoints: session lifecycle, queued directives, server list

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::common::{not_found, ApiResponse, ApiResult};
use crate::engine::{Admission, MaintenanceStatusReply};
use crate::gateway::{Directive, Principal};
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterSessionRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionAdmission {
    #[serde(flatten)]
    pub admission: Admission,
    pub login_notice: Option<String>,
}

/// Admission check for a connecting principal. Admitted principals are
/// registered; refused ones are not.
pub async fn register_session(
    State(state): State<AppState>,
    Json(request): Json<RegisterSessionRequest>,
) -> ApiResult<SessionAdmission> {
    let principal = Principal::new(request.id, request.name);

    // Group data must be visible to the exemption check before admission
    state
        .sessions
        .register(principal.clone(), request.permissions, request.groups)
        .await;

    let admission = state.engine.admit(&principal).await;
    let login_notice = match &admission {
        Admission::Allowed => state.engine.login_notice(&principal).await,
        Admission::Denied { .. } => {
            state.sessions.unregister(&principal.id).await;
            None
        }
    };

    Ok(Json(ApiResponse::success(SessionAdmission {
        admission,
        login_notice,
    })))
}

pub async fn unregister_session(
    Path(principal_id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Value> {
    if !state.sessions.unregister(&principal_id).await {
        return Err(not_found(format!("No session for {}", principal_id)));
    }

    Ok(Json(ApiResponse::success(json!({
        "principal_id": principal_id,
        "removed": true
    }))))
}

pub async fn drain_session_directives(
    Path(principal_id): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Vec<Directive>> {
    match state.sessions.drain_directives(&principal_id).await {
        Some(directives) => {
            debug!("Drained {} directives for {}", directives.len(), principal_id);
            Ok(Json(ApiResponse::success(directives)))
        }
        None => Err(not_found(format!("No session for {}", principal_id))),
    }
}

/// Server-list override; `data` is null when the host should answer itself.
pub async fn get_server_status(State(state): State<AppState>) -> ApiResult<Option<MaintenanceStatusReply>> {
    Ok(Json(ApiResponse::success(state.engine.server_status())))
}
