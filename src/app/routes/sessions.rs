use crate::app::error::{ApiError, ApiResultExt};
use crate::app::AppState;
use crate::core::records::SessionInput;
use crate::domain::model::SessionSummary;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions))
        .route("/{employee_id}", post(create_session))
        .route("/employee/{employee_id}", get(list_employee_sessions))
}

async fn list_sessions(State(state): State<AppState>) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    let sessions = state
        .sessions
        .list_all()
        .await
        .or_fail("Failed to get training sessions")?;
    Ok(Json(sessions))
}

async fn create_session(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    Json(input): Json<SessionInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let session = state
        .sessions
        .create(&employee_id, input)
        .await
        .or_fail("Failed to add training session")?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Training session added",
            "sessionId": session.id,
            "session": session.to_json_with_id(),
        })),
    ))
}

async fn list_employee_sessions(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> Result<Json<Vec<SessionSummary>>, ApiError> {
    let sessions = state
        .sessions
        .list_for_employee(&employee_id)
        .await
        .or_fail("Failed to get employee training sessions")?;
    Ok(Json(sessions))
}
