use crate::app::error::{ApiError, ApiResultExt};
use crate::app::AppState;
use crate::core::records::EmployeeInput;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_employees).post(create_employee))
        .route(
            "/{id}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
}

async fn list_employees(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    let employees = state.employees.list().await.or_fail("Failed to get employees")?;
    Ok(Json(employees.iter().map(|doc| doc.to_json_with_id()).collect()))
}

async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let employee = state.employees.get(&id).await.or_fail("Failed to get employee")?;
    Ok(Json(employee.to_json_with_id()))
}

async fn create_employee(
    State(state): State<AppState>,
    Json(input): Json<EmployeeInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let employee = state
        .employees
        .create(input)
        .await
        .or_fail("Failed to add employee")?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Employee added",
            "id": employee.id,
            "employee": employee.to_json_with_id(),
        })),
    ))
}

async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<EmployeeInput>,
) -> Result<Json<Value>, ApiError> {
    let employee = state
        .employees
        .update(&id, input)
        .await
        .or_fail("Failed to update employee")?;
    Ok(Json(json!({
        "message": "Employee updated",
        "id": id,
        "employee": employee.to_json_with_id(),
    })))
}

async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .employees
        .delete(&id)
        .await
        .or_fail("Failed to delete employee")?;
    Ok(Json(json!({ "message": "Employee deleted" })))
}
