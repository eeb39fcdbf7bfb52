//! Employee and training-session records.

use crate::domain::model::{
    coerce_hours, Document, Fields, SessionSummary, TrainingSession, DEFAULT_SESSION_STATUS,
    EMPLOYEES,
};
use crate::domain::ports::{DocumentStore, Subcollection};
use crate::utils::error::{Result, TrackerError};
use chrono::{SecondsFormat, Utc};
use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

const EMPLOYEE: &str = "Employee";

/// RFC 3339 UTC timestamp with millisecond precision, e.g. `2024-03-27T10:00:00.000Z`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Treats `null`, `false`, `0`, and `""` as "not provided".
fn is_provided(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn required_name(name: Option<&Value>, message: &str) -> Result<String> {
    match name {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        _ => Err(TrackerError::ValidationError {
            message: message.to_string(),
        }),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub name: Option<Value>,
    pub team_id: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInput {
    pub date: Option<Value>,
    pub location: Option<Value>,
    pub start_time: Option<Value>,
    pub length: Option<Value>,
    pub topic: Option<Value>,
    pub trainer: Option<Value>,
    pub trainees: Option<Value>,
}

#[derive(Clone)]
pub struct EmployeeService {
    store: Arc<dyn DocumentStore>,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Document>> {
        self.store.list_all(EMPLOYEES).await
    }

    pub async fn get(&self, id: &str) -> Result<Document> {
        self.store
            .get(EMPLOYEES, id)
            .await?
            .ok_or_else(|| TrackerError::not_found(EMPLOYEE, id))
    }

    pub async fn create(&self, input: EmployeeInput) -> Result<Document> {
        let name = required_name(input.name.as_ref(), "Employee name is required")?;

        let mut data = Fields::new();
        data.insert("name".to_string(), Value::String(name));
        if let Some(team_id) = input.team_id.filter(|v| !v.is_null()) {
            data.insert("teamId".to_string(), team_id);
        }
        data.insert("totalHours".to_string(), Value::from(0));
        data.insert("createdAt".to_string(), Value::String(now_timestamp()));

        let created = self.store.create(EMPLOYEES, data).await?;
        tracing::info!(employee_id = %created.id, "Employee added");
        Ok(created)
    }

    /// Applies the provided `name`/`teamId` and returns the merged record.
    pub async fn update(&self, id: &str, input: EmployeeInput) -> Result<Document> {
        let mut current = self.get(id).await?;

        let mut changes = Fields::new();
        if let Some(name) = input.name.filter(is_provided) {
            changes.insert("name".to_string(), name);
        }
        if let Some(team_id) = input.team_id.filter(is_provided) {
            changes.insert("teamId".to_string(), team_id);
        }
        changes.insert("updatedAt".to_string(), Value::String(now_timestamp()));

        self.store.merge(EMPLOYEES, id, changes.clone()).await?;
        current.data.extend(changes);
        Ok(current)
    }

    /// Removes the employee together with its training sessions.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.get(id).await?;

        let sub = Subcollection::training_sessions(id);
        let sessions = self.store.list_subcollection(sub).await?;
        try_join_all(
            sessions
                .iter()
                .map(|session| self.store.delete_in_subcollection(sub, &session.id)),
        )
        .await?;

        self.store.delete(EMPLOYEES, id).await?;
        tracing::info!(employee_id = id, sessions = sessions.len(), "Employee deleted");
        Ok(())
    }
}

#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn DocumentStore>,
}

impl SessionService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Every employee's sessions, flattened into listing summaries.
    pub async fn list_all(&self) -> Result<Vec<SessionSummary>> {
        let employees = self.store.list_all(EMPLOYEES).await?;
        let per_employee = try_join_all(employees.iter().map(|employee| {
            self.store
                .list_subcollection(Subcollection::training_sessions(&employee.id))
        }))
        .await?;

        Ok(per_employee
            .iter()
            .flatten()
            .map(|doc| TrainingSession::from_document(doc).summary())
            .collect())
    }

    pub async fn list_for_employee(&self, employee_id: &str) -> Result<Vec<SessionSummary>> {
        self.require_employee(employee_id).await?;
        let sessions = self
            .store
            .list_subcollection(Subcollection::training_sessions(employee_id))
            .await?;
        Ok(sessions
            .iter()
            .map(|doc| TrainingSession::from_document(doc).summary())
            .collect())
    }

    /// Stores a completed session and adds its length to the employee's `totalHours`.
    pub async fn create(&self, employee_id: &str, input: SessionInput) -> Result<Document> {
        let employee = self.require_employee(employee_id).await?;
        let hours = coerce_hours(input.length.as_ref());

        let mut data = Fields::new();
        let provided = [
            ("date", input.date),
            ("location", input.location),
            ("startTime", input.start_time),
            ("length", input.length),
            ("topic", input.topic),
            ("trainer", input.trainer),
            ("trainees", input.trainees),
        ];
        for (field, value) in provided {
            if let Some(value) = value {
                data.insert(field.to_string(), value);
            }
        }
        data.insert(
            "status".to_string(),
            Value::String(DEFAULT_SESSION_STATUS.to_string()),
        );
        data.insert("createdAt".to_string(), Value::String(now_timestamp()));

        let created = self
            .store
            .create_in_subcollection(Subcollection::training_sessions(employee_id), data)
            .await?;

        let current_hours = coerce_hours(employee.field("totalHours"));
        let mut totals = Fields::new();
        totals.insert("totalHours".to_string(), Value::from(current_hours + hours));
        totals.insert("updatedAt".to_string(), Value::String(now_timestamp()));
        self.store.merge(EMPLOYEES, employee_id, totals).await?;

        tracing::info!(
            employee_id,
            session_id = %created.id,
            hours,
            "Training session added"
        );
        Ok(created)
    }

    async fn require_employee(&self, employee_id: &str) -> Result<Document> {
        self.store
            .get(EMPLOYEES, employee_id)
            .await?
            .ok_or_else(|| TrackerError::not_found(EMPLOYEE, employee_id))
    }
}
