use crate::domain::model::{Document, Fields, EMPLOYEES, TRAINING_SESSIONS};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

/// A collection nested under one parent document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subcollection<'a> {
    pub parent_collection: &'a str,
    pub parent_id: &'a str,
    pub name: &'a str,
}

impl<'a> Subcollection<'a> {
    pub fn new(parent_collection: &'a str, parent_id: &'a str, name: &'a str) -> Self {
        Self {
            parent_collection,
            parent_id,
            name,
        }
    }

    pub fn training_sessions(employee_id: &'a str) -> Self {
        Self::new(EMPLOYEES, employee_id, TRAINING_SESSIONS)
    }

    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.parent_collection, self.parent_id, self.name)
    }
}

/// Inclusive range filter on a string-comparable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeFilter<'a> {
    pub field: &'a str,
    pub lower: &'a str,
    pub upper: &'a str,
}

/// Hierarchical document store.
///
/// Reads against a parent that does not exist return an empty result, never
/// an error. Implementations report transport and decoding faults as
/// `TrackerError::StoreError` / `TrackerError::DecodeError`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>>;

    async fn list_subcollection(&self, sub: Subcollection<'_>) -> Result<Vec<Document>>;

    /// Documents whose `filter.field` is a string within `[lower, upper]`.
    async fn query_range(
        &self,
        sub: Subcollection<'_>,
        filter: RangeFilter<'_>,
    ) -> Result<Vec<Document>>;

    async fn query_equals(
        &self,
        sub: Subcollection<'_>,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    async fn create(&self, collection: &str, data: Fields) -> Result<Document>;

    async fn create_in_subcollection(
        &self,
        sub: Subcollection<'_>,
        data: Fields,
    ) -> Result<Document>;

    /// Overwrites the given fields, leaving the others untouched.
    async fn merge(&self, collection: &str, id: &str, data: Fields) -> Result<()>;

    async fn delete(&self, collection: &str, id: &str) -> Result<()>;

    async fn delete_in_subcollection(&self, sub: Subcollection<'_>, id: &str) -> Result<()>;
}

/// Source of "today" for defaulted periods.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}
