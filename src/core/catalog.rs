//! Trainers and training topics: flat named records that sessions refer to by id.

use crate::core::records::now_timestamp;
use crate::domain::model::{Document, Fields, EMPLOYEES, TRAINERS, TRAINING_TOPICS};
use crate::domain::ports::{DocumentStore, Subcollection};
use crate::utils::error::{Result, TrackerError};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Trainer,
    Topic,
}

impl CatalogKind {
    pub fn collection(self) -> &'static str {
        match self {
            Self::Trainer => TRAINERS,
            Self::Topic => TRAINING_TOPICS,
        }
    }

    /// Human label used in messages, e.g. "Trainer not found".
    pub fn label(self) -> &'static str {
        match self {
            Self::Trainer => "Trainer",
            Self::Topic => "Training topic",
        }
    }

    /// Session field holding the id of this kind of record.
    fn session_field(self) -> &'static str {
        match self {
            Self::Trainer => "trainer",
            Self::Topic => "topic",
        }
    }

    fn name_required(self) -> &'static str {
        match self {
            Self::Trainer => "Trainer name is required",
            Self::Topic => "Topic name is required",
        }
    }

    fn still_referenced(self) -> &'static str {
        match self {
            Self::Trainer => {
                "Cannot delete trainer. Trainer is assigned to existing training sessions."
            }
            Self::Topic => "Cannot delete topic. Topic is used in existing training sessions.",
        }
    }
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
    kind: CatalogKind,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>, kind: CatalogKind) -> Self {
        Self { store, kind }
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    pub async fn list(&self) -> Result<Vec<Document>> {
        self.store.list_all(self.kind.collection()).await
    }

    pub async fn get(&self, id: &str) -> Result<Document> {
        self.store
            .get(self.kind.collection(), id)
            .await?
            .ok_or_else(|| TrackerError::not_found(self.kind.label(), id))
    }

    pub async fn create(&self, name: Option<String>) -> Result<Document> {
        let name = name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| TrackerError::ValidationError {
                message: self.kind.name_required().to_string(),
            })?;

        let mut data = Fields::new();
        data.insert("name".to_string(), Value::String(name));
        data.insert("createdAt".to_string(), Value::String(now_timestamp()));

        let created = self.store.create(self.kind.collection(), data).await?;
        tracing::info!(kind = self.kind.label(), id = %created.id, "Catalog record added");
        Ok(created)
    }

    pub async fn update(&self, id: &str, name: Option<String>) -> Result<Document> {
        let mut current = self.get(id).await?;

        let mut changes = Fields::new();
        if let Some(name) = name {
            changes.insert("name".to_string(), Value::String(name));
        }
        changes.insert("updatedAt".to_string(), Value::String(now_timestamp()));

        self.store
            .merge(self.kind.collection(), id, changes.clone())
            .await?;
        current.data.extend(changes);
        Ok(current)
    }

    /// Deletes the record unless a training session still points at it.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.get(id).await?;

        if self.is_referenced(id).await? {
            return Err(TrackerError::Conflict {
                message: self.kind.still_referenced().to_string(),
            });
        }

        self.store.delete(self.kind.collection(), id).await?;
        tracing::info!(kind = self.kind.label(), id, "Catalog record deleted");
        Ok(())
    }

    // Stops at the first employee with a matching session.
    async fn is_referenced(&self, id: &str) -> Result<bool> {
        let needle = Value::String(id.to_string());
        for employee in self.store.list_all(EMPLOYEES).await? {
            let matches = self
                .store
                .query_equals(
                    Subcollection::training_sessions(&employee.id),
                    self.kind.session_field(),
                    &needle,
                )
                .await?;
            if !matches.is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
