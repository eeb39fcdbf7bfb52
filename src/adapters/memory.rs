use crate::domain::model::{Document, Fields, EMPLOYEES, TRAINING_SESSIONS};
use crate::domain::ports::{DocumentStore, RangeFilter, Subcollection};
use crate::utils::error::{Result, TrackerError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

type Collection = BTreeMap<String, Fields>;

#[derive(Debug, Default)]
struct State {
    collections: BTreeMap<String, Collection>,
    // keyed by `Subcollection::path()`
    subcollections: BTreeMap<String, Collection>,
}

/// Document store kept in process memory.
///
/// Like the hosted store, a subcollection exists independently of its parent
/// document: deleting an employee does not remove its sessions.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a JSON snapshot shaped as
    /// `{ "<collection>": { "<id>": { ...fields, "trainingSessions": { "<id>": {...} } } } }`.
    pub fn from_seed_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let snapshot: Value = serde_json::from_str(&content)?;
        Self::from_snapshot(snapshot)
    }

    pub fn from_snapshot(snapshot: Value) -> Result<Self> {
        let Value::Object(collections) = snapshot else {
            return Err(TrackerError::decode("seed", "top level must be an object of collections"));
        };

        let mut state = State::default();
        for (collection, documents) in collections {
            let Value::Object(documents) = documents else {
                return Err(TrackerError::decode(
                    collection,
                    "collection must be an object keyed by document id",
                ));
            };

            for (id, fields) in documents {
                let Value::Object(mut fields) = fields else {
                    return Err(TrackerError::decode(
                        format!("{}/{}", collection, id),
                        "document must be an object",
                    ));
                };

                if let Some(nested) = fields.remove(TRAINING_SESSIONS) {
                    let Value::Object(sessions) = nested else {
                        return Err(TrackerError::decode(
                            format!("{}/{}/{}", collection, id, TRAINING_SESSIONS),
                            "subcollection must be an object keyed by document id",
                        ));
                    };
                    let path = Subcollection::new(&collection, &id, TRAINING_SESSIONS).path();
                    let target = state.subcollections.entry(path).or_default();
                    for (session_id, session) in sessions {
                        target.insert(session_id, into_fields(session));
                    }
                }

                state
                    .collections
                    .entry(collection.clone())
                    .or_default()
                    .insert(id, fields);
            }
        }

        tracing::debug!(
            collections = state.collections.len(),
            subcollections = state.subcollections.len(),
            "Loaded in-memory snapshot"
        );

        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Replaces a top-level document, creating it if needed.
    pub async fn insert_document(&self, collection: &str, id: &str, data: Value) {
        let mut state = self.state.write().await;
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), into_fields(data));
    }

    /// Adds a session under `employees/<employee_id>` and returns its id.
    pub async fn insert_session(&self, employee_id: &str, data: Value) -> String {
        let id = generate_id();
        let path = Subcollection::new(EMPLOYEES, employee_id, TRAINING_SESSIONS).path();
        let mut state = self.state.write().await;
        state
            .subcollections
            .entry(path)
            .or_default()
            .insert(id.clone(), into_fields(data));
        id
    }
}

fn into_fields(data: Value) -> Fields {
    match data {
        Value::Object(fields) => fields,
        other => {
            tracing::warn!(value = %other, "Ignoring non-object document body");
            Fields::new()
        }
    }
}

fn to_documents(collection: Option<&Collection>) -> Vec<Document> {
    collection
        .map(|docs| {
            docs.iter()
                .map(|(id, data)| Document::new(id.clone(), data.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// `<base36 millis>-<random>`, unique enough for a single process.
pub fn generate_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", to_base36(millis), &random[..13])
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>> {
        let state = self.state.read().await;
        Ok(to_documents(state.collections.get(collection)))
    }

    async fn list_subcollection(&self, sub: Subcollection<'_>) -> Result<Vec<Document>> {
        let state = self.state.read().await;
        Ok(to_documents(state.subcollections.get(&sub.path())))
    }

    async fn query_range(
        &self,
        sub: Subcollection<'_>,
        filter: RangeFilter<'_>,
    ) -> Result<Vec<Document>> {
        let state = self.state.read().await;
        let matches = to_documents(state.subcollections.get(&sub.path()))
            .into_iter()
            .filter(|doc| {
                // only string values take part in a string range
                doc.str_field(filter.field)
                    .is_some_and(|value| filter.lower <= value && value <= filter.upper)
            })
            .collect();
        Ok(matches)
    }

    async fn query_equals(
        &self,
        sub: Subcollection<'_>,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>> {
        let state = self.state.read().await;
        let matches = to_documents(state.subcollections.get(&sub.path()))
            .into_iter()
            .filter(|doc| doc.field(field) == Some(value))
            .collect();
        Ok(matches)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let state = self.state.read().await;
        Ok(state
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn create(&self, collection: &str, data: Fields) -> Result<Document> {
        let id = generate_id();
        let mut state = self.state.write().await;
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data.clone());
        Ok(Document::new(id, data))
    }

    async fn create_in_subcollection(
        &self,
        sub: Subcollection<'_>,
        data: Fields,
    ) -> Result<Document> {
        let id = generate_id();
        let mut state = self.state.write().await;
        state
            .subcollections
            .entry(sub.path())
            .or_default()
            .insert(id.clone(), data.clone());
        Ok(Document::new(id, data))
    }

    async fn merge(&self, collection: &str, id: &str, data: Fields) -> Result<()> {
        let mut state = self.state.write().await;
        let existing = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| TrackerError::store("merge", format!("no document {}/{}", collection, id)))?;
        for (key, value) in data {
            existing.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(docs) = state.collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn delete_in_subcollection(&self, sub: Subcollection<'_>, id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(docs) = state.subcollections.get_mut(&sub.path()) {
            docs.remove(id);
        }
        Ok(())
    }
}
