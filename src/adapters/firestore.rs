//! Document store backed by the Firestore v1 REST API.

use crate::adapters::firestore_value::{decode_fields, encode_fields, encode_value};
use crate::config::FirestoreConfig;
use crate::domain::model::{Document, Fields};
use crate::domain::ports::{DocumentStore, RangeFilter, Subcollection};
use crate::utils::error::{Result, TrackerError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<FirestoreDocument>,
}

pub struct FirestoreStore {
    client: Client,
    documents_url: Url,
    access_token: Option<String>,
    page_size: u32,
}

impl FirestoreStore {
    pub fn new(config: &FirestoreConfig) -> Result<Self> {
        let root = format!(
            "{}/projects/{}/databases/{}/documents",
            config.base_url(),
            config.project_id,
            config.database()
        );
        let documents_url = Url::parse(&root).map_err(|e| TrackerError::InvalidConfigValueError {
            field: "firestore.base_url".to_string(),
            value: root.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .build()?;

        Ok(Self {
            client,
            documents_url,
            access_token: config.access_token().map(str::to_string),
            page_size: config.page_size(),
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.documents_url.clone();
        url.path_segments_mut()
            .map_err(|_| TrackerError::ConfigError {
                message: format!("cannot extend Firestore URL {}", self.documents_url),
            })?
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(operation, %status, "Firestore request failed");
        Err(TrackerError::store(operation, format!("{}: {}", status, truncate(&body, 512))))
    }

    async fn list_path(&self, segments: &[&str]) -> Result<Vec<Document>> {
        let operation = format!("list {}", segments.join("/"));
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.url(segments)?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", &self.page_size.to_string());
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let response = self.send(&operation, self.client.get(url)).await?;
            let page: ListDocumentsResponse = response.json().await?;
            for doc in page.documents {
                documents.push(into_document(doc)?);
            }

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(operation = %operation, count = documents.len(), "Listed documents");
        Ok(documents)
    }

    async fn run_query(&self, sub: Subcollection<'_>, filter: Value) -> Result<Vec<Document>> {
        let operation = format!("query {}", sub.path());
        let run_query = format!("{}:runQuery", sub.parent_id);
        let url = self.url(&[sub.parent_collection, &run_query])?;
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": sub.name }],
                "where": filter
            }
        });

        let response = self.send(&operation, self.client.post(url).json(&body)).await?;
        let items: Vec<RunQueryItem> = response.json().await?;
        items
            .into_iter()
            .filter_map(|item| item.document)
            .map(into_document)
            .collect()
    }

    async fn create_at(&self, segments: &[&str], data: Fields) -> Result<Document> {
        let operation = format!("create {}", segments.join("/"));
        let url = self.url(segments)?;
        let body = json!({ "fields": encode_fields(&data) });
        let response = self.send(&operation, self.client.post(url).json(&body)).await?;
        let created: FirestoreDocument = response.json().await?;
        into_document(created)
    }

    async fn delete_at(&self, segments: &[&str]) -> Result<()> {
        let operation = format!("delete {}", segments.join("/"));
        let url = self.url(segments)?;
        self.send(&operation, self.client.delete(url)).await?;
        Ok(())
    }
}

fn into_document(doc: FirestoreDocument) -> Result<Document> {
    let id = doc
        .name
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| TrackerError::decode(&doc.name, "document name has no id"))?
        .to_string();
    let data = decode_fields(&doc.name, &doc.fields)?;
    Ok(Document::new(id, data))
}

fn field_filter(field: &str, op: &str, value: Value) -> Value {
    json!({
        "fieldFilter": {
            "field": { "fieldPath": quote_field_path(field) },
            "op": op,
            "value": value
        }
    })
}

// Field names outside [A-Za-z_][A-Za-z0-9_]* must be backquoted in field paths.
fn quote_field_path(field: &str) -> String {
    let simple = field
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        field.to_string()
    } else {
        format!("`{}`", field.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>> {
        self.list_path(&[collection]).await
    }

    async fn list_subcollection(&self, sub: Subcollection<'_>) -> Result<Vec<Document>> {
        self.list_path(&[sub.parent_collection, sub.parent_id, sub.name])
            .await
    }

    async fn query_range(
        &self,
        sub: Subcollection<'_>,
        filter: RangeFilter<'_>,
    ) -> Result<Vec<Document>> {
        let condition = json!({
            "compositeFilter": {
                "op": "AND",
                "filters": [
                    field_filter(filter.field, "GREATER_THAN_OR_EQUAL", json!({ "stringValue": filter.lower })),
                    field_filter(filter.field, "LESS_THAN_OR_EQUAL", json!({ "stringValue": filter.upper })),
                ]
            }
        });
        self.run_query(sub, condition).await
    }

    async fn query_equals(
        &self,
        sub: Subcollection<'_>,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>> {
        let condition = field_filter(field, "EQUAL", encode_value(value));
        self.run_query(sub, condition).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let operation = format!("get {}/{}", collection, id);
        let url = self.url(&[collection, id])?;
        let response = self.authorized(self.client.get(url)).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let doc: FirestoreDocument = response.json().await?;
                into_document(doc).map(Some)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(TrackerError::store(operation, format!("{}: {}", status, truncate(&body, 512))))
            }
        }
    }

    async fn create(&self, collection: &str, data: Fields) -> Result<Document> {
        self.create_at(&[collection], data).await
    }

    async fn create_in_subcollection(
        &self,
        sub: Subcollection<'_>,
        data: Fields,
    ) -> Result<Document> {
        self.create_at(&[sub.parent_collection, sub.parent_id, sub.name], data)
            .await
    }

    async fn merge(&self, collection: &str, id: &str, data: Fields) -> Result<()> {
        let operation = format!("merge {}/{}", collection, id);
        let mut url = self.url(&[collection, id])?;
        {
            let mut query = url.query_pairs_mut();
            for field in data.keys() {
                query.append_pair("updateMask.fieldPaths", &quote_field_path(field));
            }
            query.append_pair("currentDocument.exists", "true");
        }

        let body = json!({ "fields": encode_fields(&data) });
        self.send(&operation, self.client.patch(url).json(&body)).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.delete_at(&[collection, id]).await
    }

    async fn delete_in_subcollection(&self, sub: Subcollection<'_>, id: &str) -> Result<()> {
        self.delete_at(&[sub.parent_collection, sub.parent_id, sub.name, id])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_field_path() {
        assert_eq!(quote_field_path("date"), "date");
        assert_eq!(quote_field_path("_meta2"), "_meta2");
        assert_eq!(quote_field_path("start time"), "`start time`");
        assert_eq!(quote_field_path("2nd"), "`2nd`");
        assert_eq!(quote_field_path("a`b"), "`a\\`b`");
    }

    #[test]
    fn test_document_id_from_name() {
        let doc = FirestoreDocument {
            name: "projects/p/databases/(default)/documents/employees/emp-1".to_string(),
            fields: Map::new(),
        };
        assert_eq!(into_document(doc).unwrap().id, "emp-1");
    }

    #[test]
    fn test_url_escapes_segments() {
        let store = FirestoreStore::new(&FirestoreConfig::new("demo")).unwrap();
        let url = store.url(&["employees", "a b/c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://firestore.googleapis.com/v1/projects/demo/databases/(default)/documents/employees/a%20b%2Fc"
        );
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
