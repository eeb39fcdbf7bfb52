use anyhow::Result;
use chrono::NaiveDate;
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use serde_json::{json, Map};
use std::sync::Arc;
use training_tracker::config::FirestoreConfig;
use training_tracker::domain::ports::Subcollection;
use training_tracker::{Aggregator, DocumentStore, FirestoreStore, FixedClock, TrackerError};

const ROOT: &str = "/projects/demo/databases/test-db/documents";

fn store_for(server: &MockServer, token: Option<&str>) -> FirestoreStore {
    let config = FirestoreConfig {
        base_url: Some(server.base_url()),
        database: Some("test-db".to_string()),
        access_token: token.map(str::to_string),
        page_size: Some(2),
        ..FirestoreConfig::new("demo")
    };
    FirestoreStore::new(&config).unwrap()
}

fn doc_name(path: &str) -> String {
    format!("projects/demo/databases/test-db/documents/{}", path)
}

/// 測試分頁讀取與 Bearer 驗證標頭
#[tokio::test]
async fn test_list_follows_page_tokens() -> Result<()> {
    let server = MockServer::start();
    let employees = format!("{}/employees", ROOT);

    let second_page = server.mock(|when, then| {
        when.method(GET)
            .path(employees.as_str())
            .query_param("pageSize", "2")
            .query_param("pageToken", "page-2")
            .header("Authorization", "Bearer secret");
        then.status(200).json_body(json!({
            "documents": [
                { "name": doc_name("employees/emp-3"), "fields": { "name": { "stringValue": "Linus" } } }
            ]
        }));
    });
    let first_page = server.mock(|when, then| {
        when.method(GET)
            .path(employees.as_str())
            .query_param("pageSize", "2")
            .header("Authorization", "Bearer secret");
        then.status(200).json_body(json!({
            "documents": [
                { "name": doc_name("employees/emp-1"), "fields": { "name": { "stringValue": "Ada" } } },
                { "name": doc_name("employees/emp-2"), "fields": { "totalHours": { "integerValue": "7" } } }
            ],
            "nextPageToken": "page-2"
        }));
    });

    let store = store_for(&server, Some("secret"));
    let docs = store.list_all("employees").await?;

    first_page.assert();
    second_page.assert();
    let ids: Vec<&str> = docs.iter().map(|doc| doc.id.as_str()).collect();
    assert_eq!(ids, vec!["emp-1", "emp-2", "emp-3"]);
    assert_eq!(docs[0].str_field("name"), Some("Ada"));
    assert_eq!(docs[1].field("totalHours"), Some(&json!(7)));
    Ok(())
}

#[tokio::test]
async fn test_get_missing_document_is_none() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(format!("{}/trainers/t-9", ROOT));
        then.status(404).json_body(json!({ "error": { "code": 404, "status": "NOT_FOUND" } }));
    });

    let store = store_for(&server, None);
    assert!(store.get("trainers", "t-9").await?.is_none());
    mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_server_error_becomes_store_error() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(format!("{}/employees", ROOT));
        then.status(500).body("backend unavailable");
    });

    let store = store_for(&server, None);
    let err = store.list_all("employees").await.unwrap_err();
    assert!(matches!(err, TrackerError::StoreError { .. }));
    assert!(err.to_string().contains("500"));
    Ok(())
}

/// 透過 runQuery 以日期區間查詢課程並計算月時數
#[tokio::test]
async fn test_monthly_hours_through_run_query() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(format!("{}/employees/emp-1:runQuery", ROOT))
            .body_contains("\"collectionId\":\"trainingSessions\"")
            .body_contains("GREATER_THAN_OR_EQUAL")
            .body_contains("\"stringValue\":\"2024-02-01\"")
            .body_contains("\"stringValue\":\"2024-02-29\"");
        then.status(200).json_body(json!([
            { "document": {
                "name": doc_name("employees/emp-1/trainingSessions/s1"),
                "fields": { "date": { "stringValue": "2024-02-01" }, "length": { "integerValue": "2" } }
            } },
            { "document": {
                "name": doc_name("employees/emp-1/trainingSessions/s2"),
                "fields": { "date": { "stringValue": "2024-02-29" }, "length": { "stringValue": "1.5" } }
            } },
            { "readTime": "2024-03-01T00:00:00Z" }
        ]));
    });

    let store = Arc::new(store_for(&server, None));
    let clock = Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
    let total = Aggregator::new(store, clock)
        .monthly_hours("emp-1", Some(2), None)
        .await?;

    mock.assert();
    assert_eq!(total.total_hours, 3.5);
    Ok(())
}

#[tokio::test]
async fn test_merge_sends_update_mask() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PATCH)
            .path(format!("{}/employees/emp-1", ROOT))
            .query_param("updateMask.fieldPaths", "totalHours")
            .query_param("currentDocument.exists", "true")
            .body_contains("\"doubleValue\":3.5");
        then.status(200).json_body(json!({ "name": doc_name("employees/emp-1") }));
    });

    let store = store_for(&server, None);
    let mut fields = Map::new();
    fields.insert("totalHours".to_string(), json!(3.5));
    store.merge("employees", "emp-1", fields).await?;

    mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_delete_session_path() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(DELETE)
            .path(format!("{}/employees/emp-1/trainingSessions/s1", ROOT));
        then.status(200).json_body(json!({}));
    });

    let store = store_for(&server, None);
    store
        .delete_in_subcollection(Subcollection::training_sessions("emp-1"), "s1")
        .await?;

    mock.assert();
    Ok(())
}
