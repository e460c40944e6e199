//! Integration tests using mock HTTP server
//!
//! End-to-end flows through the public API: options → client → HTTP → values

use futures::StreamExt;
use pretty_assertions::assert_eq;
use quickbase_sdk::{Error, Operation, QuickBase, QuickBaseOptions, XmlAction, XmlClient};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options_for(server: &MockServer) -> QuickBaseOptions {
    QuickBaseOptions::new("demo")
        .server(server.uri())
        .user_token("user-tok")
}

fn records(range: std::ops::Range<u64>) -> Vec<Value> {
    range.map(|id| json!({"3": {"value": id}})).collect()
}

fn query_page(skip: u64, data: Vec<Value>, total: u64) -> ResponseTemplate {
    let num = data.len();
    ResponseTemplate::new(200).set_body_json(json!({
        "data": data,
        "fields": [{"id": 3, "label": "Record ID#", "type": "recordid"}],
        "metadata": {
            "skip": skip,
            "numRecords": num,
            "totalRecords": total,
            "numFields": 1
        }
    }))
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_three_pages_equal_single_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/records/query"))
        .and(body_json(json!({"from": "bt1", "select": [3]})))
        .respond_with(query_page(0, records(1..3), 5))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/records/query"))
        .and(body_json(json!({"from": "bt1", "select": [3], "options": {"skip": 2}})))
        .respond_with(query_page(2, records(3..5), 5))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/records/query"))
        .and(body_json(json!({"from": "bt1", "select": [3], "options": {"skip": 4}})))
        .respond_with(query_page(4, records(5..6), 5))
        .expect(1)
        .mount(&server)
        .await;

    let qb = QuickBase::new(options_for(&server)).unwrap();
    let paged = qb
        .run_query(json!({"from": "bt1", "select": [3]}))
        .all()
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);

    // The same dataset in one page
    Mock::given(method("POST"))
        .and(path("/v1/records/query"))
        .and(body_json(json!({"from": "bt1", "select": [3], "options": {"top": 5}})))
        .respond_with(query_page(0, records(1..6), 5))
        .expect(1)
        .mount(&server)
        .await;

    let single = qb
        .run_query(json!({"from": "bt1", "select": [3], "options": {"top": 5}}))
        .await
        .unwrap();

    assert_eq!(paged["data"], single["data"]);
    assert_eq!(paged["metadata"]["numRecords"].as_i64(), Some(5));
}

#[tokio::test]
async fn test_pages_are_sequential_and_stoppable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/reports/7/run"))
        .and(query_param("tableId", "bt1"))
        .respond_with(query_page(0, records(1..3), 6))
        .mount(&server)
        .await;

    let qb = QuickBase::new(options_for(&server)).unwrap();
    let mut pages = Box::pin(qb.run_report(json!({"reportId": "7", "tableId": "bt1"})).pages());

    // Take one page and drop the stream
    let first = pages.next().await.unwrap().unwrap();
    assert_eq!(first["data"].as_array().map(Vec::len), Some(2));
    drop(pages);

    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

// ============================================================================
// Authentication scenarios
// ============================================================================

#[tokio::test]
async fn test_temp_token_fetched_on_first_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/auth/temporary/bt1"))
        .and(header("Authorization", "QB-USER-TOKEN user-tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "temporaryAuthorization": "temp-bt1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/fields"))
        .and(query_param("tableId", "bt1"))
        .and(header("Authorization", "QB-TEMP-TOKEN temp-bt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 3}])))
        .expect(2)
        .mount(&server)
        .await;

    let qb = QuickBase::new(options_for(&server).use_temp_tokens(true)).unwrap();

    let fields = qb.get_fields(json!({"tableId": "bt1"})).await.unwrap();
    assert_eq!(fields[0]["id"].as_i64(), Some(3));

    // Second call reuses the cached token
    qb.get_fields(json!({"tableId": "bt1"})).await.unwrap();
    assert_eq!(qb.authenticator().cache().len().await, 1);
}

#[tokio::test]
async fn test_concurrent_tasks_share_one_temp_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/auth/temporary/bq1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"temporaryAuthorization": "temp-bq1"}))
                .set_delay(std::time::Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/apps/bq1"))
        .and(header("Authorization", "QB-TEMP-TOKEN temp-bq1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "bq1"})))
        .expect(4)
        .mount(&server)
        .await;

    let qb = Arc::new(QuickBase::new(options_for(&server).use_temp_tokens(true)).unwrap());

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let qb = Arc::clone(&qb);
            tokio::spawn(async move { qb.get_app(json!({"appId": "bq1"})).await })
        })
        .collect();

    for task in tasks {
        let app = task.await.unwrap().unwrap();
        assert_eq!(app["id"].as_str(), Some("bq1"));
    }
}

#[tokio::test]
async fn test_static_user_token_never_fetches_temp_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/auth/temporary/bq1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/temporary/bt1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(header("Authorization", "QB-USER-TOKEN user-tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(3)
        .mount(&server)
        .await;

    let qb = QuickBase::new(options_for(&server)).unwrap();

    qb.get_app(json!({"appId": "bq1"})).await.unwrap();
    qb.get_table(json!({"appId": "bq1", "tableId": "bt1"}))
        .await
        .unwrap();
    qb.call(Operation::GetFields, json!({"tableId": "bt1"}))
        .await
        .unwrap();
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_missing_field_surfaces_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/apps/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Bad Request",
            "description": "appId is required"
        })))
        .mount(&server)
        .await;

    let qb = QuickBase::new(options_for(&server)).unwrap();
    let err = qb.get_app(json!({})).await.unwrap_err();

    match err {
        Error::Api {
            status,
            message,
            description,
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Bad Request");
            assert_eq!(description.as_deref(), Some("appId is required"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_operation_is_an_error() {
    let server = MockServer::start().await;
    let qb = QuickBase::new(options_for(&server)).unwrap();

    let err = qb.call_by_name("deleteEverything", json!({})).unwrap_err();
    assert!(matches!(err, Error::UnknownOperation { ref name } if name == "deleteEverything"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// Legacy XML
// ============================================================================

#[tokio::test]
async fn test_read_only_xml_client() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/db/bq1"))
        .and(header("QUICKBASE-ACTION", "API_GetDBVar"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<qdbapi><action>API_GetDBVar</action><errcode>0</errcode>\
             <errtext>No error</errtext><value>blue</value></qdbapi>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let options = options_for(&server).read_only(true);
    let client = XmlClient::with_base_url(options, &format!("{}/db", server.uri())).unwrap();

    let err = client
        .execute("bq1", XmlAction::AddUserToRole, "<userid>1</userid><roleid>11</roleid>")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ReadOnly { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());

    assert_eq!(client.get_db_var("bq1", "color").await.unwrap(), "blue");
}
