//! Tests for the operation registry and marshaling

use super::*;
use crate::error::Error;
use crate::pagination::{NextPage, Pagination, SkipTarget};
use crate::types::Method;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashSet;
use test_case::test_case;

#[test_case("getApp", Method::GET, "/apps/{appId}" ; "get app")]
#[test_case("runQuery", Method::POST, "/records/query" ; "run query")]
#[test_case("deleteRecords", Method::DELETE, "/records" ; "delete records")]
#[test_case("denyUsers", Method::PUT, "/users/deny" ; "deny users")]
#[test_case("updateTrustees", Method::PATCH, "/app/{appId}/trustees" ; "update trustees")]
#[test_case("getTempTokenDBID", Method::GET, "/auth/temporary/{dbid}" ; "temp token")]
fn test_operation_definitions(name: &str, method: Method, path: &str) {
    let def = Operation::from_name(name).unwrap().def();
    assert_eq!(def.name, name);
    assert_eq!(def.method, method);
    assert_eq!(def.path, path);
}

#[test]
fn test_registry_names_are_unique() {
    let names: HashSet<_> = Operation::ALL.iter().map(|op| op.name()).collect();
    let fn_names: HashSet<_> = Operation::ALL.iter().map(|op| op.def().fn_name).collect();
    assert_eq!(names.len(), Operation::ALL.len());
    assert_eq!(fn_names.len(), Operation::ALL.len());
}

#[test]
fn test_every_operation_round_trips_by_name() {
    for op in Operation::ALL {
        assert_eq!(Operation::from_name(op.name()).unwrap(), *op);
        assert_eq!(Operation::from_name(op.def().fn_name).unwrap(), *op);
        assert_eq!(op.to_string(), op.name());
    }
}

#[test]
fn test_unknown_operation_fails_loudly() {
    let err = Operation::from_name("getWidgets").unwrap_err();
    assert!(matches!(err, Error::UnknownOperation { ref name } if name == "getWidgets"));

    let parsed: Result<Operation, _> = "nope".parse();
    assert!(parsed.is_err());
}

#[test]
fn test_paginated_operations() {
    assert_eq!(
        Operation::RunQuery.def().pagination,
        Pagination::skip(SkipTarget::BodyOptions)
    );
    assert_eq!(
        Operation::RunReport.def().pagination,
        Pagination::skip(SkipTarget::Query)
    );
    assert_eq!(
        Operation::GetUsers.def().pagination.records_field(),
        Some("users")
    );
    assert_eq!(
        Operation::GetRelationships.def().pagination.count_field(),
        Some("numRelationships")
    );
    assert!(!Operation::GetApp.def().pagination.is_paginated());
    assert!(!Operation::GetFieldsUsage.def().pagination.is_paginated());
}

#[test]
fn test_path_params() {
    let params: Vec<_> = Operation::DownloadFile.def().path_params().collect();
    assert_eq!(params, vec!["tableId", "recordId", "fieldId", "versionNumber"]);
}

#[test]
fn test_marshal_path_and_query() {
    let def = Operation::GetTable.def();
    let marshaled = def.marshal(&json!({"tableId": "bt1", "appId": "bq1"}));

    assert_eq!(marshaled.segments, vec!["tables", "bt1"]);
    assert_eq!(
        marshaled.query,
        vec![("appId".to_string(), "bq1".to_string())]
    );
    assert_eq!(marshaled.body, None);
    assert_eq!(marshaled.resource.as_deref(), Some("bt1"));
}

#[test]
fn test_marshal_body_gets_unconsumed_keys() {
    let def = Operation::CreateField.def();
    let marshaled = def.marshal(&json!({
        "tableId": "bt1",
        "label": "Status",
        "fieldType": "text"
    }));

    assert_eq!(marshaled.segments, vec!["fields"]);
    assert_eq!(marshaled.query_value("tableId"), Some("bt1"));
    assert_eq!(
        marshaled.body,
        Some(json!({"label": "Status", "fieldType": "text"}))
    );
}

#[test]
fn test_marshal_records_body_keeps_table() {
    let def = Operation::RunQuery.def();
    let params = json!({"from": "bt1", "select": [3], "where": "{3.GT.0}"});
    let marshaled = def.marshal(&params);

    assert_eq!(marshaled.segments, vec!["records", "query"]);
    assert_eq!(marshaled.body, Some(params));
    assert_eq!(marshaled.resource.as_deref(), Some("bt1"));
}

#[test]
fn test_marshal_missing_path_param_is_empty_segment() {
    let marshaled = Operation::GetApp.def().marshal(&json!({}));
    assert_eq!(marshaled.segments, vec!["apps", ""]);
    assert_eq!(marshaled.resource, None);
}

#[test]
fn test_marshal_missing_query_param_is_omitted() {
    let marshaled = Operation::GetFields.def().marshal(&json!({"tableId": "bt1"}));
    assert_eq!(
        marshaled.query,
        vec![("tableId".to_string(), "bt1".to_string())]
    );
}

#[test]
fn test_marshal_scalar_params_are_stringified() {
    let marshaled = Operation::RunReport.def().marshal(&json!({
        "reportId": 7,
        "tableId": "bt1",
        "skip": 100,
        "top": 50
    }));

    assert_eq!(marshaled.segments, vec!["reports", "7", "run"]);
    assert_eq!(marshaled.query_value("skip"), Some("100"));
    assert_eq!(marshaled.query_value("top"), Some("50"));
    assert_eq!(marshaled.body, None);
}

#[test]
fn test_marshal_explicit_body_key() {
    let marshaled = Operation::AddMembersToGroup.def().marshal(&json!({
        "gid": "123",
        "body": ["u1", "u2"]
    }));

    assert_eq!(marshaled.segments, vec!["groups", "123", "members"]);
    assert_eq!(marshaled.body, Some(json!(["u1", "u2"])));
}

#[test]
fn test_marshal_array_params_are_body() {
    let marshaled = Operation::AddMembersToGroup.def().marshal(&json!(["u1"]));
    assert_eq!(marshaled.segments, vec!["groups", "", "members"]);
    assert_eq!(marshaled.body, Some(json!(["u1"])));
}

#[test]
fn test_marshal_text_body() {
    let marshaled = Operation::UpdateSolution.def().marshal(&json!({
        "solutionId": "s1",
        "body": "qbl-version: 0.2\n"
    }));

    assert_eq!(marshaled.segments, vec!["solutions", "s1"]);
    assert_eq!(marshaled.text.as_deref(), Some("qbl-version: 0.2\n"));
    assert_eq!(marshaled.body, None);
}

#[test]
fn test_resource_id_order() {
    assert_eq!(
        resource_id(&json!({"appId": "bq1", "tableId": "bt1"})).as_deref(),
        Some("bt1")
    );
    assert_eq!(
        resource_id(&json!({"childTableId": "bt2", "appId": "bq1"})).as_deref(),
        Some("bt2")
    );
    assert_eq!(resource_id(&json!({"dbid": "bq9"})).as_deref(), Some("bq9"));
    assert_eq!(resource_id(&json!({"tableId": ""})), None);
    assert_eq!(resource_id(&json!(["bt1"])), None);
}

#[test]
fn test_apply_query_cursor_replaces_existing() {
    let mut marshaled = Operation::RunReport.def().marshal(&json!({
        "reportId": 1,
        "tableId": "bt1",
        "skip": 0
    }));

    marshaled.apply(&NextPage::with_param("skip", "100"));
    assert_eq!(marshaled.query_value("skip"), Some("100"));
    assert_eq!(
        marshaled.query.iter().filter(|(k, _)| k == "skip").count(),
        1
    );
}

#[test]
fn test_apply_body_cursor_creates_options() {
    let mut marshaled = Operation::RunQuery.def().marshal(&json!({"from": "bt1"}));

    marshaled.apply(&NextPage::with_body_field(&["options", "skip"], 200));
    assert_eq!(
        marshaled.body,
        Some(json!({"from": "bt1", "options": {"skip": 200}}))
    );

    marshaled.apply(&NextPage::with_body_field(&["options", "skip"], 400));
    assert_eq!(marshaled.body.unwrap()["options"]["skip"], 400);
}

#[test]
fn test_apply_body_cursor_keeps_other_options() {
    let mut marshaled = Operation::RunQuery.def().marshal(&json!({
        "from": "bt1",
        "options": {"top": 100, "compareWithAppLocalTime": false}
    }));

    marshaled.apply(&NextPage::with_body_field(&["options", "skip"], 100));
    assert_eq!(
        marshaled.body.unwrap()["options"],
        json!({"top": 100, "compareWithAppLocalTime": false, "skip": 100})
    );
}

#[test]
fn test_apply_done_is_noop() {
    let mut marshaled = Operation::GetUsers.def().marshal(&json!({"accountId": "1"}));
    let before = marshaled.clone();
    marshaled.apply(&NextPage::Done);
    assert_eq!(marshaled, before);
}
