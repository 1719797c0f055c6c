//! Resource endpoint tests for Tablebase Rust SDK.

mod common;

use serde_json::json;
use tablebase::filter::create_filter;
use tablebase::{
  ColumnDefinition, ColumnType, ColumnUpdate, DatabaseCreateRequest, DatabaseUpdate, Error,
  IndexCreateRequest, ListOptions, RecordDelete, TableUpdate, DATABASE_ID_PARAM,
};

use common::{client_with, ScriptedTransport};

#[tokio::test]
async fn test_tables_list_and_rename() {
  let transport = ScriptedTransport::new();
  transport.respond(
    200,
    json!({
      "data": [{"id": "tbl_1", "name": "users"}, {"id": "tbl_2", "name": "orders"}],
      "pagination": {"total_count": 2, "current_page": 1, "per_page": 100}
    }),
  );
  transport.respond_table("users", "tbl_1");
  transport.respond(200, json!({"data": {"id": "tbl_1", "name": "people"}}));
  let client = client_with(&transport);

  let tables = client.tables().list(ListOptions::new()).await.unwrap();
  let names: Vec<&str> = tables.items().unwrap().iter().map(|t| t.name.as_str()).collect();
  assert_eq!(names, vec!["users", "orders"]);

  let renamed = client.tables().rename("users", "people").await.unwrap();
  assert_eq!(renamed.data().map(|t| t.name.as_str()), Some("people"));

  let request = transport.last_request();
  assert_eq!(request.method.as_str(), "PATCH");
  assert_eq!(request.path, "/tables/tbl_1");
  assert_eq!(request.body, Some(json!({"name": "people"})));
}

#[tokio::test]
async fn test_table_not_found() {
  let transport = ScriptedTransport::new();
  transport.respond(
    200,
    json!({"data": [], "pagination": {"total_count": 0, "current_page": 1, "per_page": 1}}),
  );
  let client = client_with(&transport);

  let response = client.tables().update("ghosts", &TableUpdate::default()).await.unwrap();
  let error = response.error().unwrap();
  assert_eq!(error.code.as_deref(), Some("TABLE_NOT_FOUND"));
  assert_eq!(error.to_string(), "Table 'ghosts' not found");
}

#[tokio::test]
async fn test_table_find_by_id_escapes_segment() {
  let transport = ScriptedTransport::new();
  transport.respond(200, json!({"data": {"id": "a/b", "name": "odd"}}));
  let client = client_with(&transport);

  let table = client.tables().find_by_id("a/b").await.unwrap();
  assert_eq!(table.data().map(|t| t.id.as_str()), Some("a/b"));
  assert_eq!(transport.last_request().path, "/tables/a%2Fb");
}

#[tokio::test]
async fn test_columns_update_resolves_column_id() {
  let transport = ScriptedTransport::new();
  transport.respond_table("users", "tbl_1");
  transport.respond(
    200,
    json!({
      "data": [{"id": "fld_7", "name": "email", "type": "email"}],
      "pagination": {"total_count": 1, "current_page": 1, "per_page": 1}
    }),
  );
  let client = client_with(&transport);

  let update = ColumnUpdate {
    is_unique: Some(true),
    ..ColumnUpdate::default()
  };
  let _ = client.columns().update("users", "email", &update).await.unwrap();

  let requests = transport.requests();
  assert_eq!(requests[1].path, "/tables/tbl_1/fields/list");
  assert_eq!(requests[2].path, "/tables/tbl_1/fields/fld_7");
  assert_eq!(requests[2].body, Some(json!({"is_unique": true})));
}

#[tokio::test]
async fn test_column_create_validates_locally() {
  let transport = ScriptedTransport::new();
  let client = client_with(&transport);

  let column = ColumnDefinition::new("embedding", ColumnType::Vector);
  let err = client.columns().create("users", &column).await.unwrap_err();
  assert!(matches!(err, Error::InvalidRequest(_)));
  assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_column_not_found() {
  let transport = ScriptedTransport::new();
  transport.respond_table("users", "tbl_1");
  transport.respond(
    200,
    json!({"data": [], "pagination": {"total_count": 0, "current_page": 1, "per_page": 1}}),
  );
  let client = client_with(&transport);

  let response = client.columns().delete("users", "nickname").await.unwrap();
  assert_eq!(response.error().and_then(|e| e.code.as_deref()), Some("COLUMN_NOT_FOUND"));
}

#[tokio::test]
async fn test_records_insert_many() {
  let transport = ScriptedTransport::new();
  transport.respond_table("users", "tbl_1");
  let client = client_with(&transport);

  let rows = [json!({"name": "Alice"}), json!({"name": "Bob"})];
  let _ = client.records().insert_many("users", &rows).await.unwrap();

  let request = transport.last_request();
  assert_eq!(request.path, "/tables/tbl_1/records/bulk-insert");
  assert_eq!(request.body, Some(json!({"records": [{"name": "Alice"}, {"name": "Bob"}]})));

  let empty: [serde_json::Value; 0] = [];
  assert!(client.records().insert_many("users", &empty).await.is_err());
}

#[tokio::test]
async fn test_records_delete_by_ids() {
  let transport = ScriptedTransport::new();
  transport.respond_table("users", "tbl_1");
  let client = client_with(&transport);

  let _ = client
    .records()
    .delete("users", RecordDelete::ids(["rec_1", "rec_2"]))
    .await
    .unwrap();

  assert_eq!(
    transport.last_request().body,
    Some(json!({"record_ids": ["rec_1", "rec_2"]}))
  );
}

#[tokio::test]
async fn test_records_update_by_filter_syntaxes() {
  let transport = ScriptedTransport::new();
  transport.respond_table("users", "tbl_1");
  let client = client_with(&transport);

  let _ = client
    .records()
    .update("users", &json!({"active": false}), create_filter().less_than("age", 18))
    .await
    .unwrap();

  assert_eq!(
    transport.last_request().body.unwrap()["filters"],
    json!([{"field": "age", "operator": "<", "values": [18]}])
  );
}

#[tokio::test]
async fn test_indexes_add_and_delete() {
  let transport = ScriptedTransport::new();
  transport.respond_table("users", "tbl_1");
  transport.respond(200, json!({"data": {"index_name": "users_email_idx", "field_names": ["email"]}}));
  transport.respond_table("users", "tbl_1");
  let client = client_with(&transport);

  let added = client
    .indexes()
    .add("users", &IndexCreateRequest::new(["email"]))
    .await
    .unwrap();
  assert_eq!(added.data().map(|i| i.index_name.as_str()), Some("users_email_idx"));

  let _ = client.indexes().delete("users", "users_email_idx").await.unwrap();
  let request = transport.last_request();
  assert_eq!(request.method.as_str(), "DELETE");
  assert_eq!(request.path, "/tables/tbl_1/indexes");
  assert_eq!(request.body, Some(json!({"index_name": "users_email_idx"})));

  let err = client
    .indexes()
    .add("users", &IndexCreateRequest::new(["bad field"]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidRequest(_)));
}

#[tokio::test]
async fn test_databases_are_not_scoped() {
  let transport = ScriptedTransport::new();
  transport.respond(
    200,
    json!({
      "data": [{"id": "db_2", "name": "Sales"}],
      "pagination": {"total_count": 1, "current_page": 1, "per_page": 1}
    }),
  );
  let client = client_with(&transport).use_database("db_1");

  let update = DatabaseUpdate {
    name: Some("Revenue".to_string()),
  };
  let _ = client.databases().update("Sales", &update).await.unwrap();

  for request in transport.requests() {
    assert!(request.query.iter().all(|(k, _)| k != DATABASE_ID_PARAM));
  }
  assert_eq!(transport.last_request().path, "/databases/db_2");
}

#[tokio::test]
async fn test_database_create_requires_name() {
  let transport = ScriptedTransport::new();
  let client = client_with(&transport);

  let request = DatabaseCreateRequest {
    name: " ".to_string(),
    slug: None,
  };
  assert!(client.databases().create(&request).await.is_err());
}

#[tokio::test]
async fn test_database_not_found() {
  let transport = ScriptedTransport::new();
  transport.respond(
    200,
    json!({"data": [], "pagination": {"total_count": 0, "current_page": 1, "per_page": 1}}),
  );
  let client = client_with(&transport);

  let response = client.databases().delete("Nope").await.unwrap();
  assert_eq!(response.error().and_then(|e| e.code.as_deref()), Some("DATABASE_NOT_FOUND"));
}

#[tokio::test]
async fn test_sql_rejects_empty_query() {
  let transport = ScriptedTransport::new();
  let client = client_with(&transport);

  let err = client.sql().execute("   ").await.unwrap_err();
  assert!(matches!(err, Error::InvalidRequest(_)));
}

#[tokio::test]
async fn test_lookups_and_deletes_share_result_surface() {
  let transport = ScriptedTransport::new();
  transport.respond_table("users", "tbl_1");
  transport.respond_table("users", "tbl_1");
  transport.respond_table("users", "tbl_1");
  let client = client_with(&transport);

  let table = client.tables().find_by_name("users").await.unwrap();
  assert_eq!(table.data().map(|t| t.id.as_str()), Some("tbl_1"));

  let _ = client.records().find_one("users", "rec_1").await.unwrap();
  assert_eq!(transport.last_request().path, "/tables/tbl_1/records/rec_1");

  let _ = client.records().delete_by_id("users", "rec_1").await.unwrap();
  let request = transport.last_request();
  assert_eq!(request.method.as_str(), "DELETE");
  assert_eq!(request.path, "/tables/tbl_1/records/rec_1");

  let err = client.indexes().delete("users", " ").await.unwrap_err();
  assert!(matches!(err, Error::InvalidRequest(_)));
}
