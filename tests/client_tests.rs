//! Client tests for Tablebase Rust SDK.

mod common;

use std::time::Duration;

use serde_json::json;
use tablebase::transport::{API_KEY_HEADER, REQUEST_ID_HEADER};
use tablebase::{
  ApiRequest, ClientOptions, DatabaseContext, Error, HttpTransport, ListOptions, Tablebase, Transport,
  DATABASE_ID_PARAM,
};
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{client_with, ScriptedTransport};

#[test]
fn test_client_options_builder_chain() {
  let opts = ClientOptions::new("token123")
    .with_base_url("https://db.example.com/v1")
    .with_timeout(Duration::from_secs(5))
    .with_database("db_main");

  assert_eq!(opts.api_key, "token123");
  assert_eq!(opts.base_url, "https://db.example.com/v1");
  assert_eq!(opts.timeout, Duration::from_secs(5));
  assert_eq!(opts.database_id.as_deref(), Some("db_main"));
}

#[test]
fn test_client_rejects_empty_api_key() {
  let result = Tablebase::new(ClientOptions::new("  "));
  assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_client_takes_database_from_options() {
  let client = Tablebase::new(ClientOptions::new("key").with_database("db_1")).unwrap();
  assert_eq!(client.context().database_id(), Some("db_1"));
}

#[test]
fn test_error_display() {
  let err = Error::UnsupportedOperator {
    operator: "$regex".to_string(),
  };
  assert_eq!(format!("{}", err), "Unsupported filter operator: $regex");

  let err = Error::Config("api key is empty".to_string());
  assert_eq!(format!("{}", err), "Configuration error: api key is empty");

  let err = Error::InvalidRequest("no records to insert".to_string());
  assert_eq!(format!("{}", err), "Invalid request: no records to insert");
}

#[test]
fn test_error_from_json() {
  let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
  let err: Error = json_err.into();
  match err {
    Error::Serialization(_) => {}
    _ => panic!("Expected Serialization error"),
  }
}

#[tokio::test]
async fn test_use_database_does_not_touch_original() {
  let transport = ScriptedTransport::new();
  let client = client_with(&transport);
  let sales = client.use_database("sales");
  let hr = client.use_database("hr");

  let _ = sales.sql().execute("SELECT 1").await.unwrap();
  let _ = hr.sql().execute("SELECT 1").await.unwrap();
  let _ = client.sql().execute("SELECT 1").await.unwrap();

  let requests = transport.requests();
  let db_param = |i: usize| {
    requests[i]
      .query
      .iter()
      .find(|(k, _)| k == DATABASE_ID_PARAM)
      .map(|(_, v)| v.clone())
  };
  assert_eq!(db_param(0).as_deref(), Some("sales"));
  assert_eq!(db_param(1).as_deref(), Some("hr"));
  assert_eq!(db_param(2), None);
  assert_eq!(client.context(), &DatabaseContext::default());
}

#[tokio::test]
async fn test_concurrent_databases_do_not_cross_talk() {
  let transport = ScriptedTransport::new();
  let client = client_with(&transport);
  let a = client.use_database("a");
  let b = client.use_database("b");

  let (sql_a, sql_b) = (a.sql(), b.sql());
  let (ra, rb) = tokio::join!(sql_a.execute("SELECT 1"), sql_b.execute("SELECT 2"));
  assert!(ra.is_ok() && rb.is_ok());

  for request in transport.requests() {
    let query = request.body.unwrap()["query"].as_str().unwrap().to_string();
    let db = request.query[0].1.clone();
    match query.as_str() {
      "SELECT 1" => assert_eq!(db, "a"),
      "SELECT 2" => assert_eq!(db, "b"),
      other => panic!("unexpected query {}", other),
    }
  }
}

#[tokio::test]
async fn test_transport_failure_becomes_error_response() {
  let transport = ScriptedTransport::new();
  transport.fail(Error::Config("connection refused api_key=secret".to_string()));
  let client = client_with(&transport);

  let response = client.sql().execute("SELECT 1").await.unwrap();
  let error = response.error().expect("transport failures are returned as data");
  assert_eq!(error.code.as_deref(), Some("UNKNOWN_ERROR"));
  let meta = error.meta.clone().unwrap().join(" ");
  assert!(meta.contains("connection refused"));
  assert!(!meta.contains("secret"));
}

#[tokio::test]
async fn test_http_transport_sends_key_and_json() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/v1/sql/execute"))
    .and(header(API_KEY_HEADER, "test-key"))
    .and(header_exists(REQUEST_ID_HEADER))
    .and(query_param(DATABASE_ID_PARAM, "db_9"))
    .and(body_json(json!({"query": "SELECT 1"})))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"?column?": 1}]})))
    .expect(1)
    .mount(&server)
    .await;

  let client = Tablebase::new(
    ClientOptions::new("test-key")
      .with_base_url(format!("{}/v1", server.uri()))
      .with_database("db_9"),
  )
  .unwrap();

  let response = client.sql().execute("SELECT 1").await.unwrap();
  assert_eq!(response.data(), Some(&json!([{"?column?": 1}])));
}

#[tokio::test]
async fn test_http_error_status_is_normalized() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/tables/list"))
    .respond_with(ResponseTemplate::new(401).set_body_json(json!({
      "data": {},
      "error": {"code": "UNAUTHORIZED", "message": "Invalid API key"}
    })))
    .mount(&server)
    .await;

  let client = Tablebase::new(ClientOptions::new("bad-key").with_base_url(server.uri())).unwrap();
  let response = client.tables().list(ListOptions::new()).await.unwrap();

  let error = response.error().unwrap();
  assert_eq!(error.code.as_deref(), Some("UNAUTHORIZED"));
  assert_eq!(error.to_string(), "Invalid API key");
}

#[tokio::test]
async fn test_http_non_json_body() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
    .mount(&server)
    .await;

  let transport = HttpTransport::new(&ClientOptions::new("key").with_base_url(server.uri())).unwrap();
  let raw = transport.send(ApiRequest::get("/tables/t1")).await.unwrap();
  assert_eq!(raw.status, 502);
  assert_eq!(raw.body["error"]["message"], "Bad Gateway");
}

#[tokio::test]
async fn test_unreachable_server_is_error_response() {
  let client = Tablebase::new(
    ClientOptions::new("key")
      .with_base_url("http://127.0.0.1:59999")
      .with_timeout(Duration::from_secs(2)),
  )
  .unwrap();

  let response = client.sql().execute("SELECT 1").await.unwrap();
  assert!(response.is_error());
}
