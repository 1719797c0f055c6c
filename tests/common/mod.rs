//! Scripted transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tablebase::{ApiRequest, DatabaseContext, Error, RawResponse, Result, Tablebase, Transport};

/// Replays queued responses in order and records every request it sees
#[derive(Default)]
pub struct ScriptedTransport {
  responses: Mutex<VecDeque<Result<RawResponse>>>,
  requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn respond(&self, status: u16, body: Value) {
    self.responses.lock().unwrap().push_back(Ok(RawResponse { status, body }));
  }

  pub fn fail(&self, error: Error) {
    self.responses.lock().unwrap().push_back(Err(error));
  }

  /// Queue the table lookup every table-scoped call starts with
  pub fn respond_table(&self, name: &str, id: &str) {
    self.respond(
      200,
      json!({
        "data": [{"id": id, "name": name}],
        "pagination": {"total_count": 1, "current_page": 1, "per_page": 1, "type": "page"}
      }),
    );
  }

  pub fn requests(&self) -> Vec<ApiRequest> {
    self.requests.lock().unwrap().clone()
  }

  pub fn last_request(&self) -> ApiRequest {
    self.requests().pop().expect("no request was sent")
  }
}

#[async_trait]
impl Transport for ScriptedTransport {
  async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
    self.requests.lock().unwrap().push(request);
    self
      .responses
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or_else(|| Ok(RawResponse { status: 200, body: json!({"data": {}}) }))
  }
}

pub fn client_with(transport: &Arc<ScriptedTransport>) -> Tablebase {
  Tablebase::with_transport(transport.clone(), DatabaseContext::default())
}
