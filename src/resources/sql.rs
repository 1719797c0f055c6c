//! Raw SQL execution.

use serde_json::{json, Value};

use crate::client::Tablebase;
use crate::error::{Error, Result};
use crate::response::ApiResponse;
use crate::transport::ApiRequest;

/// Raw SQL execution in the client's database
pub struct Sql<'a> {
  client: &'a Tablebase,
}

impl<'a> Sql<'a> {
  pub(crate) fn new(client: &'a Tablebase) -> Self {
    Self { client }
  }

  pub async fn execute(&self, query: &str) -> Result<ApiResponse<Value>> {
    let query = query.trim();
    if query.is_empty() {
      return Err(Error::InvalidRequest("SQL query is empty".to_string()));
    }
    let body = json!({ "query": query });
    Ok(self.client.call(ApiRequest::post("/sql/execute").with_body(body)).await)
  }
}
