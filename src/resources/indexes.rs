//! Index management within a table.

use serde_json::{json, Value};

use crate::client::Tablebase;
use crate::error::{Error, Result};
use crate::filter::is_valid_identifier;
use crate::response::ApiResponse;
use crate::transport::ApiRequest;
use crate::types::{IndexCreateRequest, IndexInfo, ListOptions};

use super::segment;

pub struct Indexes<'a> {
  client: &'a Tablebase,
}

impl<'a> Indexes<'a> {
  pub(crate) fn new(client: &'a Tablebase) -> Self {
    Self { client }
  }

  pub async fn add(&self, table: &str, request: &IndexCreateRequest) -> Result<ApiResponse<IndexInfo>> {
    if request.field_names.is_empty() {
      return Err(Error::InvalidRequest("an index needs at least one field".to_string()));
    }
    if let Some(bad) = request.field_names.iter().find(|name| !is_valid_identifier(name)) {
      return Err(Error::InvalidRequest(format!(
        "index field '{}' is not a valid identifier",
        bad
      )));
    }
    let body = serde_json::to_value(request)?;
    let table_id = try_api!(self.client.table_id(table).await);
    let path = format!("/tables/{}/indexes", segment(&table_id));
    let response = self.client.call(ApiRequest::post(path).with_body(body)).await;
    Ok(response.into_typed())
  }

  pub async fn list(&self, table: &str, options: ListOptions) -> Result<ApiResponse<IndexInfo>> {
    let body = options.into_body()?;
    let table_id = try_api!(self.client.table_id(table).await);
    let path = format!("/tables/{}/indexes/list", segment(&table_id));
    let response = self.client.call(ApiRequest::post(path).with_body(body)).await;
    Ok(response.into_typed())
  }

  pub async fn delete(&self, table: &str, index_name: &str) -> Result<ApiResponse<Value>> {
    if index_name.trim().is_empty() {
      return Err(Error::InvalidRequest("index name is required".to_string()));
    }
    let table_id = try_api!(self.client.table_id(table).await);
    let path = format!("/tables/{}/indexes", segment(&table_id));
    let body = json!({ "index_name": index_name });
    Ok(self.client.call(ApiRequest::delete(path).with_body(body)).await)
  }
}
