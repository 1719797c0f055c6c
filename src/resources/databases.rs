//! Database management.
//!
//! Databases live at account level, so these requests never carry the client's
//! database context.

use serde_json::{json, Value};

use crate::client::Tablebase;
use crate::error::{Error, Result};
use crate::filter::{Filter, Operator};
use crate::response::{ApiError, ApiResponse};
use crate::transport::ApiRequest;
use crate::types::{list_body, DatabaseCreateRequest, DatabaseInfo, DatabaseUpdate, ListOptions, Page};

use super::{first_match, segment, single};

pub struct Databases<'a> {
  client: &'a Tablebase,
}

impl<'a> Databases<'a> {
  pub(crate) fn new(client: &'a Tablebase) -> Self {
    Self { client }
  }

  pub async fn create(&self, request: &DatabaseCreateRequest) -> Result<ApiResponse<DatabaseInfo>> {
    if request.name.trim().is_empty() {
      return Err(Error::InvalidRequest("database name is required".to_string()));
    }
    let body = serde_json::to_value(request)?;
    let response = self
      .client
      .call_unscoped(ApiRequest::post("/databases").with_body(body))
      .await;
    Ok(response.into_typed())
  }

  pub async fn list(&self, options: ListOptions) -> Result<ApiResponse<DatabaseInfo>> {
    let body = options.into_body()?;
    let response = self
      .client
      .call_unscoped(ApiRequest::post("/databases/list").with_body(body))
      .await;
    Ok(response.into_typed())
  }

  pub async fn find_by_name(&self, name: &str) -> Result<ApiResponse<DatabaseInfo>> {
    Ok(self.lookup(name).await)
  }

  async fn lookup(&self, name: &str) -> ApiResponse<DatabaseInfo> {
    let filters = [Filter::new("name", Operator::Eq, vec![json!(name)])];
    let body = list_body(&filters, Some(Page { page_no: 1, page_size: 1 }), &[], &[]);
    let response = self
      .client
      .call_unscoped(ApiRequest::post("/databases/list").with_body(body))
      .await
      .into_typed();
    first_match(
      response,
      ApiError::new("DATABASE_NOT_FOUND", format!("Database '{}' not found", name)),
    )
  }

  pub async fn update(&self, name: &str, update: &DatabaseUpdate) -> Result<ApiResponse<DatabaseInfo>> {
    let body = serde_json::to_value(update)?;
    let database = try_api!(single(self.lookup(name).await));
    let path = format!("/databases/{}", segment(&database.id));
    let response = self
      .client
      .call_unscoped(ApiRequest::patch(path).with_body(body))
      .await;
    Ok(response.into_typed())
  }

  pub async fn delete(&self, name: &str) -> Result<ApiResponse<Value>> {
    let database = try_api!(single(self.lookup(name).await));
    let path = format!("/databases/{}", segment(&database.id));
    Ok(self.client.call_unscoped(ApiRequest::delete(path)).await)
  }
}
