//! Table management.

use serde_json::{json, Value};

use crate::client::Tablebase;
use crate::error::Result;
use crate::filter::{Filter, Operator};
use crate::response::{ApiError, ApiResponse};
use crate::transport::ApiRequest;
use crate::types::{list_body, ListOptions, Page, TableCreateRequest, TableInfo, TableUpdate};

use super::{first_match, segment};

pub struct Tables<'a> {
  client: &'a Tablebase,
}

impl<'a> Tables<'a> {
  pub(crate) fn new(client: &'a Tablebase) -> Self {
    Self { client }
  }

  pub async fn create(&self, request: &TableCreateRequest) -> Result<ApiResponse<TableInfo>> {
    request.validate()?;
    let body = serde_json::to_value(request)?;
    let response = self.client.call(ApiRequest::post("/tables").with_body(body)).await;
    Ok(response.into_typed())
  }

  pub async fn list(&self, options: ListOptions) -> Result<ApiResponse<TableInfo>> {
    let body = options.into_body()?;
    let response = self.client.call(ApiRequest::post("/tables/list").with_body(body)).await;
    Ok(response.into_typed())
  }

  pub async fn find_by_name(&self, name: &str) -> Result<ApiResponse<TableInfo>> {
    Ok(self.lookup(name).await)
  }

  /// First table called `name`, or `TABLE_NOT_FOUND`
  pub(crate) async fn lookup(&self, name: &str) -> ApiResponse<TableInfo> {
    let filters = [Filter::new("name", Operator::Eq, vec![json!(name)])];
    let body = list_body(&filters, Some(Page { page_no: 1, page_size: 1 }), &[], &[]);
    let response = self
      .client
      .call(ApiRequest::post("/tables/list").with_body(body))
      .await
      .into_typed();
    first_match(
      response,
      ApiError::new("TABLE_NOT_FOUND", format!("Table '{}' not found", name)),
    )
  }

  pub async fn find_by_id(&self, table_id: &str) -> Result<ApiResponse<TableInfo>> {
    let path = format!("/tables/{}", segment(table_id));
    Ok(self.client.call(ApiRequest::get(path)).await.into_typed())
  }

  pub async fn update(&self, name: &str, update: &TableUpdate) -> Result<ApiResponse<TableInfo>> {
    let table_id = try_api!(self.client.table_id(name).await);
    let body = serde_json::to_value(update)?;
    let path = format!("/tables/{}", segment(&table_id));
    let response = self.client.call(ApiRequest::patch(path).with_body(body)).await;
    Ok(response.into_typed())
  }

  pub async fn rename(&self, name: &str, new_name: &str) -> Result<ApiResponse<TableInfo>> {
    let update = TableUpdate {
      name: Some(new_name.to_string()),
      ..TableUpdate::default()
    };
    self.update(name, &update).await
  }

  pub async fn delete(&self, name: &str) -> Result<ApiResponse<Value>> {
    let table_id = try_api!(self.client.table_id(name).await);
    let path = format!("/tables/{}", segment(&table_id));
    Ok(self.client.call(ApiRequest::delete(path)).await)
  }
}
