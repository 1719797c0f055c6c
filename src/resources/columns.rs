//! Column management within a table.

use serde_json::{json, Value};

use crate::client::Tablebase;
use crate::error::Result;
use crate::filter::{Filter, Operator};
use crate::response::{ApiError, ApiResponse};
use crate::transport::ApiRequest;
use crate::types::{list_body, ColumnDefinition, ColumnInfo, ColumnUpdate, ListOptions, Page};

use super::{first_match, segment, single};

pub struct Columns<'a> {
  client: &'a Tablebase,
}

impl<'a> Columns<'a> {
  pub(crate) fn new(client: &'a Tablebase) -> Self {
    Self { client }
  }

  pub async fn create(&self, table: &str, column: &ColumnDefinition) -> Result<ApiResponse<ColumnInfo>> {
    column.validate()?;
    let body = serde_json::to_value(column)?;
    let table_id = try_api!(self.client.table_id(table).await);
    let path = format!("/tables/{}/fields", segment(&table_id));
    let response = self.client.call(ApiRequest::post(path).with_body(body)).await;
    Ok(response.into_typed())
  }

  pub async fn list(&self, table: &str, options: ListOptions) -> Result<ApiResponse<ColumnInfo>> {
    let body = options.into_body()?;
    let table_id = try_api!(self.client.table_id(table).await);
    let path = format!("/tables/{}/fields/list", segment(&table_id));
    let response = self.client.call(ApiRequest::post(path).with_body(body)).await;
    Ok(response.into_typed())
  }

  pub async fn find_by_name(&self, table: &str, column: &str) -> Result<ApiResponse<ColumnInfo>> {
    let table_id = try_api!(self.client.table_id(table).await);
    Ok(self.lookup(&table_id, table, column).await)
  }

  pub async fn update(&self, table: &str, column: &str, update: &ColumnUpdate) -> Result<ApiResponse<ColumnInfo>> {
    let body = serde_json::to_value(update)?;
    let table_id = try_api!(self.client.table_id(table).await);
    let column_info = try_api!(single(self.lookup(&table_id, table, column).await));
    let path = format!("/tables/{}/fields/{}", segment(&table_id), segment(&column_info.id));
    let response = self.client.call(ApiRequest::patch(path).with_body(body)).await;
    Ok(response.into_typed())
  }

  pub async fn delete(&self, table: &str, column: &str) -> Result<ApiResponse<Value>> {
    let table_id = try_api!(self.client.table_id(table).await);
    let column_info = try_api!(single(self.lookup(&table_id, table, column).await));
    let path = format!("/tables/{}/fields/{}", segment(&table_id), segment(&column_info.id));
    Ok(self.client.call(ApiRequest::delete(path)).await)
  }

  async fn lookup(&self, table_id: &str, table: &str, column: &str) -> ApiResponse<ColumnInfo> {
    let filters = [Filter::new("name", Operator::Eq, vec![json!(column)])];
    let body = list_body(&filters, Some(Page { page_no: 1, page_size: 1 }), &[], &[]);
    let path = format!("/tables/{}/fields/list", segment(table_id));
    let response = self
      .client
      .call(ApiRequest::post(path).with_body(body))
      .await
      .into_typed();
    first_match(
      response,
      ApiError::new(
        "COLUMN_NOT_FOUND",
        format!("Column '{}' not found in table '{}'", column, table),
      ),
    )
  }
}
