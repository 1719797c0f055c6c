//! Record reads and writes.

use serde::Serialize;
use serde_json::{json, Value};

use crate::client::Tablebase;
use crate::error::{Error, Result};
use crate::filter::Filters;
use crate::response::ApiResponse;
use crate::transport::ApiRequest;
use crate::types::{ListOptions, RecordDelete};

use super::segment;

pub struct Records<'a> {
  client: &'a Tablebase,
}

impl<'a> Records<'a> {
  pub(crate) fn new(client: &'a Tablebase) -> Self {
    Self { client }
  }

  pub async fn insert<T: Serialize>(&self, table: &str, record: &T) -> Result<ApiResponse<Value>> {
    let body = serde_json::to_value(record)?;
    let table_id = try_api!(self.client.table_id(table).await);
    let path = format!("/tables/{}/records", segment(&table_id));
    Ok(self.client.call(ApiRequest::post(path).with_body(body)).await)
  }

  pub async fn insert_many<T: Serialize>(&self, table: &str, records: &[T]) -> Result<ApiResponse<Value>> {
    if records.is_empty() {
      return Err(Error::InvalidRequest("no records to insert".to_string()));
    }
    let records = serde_json::to_value(records)?;
    let body = json!({ "records": records });
    let table_id = try_api!(self.client.table_id(table).await);
    let path = format!("/tables/{}/records/bulk-insert", segment(&table_id));
    Ok(self.client.call(ApiRequest::post(path).with_body(body)).await)
  }

  pub async fn find_all(&self, table: &str, options: ListOptions) -> Result<ApiResponse<Value>> {
    let body = options.into_body()?;
    let table_id = try_api!(self.client.table_id(table).await);
    let path = format!("/tables/{}/records/list", segment(&table_id));
    Ok(self.client.call(ApiRequest::post(path).with_body(body)).await)
  }

  pub async fn find_one(&self, table: &str, record_id: &str) -> Result<ApiResponse<Value>> {
    let table_id = try_api!(self.client.table_id(table).await);
    let path = format!("/tables/{}/records/{}", segment(&table_id), segment(record_id));
    Ok(self.client.call(ApiRequest::get(path)).await)
  }

  /// Set `values` on every record matching `filters`
  pub async fn update<T: Serialize>(
    &self,
    table: &str,
    values: &T,
    filters: impl Into<Filters>,
  ) -> Result<ApiResponse<Value>> {
    let filters = filters.into().into_canonical()?;
    if filters.is_empty() {
      return Err(Error::InvalidRequest(
        "refusing to update records without filters".to_string(),
      ));
    }
    let values = serde_json::to_value(values)?;
    let body = json!({
      "set": values,
      "filters": filters,
    });
    let table_id = try_api!(self.client.table_id(table).await);
    let path = format!("/tables/{}/records", segment(&table_id));
    Ok(self.client.call(ApiRequest::patch(path).with_body(body)).await)
  }

  pub async fn update_by_id<T: Serialize>(&self, table: &str, record_id: &str, values: &T) -> Result<ApiResponse<Value>> {
    let body = serde_json::to_value(values)?;
    let table_id = try_api!(self.client.table_id(table).await);
    let path = format!("/tables/{}/records/{}", segment(&table_id), segment(record_id));
    Ok(self.client.call(ApiRequest::patch(path).with_body(body)).await)
  }

  pub async fn delete(&self, table: &str, target: RecordDelete) -> Result<ApiResponse<Value>> {
    let body = target.into_body()?;
    let table_id = try_api!(self.client.table_id(table).await);
    let path = format!("/tables/{}/records", segment(&table_id));
    Ok(self.client.call(ApiRequest::delete(path).with_body(body)).await)
  }

  pub async fn delete_by_id(&self, table: &str, record_id: &str) -> Result<ApiResponse<Value>> {
    let table_id = try_api!(self.client.table_id(table).await);
    let path = format!("/tables/{}/records/{}", segment(&table_id), segment(record_id));
    Ok(self.client.call(ApiRequest::delete(path)).await)
  }
}
