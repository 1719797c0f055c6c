//! Request and response models for the Tablebase API.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

use crate::error::{Error, Result};
use crate::filter::{is_valid_identifier, Filter, Filters};

/// Column data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
  Text,
  LongText,
  Number,
  Currency,
  Checkbox,
  DateTime,
  Email,
  PhoneNumber,
  Link,
  Json,
  Dropdown,
  Vector,
}

/// Column definition used when creating tables and columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
  pub name: String,
  #[serde(rename = "type")]
  pub column_type: ColumnType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_nullable: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_unique: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_indexed: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default_value: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub currency_format: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub selectable_items: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub multiple_selections: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub vector_dimension: Option<u32>,
}

impl ColumnDefinition {
  pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
    Self {
      name: name.into(),
      column_type,
      description: None,
      is_nullable: None,
      is_unique: None,
      is_indexed: None,
      default_value: None,
      currency_format: None,
      selectable_items: None,
      multiple_selections: None,
      vector_dimension: None,
    }
  }

  pub fn description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  pub fn nullable(mut self, nullable: bool) -> Self {
    self.is_nullable = Some(nullable);
    self
  }

  pub fn unique(mut self, unique: bool) -> Self {
    self.is_unique = Some(unique);
    self
  }

  pub fn indexed(mut self, indexed: bool) -> Self {
    self.is_indexed = Some(indexed);
    self
  }

  pub fn default_value(mut self, value: impl Into<Value>) -> Self {
    self.default_value = Some(value.into());
    self
  }

  pub fn validate(&self) -> Result<()> {
    if !is_valid_identifier(&self.name) {
      return Err(Error::InvalidRequest(format!(
        "column name '{}' is not a valid identifier",
        self.name
      )));
    }
    match self.column_type {
      ColumnType::Vector if self.vector_dimension.unwrap_or(0) == 0 => Err(Error::InvalidRequest(
        format!("vector column '{}' needs a positive dimension", self.name),
      )),
      ColumnType::Dropdown if self.selectable_items.as_ref().map_or(true, Vec::is_empty) => {
        Err(Error::InvalidRequest(format!(
          "dropdown column '{}' needs at least one item",
          self.name
        )))
      }
      _ => Ok(()),
    }
  }
}

/// Partial column update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnUpdate {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_nullable: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub is_unique: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default_value: Option<Value>,
}

/// Column as reported by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
  pub id: String,
  pub name: String,
  #[serde(rename = "type", default)]
  pub column_type: Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCreateRequest {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub fields: Vec<ColumnDefinition>,
}

impl TableCreateRequest {
  pub fn validate(&self) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::InvalidRequest("table name is required".to_string()));
    }
    if self.fields.is_empty() {
      return Err(Error::InvalidRequest(format!(
        "table '{}' needs at least one column",
        self.name
      )));
    }
    for field in &self.fields {
      field.validate()?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableUpdate {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

/// Table as reported by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// Index access methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMethod {
  #[default]
  Btree,
  Hash,
  Gin,
  Gist,
  Spgist,
  Brin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexCreateRequest {
  pub field_names: Vec<String>,
  #[serde(default)]
  pub method: IndexMethod,
}

impl IndexCreateRequest {
  pub fn new<I, S>(field_names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      field_names: field_names.into_iter().map(Into::into).collect(),
      method: IndexMethod::default(),
    }
  }

  pub fn method(mut self, method: IndexMethod) -> Self {
    self.method = method;
    self
  }
}

/// Index as reported by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
  pub index_name: String,
  #[serde(default)]
  pub field_names: Vec<String>,
  #[serde(default)]
  pub method: Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseCreateRequest {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseUpdate {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
}

/// Database as reported by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseInfo {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub slug: Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
  Asc,
  Desc,
}

impl fmt::Display for SortDirection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SortDirection::Asc => write!(f, "asc"),
      SortDirection::Desc => write!(f, "desc"),
    }
  }
}

/// Sort specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
  pub field: String,
  pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
  pub page_no: u64,
  pub page_size: u64,
}

impl Default for Page {
  fn default() -> Self {
    Self {
      page_no: 1,
      page_size: 100,
    }
  }
}

/// Filtering, paging and sorting for list endpoints
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
  pub filters: Option<Filters>,
  pub page: Option<Page>,
  pub sort: Vec<SortSpec>,
  pub fields: Vec<String>,
}

impl ListOptions {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn filters(mut self, filters: impl Into<Filters>) -> Self {
    self.filters = Some(filters.into());
    self
  }

  pub fn page(mut self, page_no: u64, page_size: u64) -> Self {
    self.page = Some(Page { page_no, page_size });
    self
  }

  pub fn page_size(mut self, page_size: u64) -> Self {
    let page_no = self.page.map_or(1, |page| page.page_no);
    self.page = Some(Page { page_no, page_size });
    self
  }

  pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
    self.sort.push(SortSpec {
      field: field.into(),
      direction,
    });
    self
  }

  pub fn fields<I, S>(mut self, fields: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.fields = fields.into_iter().map(Into::into).collect();
    self
  }

  /// Translate the filters and build the request body
  pub fn into_body(self) -> Result<Value> {
    let filters = match self.filters {
      Some(filters) => filters.into_canonical()?,
      None => Vec::new(),
    };
    Ok(list_body(&filters, self.page, &self.sort, &self.fields))
  }
}

pub(crate) fn list_body(filters: &[Filter], page: Option<Page>, sort: &[SortSpec], fields: &[String]) -> Value {
  let mut body = json!({
    "filters": filters,
    "sort": sort,
  });
  if let Some(page) = page {
    body["page"] = json!(page);
  }
  if !fields.is_empty() {
    body["fields"] = json!(fields);
  }
  body
}

/// Which records a delete removes
#[derive(Debug, Clone)]
pub enum RecordDelete {
  Ids(Vec<String>),
  Matching(Filters),
}

impl RecordDelete {
  pub fn ids<I, S>(ids: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    RecordDelete::Ids(ids.into_iter().map(Into::into).collect())
  }

  pub fn matching(filters: impl Into<Filters>) -> Self {
    RecordDelete::Matching(filters.into())
  }

  pub(crate) fn into_body(self) -> Result<Value> {
    match self {
      RecordDelete::Ids(ids) if ids.is_empty() => {
        Err(Error::InvalidRequest("no record ids to delete".to_string()))
      }
      RecordDelete::Ids(ids) => Ok(json!({ "record_ids": ids })),
      RecordDelete::Matching(filters) => {
        let filters = filters.into_canonical()?;
        if filters.is_empty() {
          return Err(Error::InvalidRequest(
            "refusing to delete records without filters".to_string(),
          ));
        }
        Ok(json!({ "filters": filters }))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::filter::create_filter;

  #[test]
  fn test_list_body_shape() {
    let body = ListOptions::new()
      .filters(create_filter().equals("status", "active"))
      .page(2, 50)
      .sort("name", SortDirection::Desc)
      .into_body()
      .unwrap();

    assert_eq!(
      body,
      json!({
        "filters": [{"field": "status", "operator": "=", "values": ["active"]}],
        "sort": [{"field": "name", "direction": "desc"}],
        "page": {"page_no": 2, "page_size": 50},
      })
    );
  }

  #[test]
  fn test_page_size_keeps_page_number() {
    let options = ListOptions::new().page(3, 10).page_size(25);
    assert_eq!(options.page, Some(Page { page_no: 3, page_size: 25 }));
  }

  #[test]
  fn test_delete_requires_filters() {
    let err = RecordDelete::matching(create_filter()).into_body().unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
  }

  #[test]
  fn test_vector_column_needs_dimension() {
    let column = ColumnDefinition::new("embedding", ColumnType::Vector);
    assert!(column.validate().is_err());
  }
}
